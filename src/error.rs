//! Error types for the risk engine.
//!
//! Only ambient operations can fail: loading configuration and persisting
//! reports. Risk computations never error; a metric that cannot be computed
//! is returned as `None` and the report simply omits it.

use std::path::PathBuf;

/// All errors that can occur in the risk engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("report I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("report serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
