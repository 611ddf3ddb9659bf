//! Static configuration: instrument universe, risk limits, and the stress
//! scenario table.
//!
//! Configuration is loaded once (from TOML or [`Config::default`]) and then
//! treated as an immutable parameter set by the rest of the engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Commodity;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Instrument universe, with the market-data provider's ticker per name.
    #[serde(default = "default_instruments", rename = "instrument")]
    pub instruments: Vec<Instrument>,
    /// Confidence levels used for VaR/ES reporting.
    #[serde(default = "default_confidence_levels")]
    pub confidence_levels: Vec<f64>,
    /// VaR horizon in days. Inputs are assumed to already be at this horizon.
    #[serde(default = "default_var_horizon")]
    pub var_horizon_days: u32,
    /// Portfolio and per-instrument VaR limits.
    #[serde(default)]
    pub var_limits: VarLimits,
    /// Per-commodity position limits.
    #[serde(default = "default_position_limits", rename = "position_limit")]
    pub position_limits: Vec<PositionLimit>,
    /// Stress scenario table.
    #[serde(default = "default_scenarios", rename = "scenario")]
    pub scenarios: Vec<StressScenario>,
}

/// One instrument in the universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub name: Commodity,
    pub ticker: String,
}

/// VaR limits in USD millions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarLimits {
    /// Portfolio-level VaR limit (USD millions).
    #[serde(default = "default_portfolio_var_limit")]
    pub portfolio_musd: f64,
    /// Per-instrument VaR limit (USD millions).
    #[serde(default = "default_individual_var_limit")]
    pub individual_musd: f64,
}

impl Default for VarLimits {
    fn default() -> Self {
        Self {
            portfolio_musd: default_portfolio_var_limit(),
            individual_musd: default_individual_var_limit(),
        }
    }
}

/// A per-commodity position limit in USD millions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionLimit {
    pub commodity: Commodity,
    pub limit_musd: f64,
}

/// A stress scenario: an additive return shock plus an informational
/// volatility multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    pub id: String,
    /// Additive return offset applied elementwise (e.g. -0.15).
    pub shock: f64,
    /// Reported volatility multiplier. Not applied to the distribution.
    pub volatility_multiplier: f64,
}

fn default_instruments() -> Vec<Instrument> {
    [
        ("Corn", "ZC=F"),
        ("Wheat", "ZW=F"),
        ("Soybeans", "ZS=F"),
        ("Sugar", "SB=F"),
        ("Coffee", "KC=F"),
        ("Cotton", "CT=F"),
        ("Cocoa", "CC=F"),
        ("Rice", "ZR=F"),
    ]
    .into_iter()
    .map(|(name, ticker)| Instrument {
        name: Commodity::new(name),
        ticker: ticker.to_string(),
    })
    .collect()
}

fn default_confidence_levels() -> Vec<f64> {
    vec![0.95, 0.99]
}

fn default_var_horizon() -> u32 {
    1
}

fn default_portfolio_var_limit() -> f64 {
    3.0
}

fn default_individual_var_limit() -> f64 {
    1.2
}

fn default_position_limits() -> Vec<PositionLimit> {
    [
        ("Corn", 50.0),
        ("Wheat", 40.0),
        ("Soybeans", 60.0),
        ("Sugar", 30.0),
        ("Coffee", 35.0),
        ("Cotton", 25.0),
        ("Cocoa", 20.0),
        ("Rice", 15.0),
    ]
    .into_iter()
    .map(|(name, limit_musd)| PositionLimit {
        commodity: Commodity::new(name),
        limit_musd,
    })
    .collect()
}

fn default_scenarios() -> Vec<StressScenario> {
    vec![
        StressScenario {
            id: "2008_crisis".to_string(),
            shock: -0.15,
            volatility_multiplier: 2.5,
        },
        StressScenario {
            id: "covid_2020".to_string(),
            shock: -0.25,
            volatility_multiplier: 3.0,
        },
        StressScenario {
            id: "ukraine_conflict".to_string(),
            shock: -0.12,
            volatility_multiplier: 2.0,
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            instruments: default_instruments(),
            confidence_levels: default_confidence_levels(),
            var_horizon_days: default_var_horizon(),
            var_limits: VarLimits::default(),
            position_limits: default_position_limits(),
            scenarios: default_scenarios(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    pub fn validate(&self) -> Result<()> {
        if self.instruments.is_empty() {
            return Err(Error::Config("instrument universe must not be empty".into()));
        }
        if self.confidence_levels.is_empty() {
            return Err(Error::Config("confidence_levels must not be empty".into()));
        }
        for &cl in &self.confidence_levels {
            if !cl.is_finite() || !(0.0..1.0).contains(&cl) || cl == 0.0 {
                return Err(Error::Config(format!(
                    "confidence level must be in (0, 1), got {cl}"
                )));
            }
        }
        if self.var_horizon_days == 0 {
            return Err(Error::Config("var_horizon_days must be >= 1".into()));
        }
        if !self.var_limits.portfolio_musd.is_finite() || self.var_limits.portfolio_musd <= 0.0 {
            return Err(Error::Config(format!(
                "portfolio VaR limit must be > 0, got {}",
                self.var_limits.portfolio_musd
            )));
        }
        if !self.var_limits.individual_musd.is_finite() || self.var_limits.individual_musd <= 0.0 {
            return Err(Error::Config(format!(
                "individual VaR limit must be > 0, got {}",
                self.var_limits.individual_musd
            )));
        }
        for limit in &self.position_limits {
            if !limit.limit_musd.is_finite() || limit.limit_musd < 0.0 {
                return Err(Error::Config(format!(
                    "position limit for {} must be >= 0, got {}",
                    limit.commodity, limit.limit_musd
                )));
            }
        }
        if self.scenarios.is_empty() {
            return Err(Error::Config("scenario table must not be empty".into()));
        }
        for scenario in &self.scenarios {
            if scenario.id.is_empty() {
                return Err(Error::Config("scenario id must not be empty".into()));
            }
            if !scenario.shock.is_finite() {
                return Err(Error::Config(format!(
                    "scenario {} shock must be finite",
                    scenario.id
                )));
            }
            if !scenario.volatility_multiplier.is_finite() || scenario.volatility_multiplier < 1.0 {
                return Err(Error::Config(format!(
                    "scenario {} volatility multiplier must be >= 1.0, got {}",
                    scenario.id, scenario.volatility_multiplier
                )));
            }
        }
        Ok(())
    }
}
