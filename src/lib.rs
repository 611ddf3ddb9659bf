//! # agrorisk
//!
//! A portfolio risk engine for agricultural commodity trading: position and
//! cost-basis bookkeeping, multi-method Value-at-Risk and Expected Shortfall
//! estimation, scenario stress testing, and limit monitoring, assembled into
//! an immutable risk report.
//!
//! ## Features
//!
//! - **Position ledger**: weighted-average cost basis, signed quantities
//!   (shorts allowed), append-only trade history, derived snapshots
//! - **VaR methods**: historical, parametric, and seedable Monte Carlo,
//!   dispatched through a closed enum
//! - **Expected Shortfall**: tail average at or below the historical VaR
//! - **Stress testing**: additive-shock scenarios with a silent fallback to
//!   the 2008 crisis scenario
//! - **Limit monitoring**: portfolio/per-instrument VaR limits and position
//!   limits in USD millions, with severity-tagged breach records
//! - **Reports**: a single immutable snapshot per generation call, with
//!   deterministic recommendations, `Display` rendering, and JSON export
//!
//! ## Quick Start
//!
//! ```
//! use agrorisk::{Commodity, Config, PositionLedger, ReportBuilder, ReturnSeries};
//! use chrono::NaiveDate;
//!
//! // Book a trade and refresh market prices
//! let corn = Commodity::new("Corn");
//! let mut ledger = PositionLedger::new();
//! ledger.add_trade(corn, 1000.0, 6.50, None);
//! ledger.refresh_prices(&[(corn, 6.75)]);
//!
//! // Daily returns derived from a close-price series
//! let prices: Vec<(NaiveDate, f64)> = (1..=21)
//!     .map(|d| {
//!         let date = NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
//!         (date, 6.50 + 0.05 * (d % 5) as f64)
//!     })
//!     .collect();
//! let corn_returns = ReturnSeries::from_prices(&prices);
//!
//! // Generate a report against the default limits and scenario table
//! let builder = ReportBuilder::new(Config::default());
//! let report = builder.generate(&[(corn, corn_returns)], &ledger);
//!
//! assert!(report.portfolio_metrics.is_some());
//! assert_eq!(report.stress_test_results.len(), 3);
//! println!("{report}");
//! ```
//!
//! ## Error model
//!
//! Risk computations never fail: a metric that cannot be computed (empty
//! return series) comes back as `None` and the report omits that section.
//! Only ambient operations (config loading, report persistence) return
//! [`Result`].
//!
//! ## Concurrency
//!
//! The [`PositionLedger`] is the only mutable state; `&mut self` enforces a
//! single writer and [`PositionLedger::summarize`] hands out owned
//! snapshots. Everything else is pure over immutable inputs and safe for
//! unlimited parallel invocation. With the `parallel` feature, stress
//! scenarios in the report pipeline fan out across threads via rayon.

pub mod config;
pub mod error;
pub mod ledger;
pub mod limits;
pub mod report;
pub mod returns;
pub mod stats;
pub mod stress;
pub mod types;
pub mod var;

// Re-export public API
pub use config::{Config, Instrument, PositionLimit, StressScenario, VarLimits};
pub use error::{Error, Result};
pub use ledger::{PortfolioSnapshot, Position, PositionLedger, Trade};
pub use limits::{Breach, BreachKind, Severity, check_position_limits, check_var_limits};
pub use report::{
    InstrumentMetrics, PortfolioMetrics, ReportBuilder, RiskReport, StressTestResult,
};
pub use returns::{ReturnSeries, WeightPolicy, combine, weighted_portfolio_returns};
pub use stress::{StressResult, apply_stress, resolve_scenario};
pub use types::Commodity;
pub use var::{
    MONTE_CARLO_SAMPLES, VarMethod, estimate_var, expected_shortfall, monte_carlo_var,
    portfolio_var,
};
