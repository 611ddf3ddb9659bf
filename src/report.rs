//! Risk report assembly.
//!
//! [`ReportBuilder::generate`] runs the full pipeline (weighted portfolio
//! returns, portfolio and per-instrument metrics, stress scenarios, limit
//! checks, recommendations) over a consistent ledger snapshot and returns
//! an immutable [`RiskReport`]. It never fails: an empty portfolio or
//! missing return data yields a report with empty sections.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::info;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::ledger::PositionLedger;
use crate::limits::{self, Breach, USD_MILLION};
use crate::returns::{self, ReturnSeries};
use crate::stats;
use crate::stress::{self, StressResult};
use crate::types::Commodity;
use crate::var::{self, VarMethod};

/// Dollar VaR threshold (USD) above which a per-commodity concentration
/// warning is added to the recommendations.
const CONCENTRATION_WARNING_USD: f64 = 5_000_000.0;

/// Portfolio-level risk metrics.
///
/// Quantiles are return fractions (negative = loss); `_dollar` fields are
/// `|quantile| × total portfolio value`. Volatility is annualized.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PortfolioMetrics {
    pub var_95: f64,
    pub var_99: f64,
    pub var_95_dollar: f64,
    pub var_99_dollar: f64,
    pub expected_shortfall_95: f64,
    pub expected_shortfall_99: f64,
    pub expected_shortfall_95_dollar: f64,
    pub expected_shortfall_99_dollar: f64,
    pub volatility: f64,
}

/// Per-instrument risk metrics, dollar-scaled by the position's absolute
/// market value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InstrumentMetrics {
    pub var_95: f64,
    pub var_99: f64,
    pub var_95_dollar: f64,
    pub var_99_dollar: f64,
    pub expected_shortfall_95: f64,
    pub expected_shortfall_95_dollar: f64,
    pub volatility: f64,
    pub position_value: f64,
}

/// A stress scenario outcome, dollar-scaled by total portfolio value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StressTestResult {
    pub stressed_var_95: f64,
    pub stressed_var_99: f64,
    pub stressed_var_95_dollar: f64,
    pub stressed_var_99_dollar: f64,
    pub volatility_increase: f64,
}

impl StressTestResult {
    fn from_fraction(result: StressResult, total_value: f64) -> Self {
        Self {
            stressed_var_95: result.stressed_var_95,
            stressed_var_99: result.stressed_var_99,
            stressed_var_95_dollar: (result.stressed_var_95 * total_value).abs(),
            stressed_var_99_dollar: (result.stressed_var_99 * total_value).abs(),
            volatility_increase: result.volatility_increase,
        }
    }
}

/// An immutable risk report snapshot.
///
/// `individual_metrics` and `stress_test_results` preserve input order
/// (return-series order and configured scenario order respectively).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RiskReport {
    pub timestamp: DateTime<Utc>,
    pub portfolio_metrics: Option<PortfolioMetrics>,
    pub individual_metrics: Vec<(Commodity, InstrumentMetrics)>,
    pub stress_test_results: Vec<(String, StressTestResult)>,
    pub limit_breaches: Vec<Breach>,
    pub recommendations: Vec<String>,
}

impl RiskReport {
    /// A report with every section empty: the valid terminal state for an
    /// empty portfolio or missing return data.
    fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            portfolio_metrics: None,
            individual_metrics: Vec::new(),
            stress_test_results: Vec::new(),
            limit_breaches: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    /// True if any limit breach was detected.
    pub fn has_breaches(&self) -> bool {
        !self.limit_breaches.is_empty()
    }

    /// Save the report as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl fmt::Display for RiskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Risk Report ({})",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        match &self.portfolio_metrics {
            Some(m) => {
                writeln!(f, "  Portfolio")?;
                writeln!(
                    f,
                    "    VaR 95 / 99:    {:>7.2}% / {:>7.2}%  (${:.0} / ${:.0})",
                    m.var_95 * 100.0,
                    m.var_99 * 100.0,
                    m.var_95_dollar,
                    m.var_99_dollar,
                )?;
                writeln!(
                    f,
                    "    ES 95 / 99:     {:>7.2}% / {:>7.2}%",
                    m.expected_shortfall_95 * 100.0,
                    m.expected_shortfall_99 * 100.0,
                )?;
                writeln!(f, "    Volatility:     {:>7.2}%", m.volatility * 100.0)?;
            }
            None => writeln!(f, "  Portfolio: no metrics (empty portfolio or no data)")?,
        }
        for (commodity, m) in &self.individual_metrics {
            writeln!(
                f,
                "  {commodity}: VaR95 {:.2}% (${:.0}), vol {:.2}%",
                m.var_95 * 100.0,
                m.var_95_dollar,
                m.volatility * 100.0,
            )?;
        }
        for (scenario, r) in &self.stress_test_results {
            writeln!(
                f,
                "  {scenario}: stressed VaR95 {:.2}% (${:.0}), {:.1}x vol",
                r.stressed_var_95 * 100.0,
                r.stressed_var_95_dollar,
                r.volatility_increase,
            )?;
        }
        for breach in &self.limit_breaches {
            writeln!(f, "  {breach}")?;
        }
        for rec in &self.recommendations {
            writeln!(f, "  - {rec}")?;
        }
        Ok(())
    }
}

/// Builds [`RiskReport`] snapshots from return data and a position ledger.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    config: Config,
}

impl ReportBuilder {
    /// Create a report builder with the given config.
    ///
    /// # Panics
    ///
    /// Panics if `config` fails validation. This is intentional — fail fast
    /// at construction, not at report time.
    #[track_caller]
    pub fn new(config: Config) -> Self {
        if let Err(err) = config.validate() {
            panic!("invalid Config: {err}");
        }
        Self { config }
    }

    /// Access the current config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generate a risk report over the given per-commodity return series and
    /// the current ledger state.
    ///
    /// Never fails: with no return data or a zero-value portfolio the report
    /// comes back with all sections empty.
    pub fn generate(
        &self,
        returns: &[(Commodity, ReturnSeries)],
        ledger: &PositionLedger,
    ) -> RiskReport {
        let timestamp = Utc::now();
        let snapshot = ledger.summarize();
        if returns.is_empty() || snapshot.total_value == 0.0 {
            return RiskReport::empty(timestamp);
        }

        let total_value = snapshot.total_value;
        let portfolio_returns = returns::weighted_portfolio_returns(returns, &snapshot.weights);
        let portfolio_metrics = portfolio_metrics(portfolio_returns.values(), total_value);

        // Per-instrument metrics, in return-series order
        let mut individual_metrics = Vec::new();
        let mut individual_vars_musd = Vec::new();
        for (commodity, series) in returns {
            let Some(position) = ledger.position(commodity) else {
                continue;
            };
            let position_value = position.market_value.abs();
            if position.is_flat() || series.is_empty() || position_value <= 0.0 {
                continue;
            }
            let Some(metrics) = instrument_metrics(series.values(), position_value) else {
                continue;
            };
            individual_vars_musd.push((*commodity, metrics.var_95_dollar / USD_MILLION));
            individual_metrics.push((*commodity, metrics));
        }

        let stress_test_results =
            self.stress_test_results(portfolio_returns.values(), total_value);

        // Limit breaches: VaR limits only when portfolio metrics exist,
        // position limits always
        let mut limit_breaches = Vec::new();
        if let Some(m) = &portfolio_metrics {
            limit_breaches.extend(limits::check_var_limits(
                &self.config.var_limits,
                m.var_95_dollar / USD_MILLION,
                &individual_vars_musd,
            ));
        }
        limit_breaches.extend(limits::check_position_limits(
            &self.config.position_limits,
            ledger.positions(),
        ));

        // Recommendations, in rule order
        let mut recommendations = Vec::new();
        if !limit_breaches.is_empty() {
            recommendations.push("Immediate attention required due to limit breaches".to_string());
        }
        if limit_breaches.len() > 3 {
            recommendations.push("Consider portfolio rebalancing".to_string());
        }
        for (commodity, metrics) in &individual_metrics {
            if metrics.var_95_dollar > CONCENTRATION_WARNING_USD {
                recommendations.push(format!("High risk concentration in {commodity}"));
            }
        }

        info!(
            "risk report: {} instrument(s), {} scenario(s), {} breach(es)",
            individual_metrics.len(),
            stress_test_results.len(),
            limit_breaches.len(),
        );

        RiskReport {
            timestamp,
            portfolio_metrics,
            individual_metrics,
            stress_test_results,
            limit_breaches,
            recommendations,
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn stress_test_results(
        &self,
        portfolio_returns: &[f64],
        total_value: f64,
    ) -> Vec<(String, StressTestResult)> {
        self.config
            .scenarios
            .iter()
            .filter_map(|s| self.run_scenario(portfolio_returns, total_value, &s.id))
            .collect()
    }

    /// Stress scenarios are independent pure computations, so they fan out
    /// across threads; collect preserves configured scenario order.
    #[cfg(feature = "parallel")]
    fn stress_test_results(
        &self,
        portfolio_returns: &[f64],
        total_value: f64,
    ) -> Vec<(String, StressTestResult)> {
        self.config
            .scenarios
            .par_iter()
            .filter_map(|s| self.run_scenario(portfolio_returns, total_value, &s.id))
            .collect()
    }

    fn run_scenario(
        &self,
        portfolio_returns: &[f64],
        total_value: f64,
        scenario_id: &str,
    ) -> Option<(String, StressTestResult)> {
        let result = stress::apply_stress(portfolio_returns, &self.config.scenarios, scenario_id)?;
        Some((
            result.scenario.clone(),
            StressTestResult::from_fraction(result, total_value),
        ))
    }
}

fn portfolio_metrics(values: &[f64], total_value: f64) -> Option<PortfolioMetrics> {
    let var_95 = var::estimate_var(values, 0.95, VarMethod::Historical)?;
    let var_99 = var::estimate_var(values, 0.99, VarMethod::Historical)?;
    let es_95 = var::expected_shortfall(values, 0.95)?;
    let es_99 = var::expected_shortfall(values, 0.99)?;

    Some(PortfolioMetrics {
        var_95,
        var_99,
        var_95_dollar: (var_95 * total_value).abs(),
        var_99_dollar: (var_99 * total_value).abs(),
        expected_shortfall_95: es_95,
        expected_shortfall_99: es_99,
        expected_shortfall_95_dollar: (es_95 * total_value).abs(),
        expected_shortfall_99_dollar: (es_99 * total_value).abs(),
        volatility: stats::annualized_volatility(values),
    })
}

fn instrument_metrics(values: &[f64], position_value: f64) -> Option<InstrumentMetrics> {
    let var_95 = var::estimate_var(values, 0.95, VarMethod::Historical)?;
    let var_99 = var::estimate_var(values, 0.99, VarMethod::Historical)?;
    let es_95 = var::expected_shortfall(values, 0.95)?;

    Some(InstrumentMetrics {
        var_95,
        var_99,
        var_95_dollar: (var_95 * position_value).abs(),
        var_99_dollar: (var_99 * position_value).abs(),
        expected_shortfall_95: es_95,
        expected_shortfall_95_dollar: (es_95 * position_value).abs(),
        volatility: stats::annualized_volatility(values),
        position_value,
    })
}
