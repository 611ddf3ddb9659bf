//! Limit monitoring: comparing dollar-denominated risk and position figures
//! against configured limits.
//!
//! Checks are pure and order-independent; the emitted list follows the
//! iteration order of the inputs, not severity.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::{PositionLimit, VarLimits};
use crate::ledger::Position;
use crate::types::Commodity;

/// One million USD, the unit all limits are expressed in.
pub const USD_MILLION: f64 = 1_000_000.0;

/// Breach severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    High,
    Medium,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::High => write!(f, "HIGH"),
            Severity::Medium => write!(f, "MEDIUM"),
        }
    }
}

/// What kind of limit was breached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BreachKind {
    PortfolioVar,
    IndividualVar(Commodity),
    PositionLimit(Commodity),
}

impl fmt::Display for BreachKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreachKind::PortfolioVar => write!(f, "Portfolio VaR Breach"),
            BreachKind::IndividualVar(c) => write!(f, "{c} VaR Breach"),
            BreachKind::PositionLimit(c) => write!(f, "{c} Position Limit Breach"),
        }
    }
}

/// A limit breach. Produced by the checks below, never mutated afterwards.
///
/// `current` and `limit` are in USD millions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Breach {
    pub kind: BreachKind,
    pub current: f64,
    pub limit: f64,
    pub severity: Severity,
}

impl fmt::Display for Breach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {:.2} > {:.2}",
            self.severity, self.kind, self.current, self.limit
        )
    }
}

/// Check portfolio and per-commodity VaR figures against limits.
///
/// All inputs are dollar magnitudes already converted to USD millions. The
/// portfolio breach is HIGH severity; per-commodity breaches are MEDIUM.
pub fn check_var_limits(
    limits: &VarLimits,
    portfolio_var_musd: f64,
    individual_var_musd: &[(Commodity, f64)],
) -> Vec<Breach> {
    let mut breaches = Vec::new();

    if portfolio_var_musd.abs() > limits.portfolio_musd {
        breaches.push(Breach {
            kind: BreachKind::PortfolioVar,
            current: portfolio_var_musd.abs(),
            limit: limits.portfolio_musd,
            severity: Severity::High,
        });
    }

    for &(commodity, var_musd) in individual_var_musd {
        if var_musd.abs() > limits.individual_musd {
            breaches.push(Breach {
                kind: BreachKind::IndividualVar(commodity),
                current: var_musd.abs(),
                limit: limits.individual_musd,
                severity: Severity::Medium,
            });
        }
    }

    breaches
}

/// Check absolute position market values against per-commodity limits.
///
/// Commodities with no configured limit default to limit 0, so any nonzero
/// position breaches. All position breaches are HIGH severity.
pub fn check_position_limits<'a>(
    position_limits: &[PositionLimit],
    positions: impl IntoIterator<Item = &'a Position>,
) -> Vec<Breach> {
    let limit_map: FxHashMap<Commodity, f64> = position_limits
        .iter()
        .map(|p| (p.commodity, p.limit_musd))
        .collect();

    let mut breaches = Vec::new();
    for position in positions {
        let market_value_musd = position.market_value.abs() / USD_MILLION;
        let limit = limit_map.get(&position.commodity).copied().unwrap_or(0.0);
        if market_value_musd > limit {
            breaches.push(Breach {
                kind: BreachKind::PositionLimit(position.commodity),
                current: market_value_musd,
                limit,
                severity: Severity::High,
            });
        }
    }
    breaches
}
