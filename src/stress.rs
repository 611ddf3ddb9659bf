//! Scenario stress testing.
//!
//! A stress evaluation is a pure function of a return series and a scenario:
//! the shock is added elementwise and the 5th/1st percentiles of the shocked
//! series are reported as stressed VaR. The volatility multiplier is carried
//! through as information only; the shock model is purely additive.

use log::warn;
use serde::Serialize;

use crate::config::StressScenario;
use crate::stats;

/// Scenario id used when an unknown id is requested.
pub const DEFAULT_SCENARIO_ID: &str = "2008_crisis";

/// The built-in fallback scenario.
pub fn fallback_scenario() -> StressScenario {
    StressScenario {
        id: DEFAULT_SCENARIO_ID.to_string(),
        shock: -0.15,
        volatility_multiplier: 2.5,
    }
}

/// Outcome of stressing a return series with one scenario.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StressResult {
    /// Id of the scenario actually applied (the fallback's id when the
    /// requested one was unknown).
    pub scenario: String,
    /// 5th percentile of the shocked series.
    pub stressed_var_95: f64,
    /// 1st percentile of the shocked series.
    pub stressed_var_99: f64,
    /// The scenario's volatility multiplier, reported but not applied.
    pub volatility_increase: f64,
}

/// Resolve `scenario_id` against the table.
///
/// Unknown ids silently fall back to `2008_crisis`: first the table's own
/// entry, then the built-in [`fallback_scenario`] if the table lacks one.
pub fn resolve_scenario(scenarios: &[StressScenario], scenario_id: &str) -> StressScenario {
    if let Some(scenario) = scenarios.iter().find(|s| s.id == scenario_id) {
        return scenario.clone();
    }
    warn!("unknown stress scenario '{scenario_id}', falling back to {DEFAULT_SCENARIO_ID}");
    scenarios
        .iter()
        .find(|s| s.id == DEFAULT_SCENARIO_ID)
        .cloned()
        .unwrap_or_else(fallback_scenario)
}

/// Apply a stress scenario to a return series.
///
/// Returns `None` when `returns` is empty. An unknown `scenario_id` is not
/// an error — see [`resolve_scenario`].
pub fn apply_stress(
    returns: &[f64],
    scenarios: &[StressScenario],
    scenario_id: &str,
) -> Option<StressResult> {
    if returns.is_empty() {
        return None;
    }

    let scenario = resolve_scenario(scenarios, scenario_id);
    let shocked: Vec<f64> = returns.iter().map(|r| r + scenario.shock).collect();

    Some(StressResult {
        scenario: scenario.id,
        stressed_var_95: stats::percentile(&shocked, 5.0),
        stressed_var_99: stats::percentile(&shocked, 1.0),
        volatility_increase: scenario.volatility_multiplier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::var::{self, VarMethod};

    fn scenarios() -> Vec<StressScenario> {
        vec![
            fallback_scenario(),
            StressScenario {
                id: "covid_2020".to_string(),
                shock: -0.25,
                volatility_multiplier: 3.0,
            },
        ]
    }

    #[test]
    fn shock_shifts_the_distribution() {
        let returns = [0.01, -0.02, 0.03, -0.01, 0.0];
        let result = apply_stress(&returns, &scenarios(), "2008_crisis").unwrap();

        let unstressed_var_95 =
            var::estimate_var(&returns, 0.95, VarMethod::Historical).unwrap();
        // Additive shock: every shocked percentile is the unshocked one + shock
        assert!((result.stressed_var_95 - (unstressed_var_95 - 0.15)).abs() < 1e-12);
        assert_eq!(result.volatility_increase, 2.5);
        assert_eq!(result.scenario, "2008_crisis");
    }

    #[test]
    fn negative_shock_is_at_least_as_severe_as_unstressed() {
        let returns = [0.02, -0.03, 0.01, 0.005, -0.015, 0.0, 0.025];
        let unstressed = var::estimate_var(&returns, 0.95, VarMethod::Historical).unwrap();
        for scenario in scenarios() {
            let result = apply_stress(&returns, &scenarios(), &scenario.id).unwrap();
            assert!(
                result.stressed_var_95 <= unstressed,
                "{}: {} > {unstressed}",
                scenario.id,
                result.stressed_var_95
            );
        }
    }

    #[test]
    fn var_99_at_most_var_95() {
        let returns = [0.02, -0.03, 0.01, 0.005, -0.015, 0.0, 0.025];
        let result = apply_stress(&returns, &scenarios(), "covid_2020").unwrap();
        assert!(result.stressed_var_99 <= result.stressed_var_95);
    }

    #[test]
    fn unknown_scenario_falls_back_to_default() {
        let returns = [0.01, -0.02, 0.03];
        let fallback = apply_stress(&returns, &scenarios(), "nonexistent_id").unwrap();
        let explicit = apply_stress(&returns, &scenarios(), "2008_crisis").unwrap();
        assert_eq!(fallback, explicit);
    }

    #[test]
    fn fallback_works_without_table_entry() {
        let table = vec![StressScenario {
            id: "covid_2020".to_string(),
            shock: -0.25,
            volatility_multiplier: 3.0,
        }];
        let resolved = resolve_scenario(&table, "nonexistent_id");
        assert_eq!(resolved, fallback_scenario());
    }

    #[test]
    fn empty_returns_is_none() {
        assert!(apply_stress(&[], &scenarios(), "2008_crisis").is_none());
    }
}
