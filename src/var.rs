//! Value-at-Risk and Expected Shortfall estimation.
//!
//! All estimators are pure functions over return slices and safe for
//! unlimited parallel invocation. Quantiles are returned in return-fraction
//! form (negative = loss); dollar scaling is the report layer's concern.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::returns::{self, ReturnSeries, WeightPolicy};
use crate::stats;
use crate::types::Commodity;

/// Number of draws for Monte Carlo VaR.
pub const MONTE_CARLO_SAMPLES: usize = 10_000;

/// VaR estimation method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarMethod {
    /// Empirical percentile of the observed return distribution.
    Historical,
    /// Normal quantile fit with the sample's mean and standard deviation.
    Parametric,
    /// Percentile of 10,000 draws from `Normal(mean, std)`. With a seed the
    /// result is reproducible; without one, entropy is used.
    MonteCarlo { seed: Option<u64> },
}

/// Estimate Value-at-Risk at `confidence_level` (e.g. 0.95 ⇒ the 5th
/// percentile of the return distribution).
///
/// Returns `None` when `returns` is empty. A single-element series yields
/// that element unchanged (degenerate quantile).
pub fn estimate_var(returns: &[f64], confidence_level: f64, method: VarMethod) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }

    match method {
        VarMethod::Historical => Some(stats::percentile(
            returns,
            (1.0 - confidence_level) * 100.0,
        )),
        VarMethod::Parametric => {
            let mu = stats::mean(returns);
            let sigma = stats::std_dev(returns);
            Some(mu + sigma * stats::norm_ppf(1.0 - confidence_level))
        }
        VarMethod::MonteCarlo { seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            monte_carlo_var(returns, confidence_level, &mut rng)
        }
    }
}

/// Monte Carlo VaR with an injected random source.
///
/// Draws [`MONTE_CARLO_SAMPLES`] samples from a normal fit to `returns` and
/// takes the empirical percentile of the simulated sample. Supplying the
/// same `rng` state twice produces identical results.
pub fn monte_carlo_var<R: Rng + ?Sized>(
    returns: &[f64],
    confidence_level: f64,
    rng: &mut R,
) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }

    let mu = stats::mean(returns);
    let sigma = stats::std_dev(returns);
    let normal = Normal::new(mu, sigma).ok()?;

    let simulated: Vec<f64> = (0..MONTE_CARLO_SAMPLES)
        .map(|_| normal.sample(rng))
        .collect();
    Some(stats::percentile(
        &simulated,
        (1.0 - confidence_level) * 100.0,
    ))
}

/// Expected Shortfall (conditional VaR): the mean of all observations at or
/// below the historical VaR threshold.
///
/// Always at least as severe as the corresponding historical VaR, because
/// the tail average includes the threshold itself. Returns `None` when
/// `returns` is empty.
pub fn expected_shortfall(returns: &[f64], confidence_level: f64) -> Option<f64> {
    let var = estimate_var(returns, confidence_level, VarMethod::Historical)?;
    let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var).collect();
    // The interpolated percentile is >= the sample minimum, so the tail is
    // never empty here.
    Some(stats::mean(&tail))
}

/// Portfolio VaR over a signed weighted combination of return series.
///
/// Unlike the report pipeline's exposure aggregation, weights here apply
/// with their sign ([`WeightPolicy::Net`]); this variant supports ad-hoc
/// weight vectors. Returns `None` when `series` is empty.
pub fn portfolio_var(
    series: &[(Commodity, ReturnSeries)],
    weights: &[(Commodity, f64)],
    confidence_level: f64,
) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let portfolio = returns::combine(series, weights, WeightPolicy::Net);
    estimate_var(portfolio.values(), confidence_level, VarMethod::Historical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_returns() -> Vec<f64> {
        // Deterministic pseudo-random walk, mean ≈ 0, sd ≈ 0.02
        let mut state: u32 = 42;
        (0..500)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                ((state % 2001) as f64 - 1000.0) / 1000.0 * 0.035
            })
            .collect()
    }

    #[test]
    fn empty_returns_none_for_all_methods() {
        assert!(estimate_var(&[], 0.95, VarMethod::Historical).is_none());
        assert!(estimate_var(&[], 0.95, VarMethod::Parametric).is_none());
        assert!(estimate_var(&[], 0.95, VarMethod::MonteCarlo { seed: Some(1) }).is_none());
        assert!(expected_shortfall(&[], 0.95).is_none());
    }

    #[test]
    fn single_element_returned_unchanged() {
        let returns = [-0.03];
        let hist = estimate_var(&returns, 0.95, VarMethod::Historical).unwrap();
        assert_eq!(hist, -0.03);
        // Parametric: sigma = 0, so the quantile collapses to the mean
        let param = estimate_var(&returns, 0.95, VarMethod::Parametric).unwrap();
        assert!((param - (-0.03)).abs() < 1e-12);
        // Monte Carlo: Normal(mu, 0) samples the mean exactly
        let mc = estimate_var(&returns, 0.95, VarMethod::MonteCarlo { seed: Some(7) }).unwrap();
        assert!((mc - (-0.03)).abs() < 1e-12);
    }

    #[test]
    fn historical_var_small_sample_exact() {
        let returns = [-0.05, -0.02, 0.01, 0.03];
        // np.percentile(sorted, 5) = -0.05 + 0.15 * 0.03 = -0.0455
        let var = estimate_var(&returns, 0.95, VarMethod::Historical).unwrap();
        assert!((var - (-0.0455)).abs() < 1e-12);
    }

    #[test]
    fn higher_confidence_is_more_severe() {
        let returns = sample_returns();
        let var_90 = estimate_var(&returns, 0.90, VarMethod::Historical).unwrap();
        let var_95 = estimate_var(&returns, 0.95, VarMethod::Historical).unwrap();
        let var_99 = estimate_var(&returns, 0.99, VarMethod::Historical).unwrap();
        assert!(var_99 <= var_95);
        assert!(var_95 <= var_90);
    }

    #[test]
    fn parametric_matches_normal_quantile() {
        let returns = sample_returns();
        let mu = stats::mean(&returns);
        let sigma = stats::std_dev(&returns);
        let var = estimate_var(&returns, 0.95, VarMethod::Parametric).unwrap();
        assert!((var - (mu + sigma * stats::norm_ppf(0.05))).abs() < 1e-12);
        assert!(var < 0.0);
    }

    #[test]
    fn monte_carlo_reproducible_with_seed() {
        let returns = sample_returns();
        let a = estimate_var(&returns, 0.95, VarMethod::MonteCarlo { seed: Some(42) }).unwrap();
        let b = estimate_var(&returns, 0.95, VarMethod::MonteCarlo { seed: Some(42) }).unwrap();
        assert_eq!(a, b);

        let c = estimate_var(&returns, 0.95, VarMethod::MonteCarlo { seed: Some(43) }).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn monte_carlo_injected_rng_matches_seeded_dispatch() {
        let returns = sample_returns();
        let mut rng = StdRng::seed_from_u64(42);
        let direct = monte_carlo_var(&returns, 0.95, &mut rng).unwrap();
        let dispatched =
            estimate_var(&returns, 0.95, VarMethod::MonteCarlo { seed: Some(42) }).unwrap();
        assert_eq!(direct, dispatched);
    }

    #[test]
    fn monte_carlo_tracks_the_fitted_normal() {
        let returns = sample_returns();
        let mc = estimate_var(&returns, 0.95, VarMethod::MonteCarlo { seed: Some(1) }).unwrap();
        let param = estimate_var(&returns, 0.95, VarMethod::Parametric).unwrap();
        // 10,000 draws put the simulated percentile close to the analytic one
        assert!((mc - param).abs() < 0.005, "mc={mc}, parametric={param}");
    }

    #[test]
    fn expected_shortfall_at_most_var() {
        let returns = sample_returns();
        for cl in [0.90, 0.95, 0.99] {
            let var = estimate_var(&returns, cl, VarMethod::Historical).unwrap();
            let es = expected_shortfall(&returns, cl).unwrap();
            assert!(es <= var, "cl={cl}: es={es} > var={var}");
        }
    }

    #[test]
    fn expected_shortfall_small_sample_exact() {
        let returns = [-0.05, -0.02, 0.01, 0.03];
        // Historical VaR(95) = -0.0455; only -0.05 lies at or below it
        let es = expected_shortfall(&returns, 0.95).unwrap();
        assert!((es - (-0.05)).abs() < 1e-12);
    }

    #[test]
    fn portfolio_var_uses_signed_weights() {
        fn day(d: u32) -> NaiveDate {
            NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
        }
        let corn = Commodity::new("Corn");
        let wheat = Commodity::new("Wheat");
        let dates: Vec<NaiveDate> = (1..=4).map(day).collect();
        let series = vec![
            (
                corn,
                ReturnSeries::new(dates.clone(), vec![0.01, -0.02, 0.03, -0.01]),
            ),
            (
                wheat,
                ReturnSeries::new(dates, vec![0.02, -0.01, 0.02, -0.02]),
            ),
        ];

        let long_only = portfolio_var(&series, &[(corn, 1.0)], 0.95).unwrap();
        let hedged = portfolio_var(&series, &[(corn, 1.0), (wheat, -0.5)], 0.95).unwrap();
        // Shorting the positively-correlated wheat leg dampens corn's moves,
        // so the hedged portfolio's tail is milder
        assert!(hedged > long_only, "hedged={hedged}, long_only={long_only}");
    }

    #[test]
    fn portfolio_var_empty_frame_is_none() {
        assert!(portfolio_var(&[], &[], 0.95).is_none());
    }
}
