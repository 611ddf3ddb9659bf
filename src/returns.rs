//! Date-indexed return series and weighted portfolio aggregation.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use crate::types::Commodity;

/// A chronologically ordered daily return series.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReturnSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl ReturnSeries {
    /// Create a series from parallel date/value vectors.
    ///
    /// Dates must be strictly ascending.
    ///
    /// # Panics
    ///
    /// Panics if the vectors differ in length.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        assert_eq!(
            dates.len(),
            values.len(),
            "dates and values must have equal length"
        );
        debug_assert!(
            dates.windows(2).all(|w| w[0] < w[1]),
            "dates must be strictly ascending"
        );
        Self { dates, values }
    }

    /// Derive daily simple returns from a chronological close-price series.
    ///
    /// Each return is `p[t] / p[t-1] - 1`, dated at `t`. The first
    /// observation is dropped (it has no prior price). Prices are assumed
    /// positive.
    pub fn from_prices(prices: &[(NaiveDate, f64)]) -> Self {
        let mut dates = Vec::with_capacity(prices.len().saturating_sub(1));
        let mut values = Vec::with_capacity(prices.len().saturating_sub(1));
        for window in prices.windows(2) {
            let (_, prev) = window[0];
            let (date, close) = window[1];
            dates.push(date);
            values.push(close / prev - 1.0);
        }
        Self::new(dates, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The return values in date order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The date index.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// The return on a specific date, if present.
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|idx| self.values[idx])
    }

    /// Iterator over `(date, return)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}

/// How per-commodity weights enter a portfolio aggregation.
///
/// The report pipeline uses [`WeightPolicy::Exposure`]; ad-hoc weight
/// vectors for portfolio VaR use [`WeightPolicy::Net`]. Whether short
/// exposure nets against or is excluded from portfolio-level risk is the
/// caller's choice of policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightPolicy {
    /// Exposure-weighted: only commodities with weight > 0 contribute. A
    /// short position's raw return is not subtracted into the series.
    Exposure,
    /// Signed: every weighted commodity contributes with its sign.
    Net,
}

/// Combine per-commodity return series into one portfolio series.
///
/// The output is indexed by the union of all input dates, ascending. A
/// commodity contributes `weight × return` on each date where it has an
/// observation and 0 elsewhere; commodities absent from `weights` (or
/// filtered by `policy`) contribute nothing.
pub fn combine(
    series: &[(Commodity, ReturnSeries)],
    weights: &[(Commodity, f64)],
    policy: WeightPolicy,
) -> ReturnSeries {
    let weight_map: FxHashMap<Commodity, f64> = weights.iter().copied().collect();

    let mut dates: Vec<NaiveDate> = series
        .iter()
        .flat_map(|(_, s)| s.dates().iter().copied())
        .collect();
    dates.sort_unstable();
    dates.dedup();

    let mut values = vec![0.0; dates.len()];
    for (commodity, commodity_series) in series {
        let Some(&weight) = weight_map.get(commodity) else {
            continue;
        };
        let included = match policy {
            WeightPolicy::Exposure => weight > 0.0,
            WeightPolicy::Net => weight != 0.0,
        };
        if !included {
            continue;
        }
        for (value, date) in values.iter_mut().zip(&dates) {
            if let Some(r) = commodity_series.value_on(*date) {
                *value += weight * r;
            }
        }
    }

    ReturnSeries { dates, values }
}

/// Exposure-weighted portfolio returns: [`combine`] with
/// [`WeightPolicy::Exposure`].
pub fn weighted_portfolio_returns(
    series: &[(Commodity, ReturnSeries)],
    weights: &[(Commodity, f64)],
) -> ReturnSeries {
    combine(series, weights, WeightPolicy::Exposure)
}
