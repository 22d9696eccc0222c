//! Indicators: pure trailing-window functions of the bar history.
//!
//! Indicators are precomputed once before the bar loop and queried by bar
//! index during it. No indicator value at bar t may depend on a price from
//! bar t+1 or later; every indicator must pass the truncated-vs-full series
//! test.

pub mod mean_log_return;
pub mod sma;

pub use mean_log_return::MeanLogReturn;
pub use sma::Sma;

use crate::domain::Bar;
use std::collections::HashMap;

/// Trait for indicators.
///
/// `compute` returns a series of the same length as `bars`. The first
/// `lookback()` values are `f64::NAN` (warmup).
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20"). Used as the lookup key.
    fn name(&self) -> &str;

    /// Number of leading bars with no valid output.
    fn lookback(&self) -> usize;

    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Container for precomputed indicator values.
#[derive(Debug, Clone, Default)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute every indicator over `bars`.
    pub fn precompute(bars: &[Bar], indicators: &[Box<dyn Indicator>]) -> Self {
        let mut values = Self::new();
        for ind in indicators {
            values.insert(ind.name(), ind.compute(bars));
        }
        values
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Value at `bar_index`; `None` if the series is unknown or too short.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
    }

    /// Value at `bar_index`, with NaN (warmup) mapped to `None`.
    pub fn get_valid(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.get(name, bar_index).filter(|v| !v.is_nan())
    }

    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Largest lookback across a set of indicators.
pub fn max_lookback(indicators: &[Box<dyn Indicator>]) -> usize {
    indicators.iter().map(|i| i.lookback()).max().unwrap_or(0)
}

/// Create consecutive daily bars from prices for testing.
#[cfg(test)]
pub fn make_bars(prices: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| Bar::new(base_date + chrono::Duration::days(i as i64), price))
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_values_insert_and_get() {
        let mut iv = IndicatorValues::new();
        iv.insert("sma_3", vec![f64::NAN, f64::NAN, 100.0, 101.0]);
        assert!(iv.get("sma_3", 0).unwrap().is_nan());
        assert_eq!(iv.get_valid("sma_3", 0), None);
        assert_eq!(iv.get("sma_3", 2), Some(100.0));
        assert_eq!(iv.get("sma_3", 4), None);
    }

    #[test]
    fn indicator_values_missing_name() {
        let iv = IndicatorValues::new();
        assert_eq!(iv.get("nonexistent", 0), None);
        assert!(iv.is_empty());
    }

    #[test]
    fn precompute_keys_by_name() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let inds: Vec<Box<dyn Indicator>> = vec![Box::new(Sma::new(2)), Box::new(Sma::new(3))];
        let iv = IndicatorValues::precompute(&bars, &inds);
        assert_eq!(iv.len(), 2);
        assert_eq!(iv.get("sma_2", 1), Some(1.5));
        assert_eq!(iv.get("sma_3", 2), Some(2.0));
        assert_eq!(max_lookback(&inds), 2);
    }
}
