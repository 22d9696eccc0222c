//! Simple moving average of price.
//!
//! Lookback: period - 1 (first valid value at index period-1). Any NaN in a
//! window makes that window's value NaN.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    /// Panics if `period == 0`; callers validate parameters first.
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: Self::key(period),
        }
    }

    /// Lookup key under which `Sma::new(period)` stores its series.
    pub fn key(period: usize) -> String {
        format!("sma_{period}")
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let p = self.period;
        let mut out = vec![f64::NAN; n];
        if n < p {
            return out;
        }

        let mut sum = 0.0;
        let mut nan_count = 0usize;
        for (i, bar) in bars.iter().enumerate() {
            if bar.price.is_nan() {
                nan_count += 1;
            } else {
                sum += bar.price;
            }
            if i >= p {
                let leaving = bars[i - p].price;
                if leaving.is_nan() {
                    nan_count -= 1;
                } else {
                    sum -= leaving;
                }
            }
            if i + 1 >= p && nan_count == 0 {
                out[i] = sum / p as f64;
            }
        }
        out
    }
}
