//! Rolling mean of log returns, the momentum signal.

use super::Indicator;
use crate::data::series::log_returns;
use crate::domain::Bar;

/// Mean of the last `window` log returns, `ln(p[t] / p[t-1])`.
///
/// The first log return lives at index 1, so lookback is `window`.
#[derive(Debug, Clone)]
pub struct MeanLogReturn {
    window: usize,
    name: String,
}

impl MeanLogReturn {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "mean log return window must be >= 1");
        Self {
            window,
            name: Self::key(window),
        }
    }

    pub fn key(window: usize) -> String {
        format!("mean_log_return_{window}")
    }
}

impl Indicator for MeanLogReturn {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let rets = log_returns(bars);
        let mut out = vec![f64::NAN; bars.len()];
        for t in self.window..bars.len() {
            let window = &rets[t + 1 - self.window..=t];
            out[t] = window.iter().sum::<f64>() / self.window as f64;
        }
        out
    }
}
