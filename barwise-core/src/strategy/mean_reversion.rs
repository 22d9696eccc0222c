//! Mean reversion around a simple moving average.

use super::{Decision, Strategy, StrategyError};
use crate::domain::Bar;
use crate::indicators::{Indicator, IndicatorValues, Sma};

/// Buys when price drops more than `threshold` below its SMA, sells once it
/// is back at or above the SMA.
#[derive(Debug, Clone)]
pub struct MeanReversion {
    window: usize,
    threshold: f64,
    key: String,
}

impl MeanReversion {
    pub fn new(window: usize, threshold: f64) -> Result<Self, StrategyError> {
        if window == 0 {
            return Err(StrategyError::InvalidParam(
                "mean reversion window must be >= 1".into(),
            ));
        }
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(StrategyError::InvalidParam(format!(
                "mean reversion threshold must be finite and >= 0, got {threshold}"
            )));
        }
        Ok(Self {
            window,
            threshold,
            key: Sma::key(window),
        })
    }
}

impl Strategy for MeanReversion {
    fn name(&self) -> &str {
        "mean_reversion"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![Box::new(Sma::new(self.window))]
    }

    fn decide(&self, bar_index: usize, history: &[Bar], indicators: &IndicatorValues) -> Decision {
        let Some(sma) = indicators.get_valid(&self.key, bar_index) else {
            return Decision::Hold;
        };
        let Some(bar) = history.get(bar_index) else {
            return Decision::Hold;
        };
        if bar.price < sma - self.threshold {
            Decision::Buy
        } else if bar.price >= sma {
            Decision::Sell
        } else {
            Decision::Hold
        }
    }
}
