//! Time-series momentum on the sign of the mean log return.

use super::{Decision, Strategy, StrategyError};
use crate::domain::Bar;
use crate::indicators::{Indicator, IndicatorValues, MeanLogReturn};

#[derive(Debug, Clone)]
pub struct Momentum {
    window: usize,
    key: String,
}

impl Momentum {
    pub fn new(window: usize) -> Result<Self, StrategyError> {
        if window == 0 {
            return Err(StrategyError::InvalidParam(
                "momentum window must be >= 1".into(),
            ));
        }
        Ok(Self {
            window,
            key: MeanLogReturn::key(window),
        })
    }
}

impl Strategy for Momentum {
    fn name(&self) -> &str {
        "momentum"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![Box::new(MeanLogReturn::new(self.window))]
    }

    fn decide(&self, bar_index: usize, _history: &[Bar], indicators: &IndicatorValues) -> Decision {
        match indicators.get_valid(&self.key, bar_index) {
            Some(m) if m > 0.0 => Decision::Buy,
            Some(m) if m < 0.0 => Decision::Sell,
            _ => Decision::Hold,
        }
    }
}
