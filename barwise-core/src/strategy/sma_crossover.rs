//! SMA crossover: long while the fast average is above the slow one.

use super::{Decision, Strategy, StrategyError};
use crate::domain::Bar;
use crate::indicators::{Indicator, IndicatorValues, Sma};

/// Price-level crossover of two simple moving averages.
///
/// # Indicator dependencies
/// - Fast: `sma_{fast}`
/// - Slow: `sma_{slow}`
///
/// Emits `Buy` whenever fast > slow and `Sell` whenever fast < slow, not
/// only on the crossing bar. The engine ignores a `Buy` while long and a
/// `Sell` while flat, so trades still happen only at crossings.
#[derive(Debug, Clone)]
pub struct SmaCrossover {
    fast: usize,
    slow: usize,
    fast_key: String,
    slow_key: String,
}

impl SmaCrossover {
    pub fn new(fast: usize, slow: usize) -> Result<Self, StrategyError> {
        if fast == 0 || fast >= slow {
            return Err(StrategyError::InvalidParam(format!(
                "sma crossover needs 1 <= fast < slow, got fast={fast} slow={slow}"
            )));
        }
        Ok(Self {
            fast,
            slow,
            fast_key: Sma::key(fast),
            slow_key: Sma::key(slow),
        })
    }

    pub fn fast(&self) -> usize {
        self.fast
    }

    pub fn slow(&self) -> usize {
        self.slow
    }
}

impl Strategy for SmaCrossover {
    fn name(&self) -> &str {
        "sma_crossover"
    }

    fn indicators(&self) -> Vec<Box<dyn Indicator>> {
        vec![Box::new(Sma::new(self.fast)), Box::new(Sma::new(self.slow))]
    }

    fn warmup_bars(&self) -> usize {
        self.slow - 1
    }

    fn decide(&self, bar_index: usize, _history: &[Bar], indicators: &IndicatorValues) -> Decision {
        let fast = indicators.get_valid(&self.fast_key, bar_index);
        let slow = indicators.get_valid(&self.slow_key, bar_index);
        match (fast, slow) {
            (Some(f), Some(s)) if f > s => Decision::Buy,
            (Some(f), Some(s)) if f < s => Decision::Sell,
            _ => Decision::Hold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn decisions(strategy: &SmaCrossover, prices: &[f64]) -> Vec<Decision> {
        let bars = make_bars(prices);
        let iv = IndicatorValues::precompute(&bars, &strategy.indicators());
        (0..bars.len())
            .map(|i| strategy.decide(i, &bars[..=i], &iv))
            .collect()
    }

    #[test]
    fn holds_during_warmup_and_on_equality() {
        let s = SmaCrossover::new(2, 3).unwrap();
        let d = decisions(&s, &[10.0, 11.0, 9.0, 12.0, 15.0]);
        // SMA2 = [-, 10.5, 10, 10.5, 13.5]; SMA3 = [-, -, 10, 10.667, 12]
        assert_eq!(
            d,
            vec![
                Decision::Hold,
                Decision::Hold,
                Decision::Hold,
                Decision::Sell,
                Decision::Buy
            ]
        );
    }

    #[test]
    fn rejects_fast_not_below_slow() {
        assert!(SmaCrossover::new(5, 5).is_err());
        assert!(SmaCrossover::new(10, 5).is_err());
        assert!(SmaCrossover::new(0, 5).is_err());
    }

    #[test]
    fn warmup_is_slow_lookback() {
        let s = SmaCrossover::new(42, 252).unwrap();
        assert_eq!(s.warmup_bars(), 251);
        assert_eq!(s.fast(), 42);
        assert_eq!(s.slow(), 252);
    }
}
