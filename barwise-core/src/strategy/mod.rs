//! Strategies: market views turned into per-bar decisions.
//!
//! A strategy declares the indicators it needs and, at each bar, reads them
//! (and the bar history up to and including that bar) to produce a
//! [`Decision`]. It never sees the ledger; the engine's state machine decides
//! whether a decision results in an order.

pub mod mean_reversion;
pub mod momentum;
pub mod sma_crossover;

pub use mean_reversion::MeanReversion;
pub use momentum::Momentum;
pub use sma_crossover::SmaCrossover;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;
use crate::indicators::{max_lookback, Indicator, IndicatorValues};

/// Market view at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Buy,
    Sell,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("invalid strategy parameter: {0}")]
    InvalidParam(String),
}

/// Per-bar decision function.
///
/// # Look-ahead contract
/// `history` is exactly `bars[..=bar_index]`, and indicator lookups must use
/// indices `<= bar_index`. The decision at bar `i` must not change when the
/// series is truncated after `i`.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &str;

    /// Indicators to precompute before the bar loop.
    fn indicators(&self) -> Vec<Box<dyn Indicator>>;

    /// Index of the first bar at which every indicator is defined.
    fn warmup_bars(&self) -> usize {
        max_lookback(&self.indicators())
    }

    fn decide(&self, bar_index: usize, history: &[Bar], indicators: &IndicatorValues) -> Decision;
}

/// Serializable strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    SmaCrossover { fast: usize, slow: usize },
    Momentum { window: usize },
    MeanReversion { window: usize, threshold: f64 },
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig::SmaCrossover { fast: 42, slow: 252 }
    }
}

impl StrategyConfig {
    pub fn validate(&self) -> Result<(), StrategyError> {
        match *self {
            StrategyConfig::SmaCrossover { fast, slow } => {
                if fast == 0 {
                    return Err(StrategyError::InvalidParam("fast must be >= 1".into()));
                }
                if fast >= slow {
                    return Err(StrategyError::InvalidParam(format!(
                        "fast ({fast}) must be < slow ({slow})"
                    )));
                }
            }
            StrategyConfig::Momentum { window } => {
                if window == 0 {
                    return Err(StrategyError::InvalidParam("window must be >= 1".into()));
                }
            }
            StrategyConfig::MeanReversion { window, threshold } => {
                if window == 0 {
                    return Err(StrategyError::InvalidParam("window must be >= 1".into()));
                }
                if !threshold.is_finite() || threshold < 0.0 {
                    return Err(StrategyError::InvalidParam(format!(
                        "threshold must be finite and >= 0, got {threshold}"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn build(&self) -> Result<Box<dyn Strategy>, StrategyError> {
        self.validate()?;
        Ok(match *self {
            StrategyConfig::SmaCrossover { fast, slow } => Box::new(SmaCrossover::new(fast, slow)?),
            StrategyConfig::Momentum { window } => Box::new(Momentum::new(window)?),
            StrategyConfig::MeanReversion { window, threshold } => {
                Box::new(MeanReversion::new(window, threshold)?)
            }
        })
    }

    /// Short label for logs and sweep tables, e.g. `sma_crossover(42,252)`.
    pub fn label(&self) -> String {
        match *self {
            StrategyConfig::SmaCrossover { fast, slow } => format!("sma_crossover({fast},{slow})"),
            StrategyConfig::Momentum { window } => format!("momentum({window})"),
            StrategyConfig::MeanReversion { window, threshold } => {
                format!("mean_reversion({window},{threshold})")
            }
        }
    }
}
