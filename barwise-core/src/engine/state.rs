//! Engine configuration, market state, and run result types.

use serde::{Deserialize, Serialize};

use crate::domain::{EquityCurve, Trade};
use crate::ledger::OrderSize;

/// How many units an entry buys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PositionSizing {
    /// Spend the whole cash balance: `floor(cash / price)` units.
    #[default]
    AllCash,
    /// A fixed unit count per entry.
    FixedUnits { units: i64 },
    /// A fixed cash budget per entry, capped at the available cash.
    FixedCash { amount: f64 },
}

impl PositionSizing {
    /// Order size for an entry given the cash currently available.
    pub fn order_size(&self, cash: f64) -> OrderSize {
        match *self {
            PositionSizing::AllCash => OrderSize::Cash(cash.max(0.0)),
            PositionSizing::FixedUnits { units } => OrderSize::Units(units),
            PositionSizing::FixedCash { amount } => OrderSize::Cash(amount.min(cash).max(0.0)),
        }
    }
}

/// Configuration for a single backtest run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub initial_cash: f64,
    #[serde(default)]
    pub position_sizing: PositionSizing,
}

impl EngineConfig {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            initial_cash,
            position_sizing: PositionSizing::AllCash,
        }
    }

    pub fn with_sizing(mut self, position_sizing: PositionSizing) -> Self {
        self.position_sizing = position_sizing;
        self
    }
}

/// Two-state market position machine. A short position is never entered
/// by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarketState {
    #[default]
    Flat,
    Long,
}

/// Output of a completed backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub equity_curve: EquityCurve,
    pub trades: Vec<Trade>,
    pub initial_cash: f64,
    pub final_cash: f64,
    pub trade_count: usize,
    /// First bar index the loop evaluated.
    pub warmup_bars: usize,
    pub bar_count: usize,
    /// Post-warm-up bars whose price was NaN or non-positive.
    pub skipped_bars: usize,
    pub total_commission: f64,
    pub realized_pnl: f64,
}

impl RunResult {
    /// `(final_cash - initial_cash) / initial_cash * 100`.
    pub fn net_performance_pct(&self) -> f64 {
        if self.initial_cash == 0.0 {
            return 0.0;
        }
        (self.final_cash - self.initial_cash) / self.initial_cash * 100.0
    }
}
