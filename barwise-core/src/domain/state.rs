//! LedgerState: point-in-time snapshot of the ledger.

use serde::{Deserialize, Serialize};

/// Cash, signed position and number of executed trades.
///
/// `position > 0` is long, `< 0` is short, `0` is flat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub cash: f64,
    pub position: i64,
    pub trade_count: usize,
}

impl LedgerState {
    pub fn is_flat(&self) -> bool {
        self.position == 0
    }

    /// Mark-to-market value at `price`.
    pub fn net_wealth(&self, price: f64) -> f64 {
        self.cash + self.position as f64 * price
    }
}
