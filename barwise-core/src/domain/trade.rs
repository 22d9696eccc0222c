//! Trade: an immutable fill record appended to the ledger's trade log.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

/// A single executed order.
///
/// `units` is signed: positive for buys, negative for sells. A zero-unit
/// trade is what `close()` returns on a flat ledger; it is never appended to
/// the log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub bar_index: usize,
    pub date: NaiveDate,
    pub units: i64,
    pub price: f64,
    pub commission: f64,
}

impl Trade {
    pub fn side(&self) -> Side {
        if self.units < 0 {
            Side::Sell
        } else {
            Side::Buy
        }
    }

    pub fn is_empty(&self) -> bool {
        self.units == 0
    }

    /// Gross traded value, always non-negative.
    pub fn notional(&self) -> f64 {
        self.units.unsigned_abs() as f64 * self.price
    }

    /// Signed cash impact: `-(units * price) - commission`.
    pub fn cash_delta(&self) -> f64 {
        -(self.units as f64 * self.price) - self.commission
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(units: i64) -> Trade {
        Trade {
            bar_index: 4,
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            units,
            price: 100.0,
            commission: 2.5,
        }
    }

    #[test]
    fn side_follows_sign() {
        assert_eq!(trade(10).side(), Side::Buy);
        assert_eq!(trade(-10).side(), Side::Sell);
    }

    #[test]
    fn notional_is_unsigned() {
        assert_eq!(trade(-10).notional(), 1000.0);
        assert_eq!(trade(10).notional(), 1000.0);
    }

    #[test]
    fn cash_delta_charges_commission_both_ways() {
        assert!((trade(10).cash_delta() - (-1002.5)).abs() < 1e-10);
        assert!((trade(-10).cash_delta() - 997.5).abs() < 1e-10);
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let t = trade(-7);
        let json = serde_json::to_string(&t).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(t, deser);
    }
}
