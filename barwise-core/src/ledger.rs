//! Portfolio ledger: cash, signed unit position, cost basis and trade log.
//!
//! The ledger is mutated only through `buy`, `sell` and `close`. Every fill
//! updates cash and position together:
//!
//! `cash_after = cash_before - units * price - commission`
//!
//! with `units` signed (+buy / -sell), so a sell credits
//! `|units| * price - commission`. Selling more than is held is allowed and
//! leaves a negative (short) position. `close` liquidates at the bar price
//! without commission.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::costs::CommissionModel;
use crate::domain::{Bar, LedgerState, Trade};

/// Errors from ledger operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Price is NaN or non-positive; the order cannot be priced.
    #[error("insufficient data on {date}: price {price} is not tradable")]
    InsufficientData { date: NaiveDate, price: f64 },

    #[error("invalid order size: {0}")]
    InvalidSize(String),
}

/// How much to trade: an explicit unit count or a cash budget.
///
/// A cash budget buys or sells `floor(budget / price)` units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderSize {
    Units(i64),
    Cash(f64),
}

impl OrderSize {
    fn resolve(self, price: f64) -> Result<i64, LedgerError> {
        match self {
            OrderSize::Units(units) if units < 0 => Err(LedgerError::InvalidSize(format!(
                "unit count must be non-negative, got {units}"
            ))),
            OrderSize::Units(units) => Ok(units),
            OrderSize::Cash(budget) if budget.is_nan() || budget < 0.0 => Err(LedgerError::InvalidSize(
                format!("cash budget must be non-negative, got {budget}"),
            )),
            OrderSize::Cash(budget) => Ok((budget / price).floor() as i64),
        }
    }
}

/// Single-symbol ledger. One ledger lives for exactly one backtest run.
#[derive(Debug)]
pub struct PortfolioLedger {
    initial_cash: f64,
    cash: f64,
    position: i64,
    /// Average entry price of the open position; 0 when flat.
    avg_entry_price: f64,
    realized_pnl: f64,
    total_commission: f64,
    trades: Vec<Trade>,
    commission_model: Box<dyn CommissionModel>,
}

impl PortfolioLedger {
    pub fn new(initial_cash: f64, commission_model: Box<dyn CommissionModel>) -> Self {
        Self {
            initial_cash,
            cash: initial_cash,
            position: 0,
            avg_entry_price: 0.0,
            realized_pnl: 0.0,
            total_commission: 0.0,
            trades: Vec::new(),
            commission_model,
        }
    }

    /// Buy `size` at the bar's price.
    pub fn buy(&mut self, bar_index: usize, bar: &Bar, size: OrderSize) -> Result<Trade, LedgerError> {
        check_tradable(bar)?;
        let units = size.resolve(bar.price)?;
        let commission = self.commission_model.commission(units, bar.price);
        Ok(self.execute(bar_index, bar, units, commission))
    }

    /// Sell `size` at the bar's price. May take the position below zero.
    pub fn sell(&mut self, bar_index: usize, bar: &Bar, size: OrderSize) -> Result<Trade, LedgerError> {
        check_tradable(bar)?;
        let units = size.resolve(bar.price)?;
        let commission = self.commission_model.commission(units, bar.price);
        Ok(self.execute(bar_index, bar, -units, commission))
    }

    /// Liquidate the whole position at the bar's price. No commission is
    /// charged on the close-out.
    ///
    /// On a flat ledger this returns a zero-unit trade and changes nothing,
    /// whatever the bar's price.
    pub fn close(&mut self, bar_index: usize, bar: &Bar) -> Result<Trade, LedgerError> {
        if self.position == 0 {
            return Ok(empty_trade(bar_index, bar));
        }
        check_tradable(bar)?;
        Ok(self.execute(bar_index, bar, -self.position, 0.0))
    }

    /// Apply a signed fill. Zero-unit fills are not charged or logged.
    fn execute(&mut self, bar_index: usize, bar: &Bar, units: i64, commission: f64) -> Trade {
        if units == 0 {
            return empty_trade(bar_index, bar);
        }

        let trade = Trade {
            bar_index,
            date: bar.date,
            units,
            price: bar.price,
            commission,
        };

        self.cash += trade.cash_delta();
        self.total_commission += commission;
        self.apply_to_position(units, bar.price);
        self.trades.push(trade);

        debug!(
            date = %bar.date,
            side = ?trade.side(),
            units = units.unsigned_abs(),
            price = bar.price,
            commission,
            cash = self.cash,
            position = self.position,
            net_wealth = self.net_wealth(bar.price),
            "order filled"
        );

        trade
    }

    /// Update position and cost basis; realize PnL on the reduced part.
    fn apply_to_position(&mut self, units: i64, price: f64) {
        let before = self.position;
        let after = before + units;

        if before == 0 || before.signum() == units.signum() {
            // Opening or adding: volume-weighted average entry.
            let cost = self.avg_entry_price * before.unsigned_abs() as f64
                + price * units.unsigned_abs() as f64;
            self.avg_entry_price = cost / after.unsigned_abs() as f64;
        } else {
            let closed = units.unsigned_abs().min(before.unsigned_abs()) as f64;
            self.realized_pnl += (price - self.avg_entry_price) * closed * before.signum() as f64;

            if after == 0 {
                self.avg_entry_price = 0.0;
            } else if after.signum() != before.signum() {
                // Flipped through zero: remainder opens at this price.
                self.avg_entry_price = price;
            }
        }

        self.position = after;
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn avg_entry_price(&self) -> f64 {
        self.avg_entry_price
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }

    /// Gross realized PnL (before commission).
    pub fn realized_pnl(&self) -> f64 {
        self.realized_pnl
    }

    pub fn total_commission(&self) -> f64 {
        self.total_commission
    }

    pub fn commission_model(&self) -> &dyn CommissionModel {
        self.commission_model.as_ref()
    }

    pub fn state(&self) -> LedgerState {
        LedgerState {
            cash: self.cash,
            position: self.position,
            trade_count: self.trades.len(),
        }
    }

    /// `cash + position * price`.
    pub fn net_wealth(&self, price: f64) -> f64 {
        self.cash + self.position as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        if self.position == 0 {
            return 0.0;
        }
        (price - self.avg_entry_price) * self.position as f64
    }

    /// Unrealized PnL as a fraction of the open position's cost basis.
    ///
    /// Exactly 0.0 when cost basis × quantity is zero.
    pub fn unrealized_pnl_ratio(&self, price: f64) -> f64 {
        let basis = self.avg_entry_price * self.position.unsigned_abs() as f64;
        if basis == 0.0 {
            return 0.0;
        }
        self.unrealized_pnl(price) / basis
    }

    /// Net wealth implied by the accounting identity:
    /// `initial + realized + unrealized - commission`.
    pub fn expected_net_wealth(&self, price: f64) -> f64 {
        self.initial_cash + self.realized_pnl + self.unrealized_pnl(price) - self.total_commission
    }
}

fn check_tradable(bar: &Bar) -> Result<(), LedgerError> {
    if bar.is_tradable() {
        Ok(())
    } else {
        Err(LedgerError::InsufficientData {
            date: bar.date,
            price: bar.price,
        })
    }
}

fn empty_trade(bar_index: usize, bar: &Bar) -> Trade {
    Trade {
        bar_index,
        date: bar.date,
        units: 0,
        price: bar.price,
        commission: 0.0,
    }
}
