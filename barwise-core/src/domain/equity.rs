//! Equity curve: append-only per-bar record of units, cash and net wealth.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ledger snapshot at one bar, taken after that bar's order was applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub bar_index: usize,
    pub date: NaiveDate,
    pub units: i64,
    pub cash: f64,
    /// `cash + units * price`.
    pub net_wealth: f64,
}

/// Ordered equity points keyed by bar index.
///
/// The engine is the only writer. Bar indices are strictly increasing; the
/// curve is decoupled from the input series and read-only once the run
/// returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquityCurve {
    points: Vec<EquityPoint>,
}

impl EquityCurve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, point: EquityPoint) {
        debug_assert!(
            self.points
                .last()
                .map_or(true, |last| last.bar_index < point.bar_index),
            "equity points must be appended in bar order"
        );
        self.points.push(point);
    }

    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    pub fn net_wealth(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.net_wealth).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn last(&self) -> Option<&EquityPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
