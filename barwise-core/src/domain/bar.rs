//! Bar: one discrete time step's price observation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Single price observation for one symbol on one day.
///
/// Bars are immutable once loaded into a `PriceSeries`. Derived indicator
/// values are not stored on the bar; they live in `IndicatorValues`, keyed by
/// bar index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub price: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }

    /// Returns true if the price is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.price.is_nan()
    }

    /// A bar can be traded on only with a finite, strictly positive price.
    pub fn is_tradable(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}
