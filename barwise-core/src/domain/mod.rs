//! Domain types for Barwise

pub mod bar;
pub mod equity;
pub mod state;
pub mod trade;

pub use bar::Bar;
pub use equity::{EquityCurve, EquityPoint};
pub use state::LedgerState;
pub use trade::{Side, Trade};
