//! Barwise Core: domain types, ledger, indicators, strategies and the bar loop.
//!
//! - Domain types (bars, trades, equity points)
//! - Validated single-symbol price series
//! - Commission models
//! - Portfolio ledger with signed positions and a trade log
//! - Indicator and strategy traits
//! - The bar-by-bar backtest engine

pub mod costs;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod ledger;
pub mod strategy;

pub use engine::{run_backtest, EngineConfig, PositionSizing, RunResult};
pub use ledger::{LedgerError, OrderSize, PortfolioLedger};
