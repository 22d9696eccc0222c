//! Backtest engine: the bar loop that drives a strategy against a ledger.

pub mod loop_runner;
pub mod state;

pub use loop_runner::run_backtest;
pub use state::{EngineConfig, MarketState, PositionSizing, RunResult};
