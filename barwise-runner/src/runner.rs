//! Backtest runner: wires config, strategy, commission, engine and metrics.
//!
//! Two entry points:
//! - `run_single_backtest()`: takes a pre-loaded series. Used by sweeps.
//! - `run_from_config()`: loads the series first. Used by the CLI.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use barwise_core::data::PriceSeries;
use barwise_core::engine::{run_backtest, RunResult};
use barwise_core::strategy::StrategyError;

use crate::config::{BacktestConfig, ConfigError, RunId};
use crate::data_loader::{compute_dataset_hash, load_series, LoadError, LoadOptions, LoadedSeries};
use crate::metrics::PerformanceMetrics;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("strategy error: {0}")]
    Strategy(#[from] StrategyError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub symbol: String,
    pub strategy: String,
    pub config: BacktestConfig,
    pub start_date: String,
    pub end_date: String,
    pub dataset_hash: String,
    pub synthetic: bool,
    pub metrics: PerformanceMetrics,
    pub run: RunResult,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run one backtest on an already-loaded series. No I/O.
pub fn run_single_backtest(
    config: &BacktestConfig,
    series: &PriceSeries,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let strategy = config.strategy.build()?;
    let commission = config.commission.build();

    let run = run_backtest(series, strategy.as_ref(), commission, &config.engine_config());
    let metrics = PerformanceMetrics::compute(&run);

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        symbol: series.symbol().to_string(),
        strategy: config.strategy.label(),
        config: config.clone(),
        start_date: series.first_date().to_string(),
        end_date: series.last_date().to_string(),
        dataset_hash: compute_dataset_hash(series),
        synthetic: false,
        metrics,
        run,
    })
}

/// Run on a loaded series, carrying its provenance into the result.
pub fn run_loaded(config: &BacktestConfig, loaded: &LoadedSeries) -> Result<BacktestResult, RunError> {
    let mut result = run_single_backtest(config, &loaded.series)?;
    result.synthetic = loaded.synthetic;
    Ok(result)
}

/// Load the configured series, then run.
pub fn run_from_config(
    config: &BacktestConfig,
    opts: &LoadOptions,
) -> Result<BacktestResult, RunError> {
    let loaded = load_series(config, opts)?;
    run_loaded(config, &loaded)
}
