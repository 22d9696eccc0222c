//! Run summary export (JSON).

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::BacktestConfig;
use crate::metrics::PerformanceMetrics;
use crate::runner::BacktestResult;

/// Everything in `summary.json`. The equity curve and trade log live in
/// their own CSV files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub schema_version: u32,
    pub run_id: String,
    pub symbol: String,
    pub strategy: String,
    pub start_date: String,
    pub end_date: String,
    pub dataset_hash: String,
    pub synthetic: bool,
    pub bar_count: usize,
    pub warmup_bars: usize,
    pub skipped_bars: usize,
    pub total_commission: f64,
    pub realized_pnl: f64,
    pub metrics: PerformanceMetrics,
    pub config: BacktestConfig,
}

impl RunSummary {
    pub fn from_result(result: &BacktestResult) -> Self {
        Self {
            schema_version: result.schema_version,
            run_id: result.run_id.clone(),
            symbol: result.symbol.clone(),
            strategy: result.strategy.clone(),
            start_date: result.start_date.clone(),
            end_date: result.end_date.clone(),
            dataset_hash: result.dataset_hash.clone(),
            synthetic: result.synthetic,
            bar_count: result.run.bar_count,
            warmup_bars: result.run.warmup_bars,
            skipped_bars: result.run.skipped_bars,
            total_commission: result.run.total_commission,
            realized_pnl: result.run.realized_pnl,
            metrics: result.metrics.clone(),
            config: result.config.clone(),
        }
    }
}

pub fn write_summary_json(path: &Path, result: &BacktestResult) -> Result<()> {
    let json = serde_json::to_string_pretty(&RunSummary::from_result(result))
        .context("Failed to serialize run summary")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write summary JSON {}", path.display()))?;
    Ok(())
}
