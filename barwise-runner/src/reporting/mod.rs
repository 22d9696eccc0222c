//! Artifact export for completed runs.
//!
//! Reporting is a collaborator invoked after the run with explicit
//! configuration; nothing here feeds back into the engine.

mod equity;
mod summary;
mod trades;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::runner::BacktestResult;

pub use summary::RunSummary;

/// Output location and number formatting for artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    /// Decimal places for prices, cash and wealth in CSV output.
    pub precision: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("results"),
            precision: 4,
        }
    }
}

impl ReportConfig {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }
}

/// Paths written by `save_artifacts`.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub trades_csv: PathBuf,
    pub equity_csv: PathBuf,
    pub summary_json: PathBuf,
}

/// Write `trades.csv`, `equity.csv` and `summary.json` into
/// `<output_dir>/<run_id>/`.
pub fn save_artifacts(result: &BacktestResult, config: &ReportConfig) -> Result<ArtifactPaths> {
    let run_dir = config.output_dir.join(&result.run_id);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("Failed to create run directory {}", run_dir.display()))?;

    let trades_csv = run_dir.join("trades.csv");
    trades::write_trades_csv(&trades_csv, &result.run.trades, config.precision)?;

    let equity_csv = run_dir.join("equity.csv");
    equity::write_equity_csv(&equity_csv, &result.run.equity_curve, config.precision)?;

    let summary_json = run_dir.join("summary.json");
    summary::write_summary_json(&summary_json, result)?;

    tracing::info!(dir = %run_dir.display(), "artifacts written");

    Ok(ArtifactPaths {
        run_dir,
        trades_csv,
        equity_csv,
        summary_json,
    })
}
