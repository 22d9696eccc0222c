//! Barwise Runner: backtest orchestration, metrics, sweeps and artifacts.

pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod reporting;
pub mod runner;
pub mod sweep;

pub use config::{BacktestConfig, BacktestSection, ConfigError, RunId};
pub use data_loader::{load_series, LoadError, LoadOptions, LoadedSeries};
pub use metrics::PerformanceMetrics;
pub use reporting::{save_artifacts, ArtifactPaths, ReportConfig};
pub use runner::{run_from_config, run_loaded, run_single_backtest, BacktestResult, RunError};
pub use sweep::{run_sweep, ParamGrid, SweepResults};
