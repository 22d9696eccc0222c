//! Parameter sweep over SMA crossover windows.
//!
//! Each grid point gets its own ledger; all runs borrow the same series
//! read-only, so the parallel path needs no locking.

use std::cmp::Ordering;

use rayon::prelude::*;
use tracing::info;

use barwise_core::data::PriceSeries;
use barwise_core::strategy::StrategyConfig;

use crate::config::BacktestConfig;
use crate::runner::{run_single_backtest, BacktestResult, RunError};

/// Fast/slow window grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamGrid {
    pub fast_periods: Vec<usize>,
    pub slow_periods: Vec<usize>,
}

impl ParamGrid {
    pub fn new(fast_periods: Vec<usize>, slow_periods: Vec<usize>) -> Self {
        Self {
            fast_periods,
            slow_periods,
        }
    }

    /// Fast 10/20/30/42 against slow 50/100/200/252.
    pub fn sma_default() -> Self {
        Self::new(vec![10, 20, 30, 42], vec![50, 100, 200, 252])
    }

    /// Valid `(fast, slow)` pairs; pairs with `fast >= slow` or a zero
    /// window are skipped.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for &fast in &self.fast_periods {
            for &slow in &self.slow_periods {
                if fast >= 1 && fast < slow {
                    pairs.push((fast, slow));
                }
            }
        }
        pairs
    }

    pub fn size(&self) -> usize {
        self.pairs().len()
    }

    /// One config per valid pair, each a copy of `base` with the strategy
    /// replaced.
    pub fn generate_configs(&self, base: &BacktestConfig) -> Vec<BacktestConfig> {
        self.pairs()
            .into_iter()
            .map(|(fast, slow)| {
                let mut config = base.clone();
                config.strategy = StrategyConfig::SmaCrossover { fast, slow };
                config
            })
            .collect()
    }
}

/// Sweep results ranked by Sharpe ratio, best first, NaN last.
#[derive(Debug, Clone)]
pub struct SweepResults {
    results: Vec<BacktestResult>,
}

impl SweepResults {
    fn ranked(mut results: Vec<BacktestResult>) -> Self {
        results.sort_by(|a, b| compare_sharpe(a.metrics.sharpe, b.metrics.sharpe));
        Self { results }
    }

    pub fn results(&self) -> &[BacktestResult] {
        &self.results
    }

    pub fn best(&self) -> Option<&BacktestResult> {
        self.results.first()
    }

    pub fn top_n(&self, n: usize) -> &[BacktestResult] {
        &self.results[..n.min(self.results.len())]
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Descending by value, NaN after every number.
fn compare_sharpe(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

/// Run every grid point against `series`.
///
/// Fails on the first run error. Results are ranked the same way whether
/// run in parallel or sequentially.
pub fn run_sweep(
    base: &BacktestConfig,
    series: &PriceSeries,
    grid: &ParamGrid,
    parallel: bool,
) -> Result<SweepResults, RunError> {
    let configs = grid.generate_configs(base);
    info!(runs = configs.len(), parallel, "sweep started");

    let results: Result<Vec<_>, RunError> = if parallel {
        configs
            .par_iter()
            .map(|config| run_single_backtest(config, series))
            .collect()
    } else {
        configs
            .iter()
            .map(|config| run_single_backtest(config, series))
            .collect()
    };

    let ranked = SweepResults::ranked(results?);
    if let Some(best) = ranked.best() {
        info!(best = %best.strategy, sharpe = best.metrics.sharpe, "sweep finished");
    }
    Ok(ranked)
}
