//! Barwise CLI: run, sweep and synthetic-data commands.
//!
//! Commands:
//! - `run`: execute a backtest from a TOML config or command-line parameters
//! - `sweep`: grid-search SMA crossover windows over one series
//! - `synth`: write a deterministic synthetic price CSV

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use barwise_core::costs::CommissionConfig;
use barwise_core::engine::PositionSizing;
use barwise_core::strategy::StrategyConfig;
use barwise_runner::data_loader::{generate_synthetic_series, write_series_csv};
use barwise_runner::{
    load_series, run_loaded, run_sweep, save_artifacts, BacktestConfig,
    BacktestResult, BacktestSection, LoadOptions, ParamGrid, ReportConfig,
};

#[derive(Parser)]
#[command(name = "barwise", about = "Barwise CLI: event-based single-symbol backtester")]
struct Cli {
    /// Verbose logging (-v shows per-order ledger events).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML config file or explicit parameters.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Price CSV; overrides `data_path` from the config.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Use synthetic prices when no CSV is configured or the file is missing.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Symbol (without --config).
        #[arg(long, default_value = "AAPL.O")]
        symbol: String,

        /// Fast SMA window (without --config).
        #[arg(long, default_value_t = 42)]
        fast: usize,

        /// Slow SMA window (without --config).
        #[arg(long, default_value_t = 252)]
        slow: usize,

        /// Initial cash (without --config).
        #[arg(long, default_value_t = 10_000.0)]
        cash: f64,

        /// Fixed cost per trade (without --config).
        #[arg(long, default_value_t = 0.0)]
        fixed_cost: f64,

        /// Proportional cost per trade (without --config).
        #[arg(long, default_value_t = 0.0)]
        prop_cost: f64,

        /// Start date (YYYY-MM-DD, without --config).
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD, without --config).
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Decimal places in CSV artifacts.
        #[arg(long, default_value_t = 4)]
        precision: usize,
    },
    /// Grid-search SMA crossover windows.
    Sweep {
        /// Path to a TOML config file (the base run).
        #[arg(long)]
        config: PathBuf,

        /// Price CSV; overrides `data_path` from the config.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Use synthetic prices when no CSV is configured or the file is missing.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Fast windows, comma-separated.
        #[arg(long, value_delimiter = ',', default_values_t = [10, 20, 30, 42])]
        fast: Vec<usize>,

        /// Slow windows, comma-separated.
        #[arg(long, value_delimiter = ',', default_values_t = [50, 100, 200, 252])]
        slow: Vec<usize>,

        /// Run on one thread.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Rows to print.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Write a deterministic synthetic price CSV.
    Synth {
        #[arg(long, default_value = "SYN")]
        symbol: String,

        #[arg(long, default_value = "2010-01-01")]
        start: NaiveDate,

        #[arg(long, default_value = "2019-12-31")]
        end: NaiveDate,

        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            config,
            data,
            synthetic,
            symbol,
            fast,
            slow,
            cash,
            fixed_cost,
            prop_cost,
            start,
            end,
            output_dir,
            precision,
        } => {
            let backtest_config = match config {
                Some(path) => BacktestConfig::from_file(&path)?,
                None => config_from_args(symbol, fast, slow, cash, fixed_cost, prop_cost, start, end)?,
            };
            let opts = LoadOptions {
                data_path: data,
                synthetic,
            };
            let report = ReportConfig {
                output_dir,
                precision,
            };
            run_cmd(&backtest_config, &opts, &report)
        }
        Commands::Sweep {
            config,
            data,
            synthetic,
            fast,
            slow,
            sequential,
            top,
        } => {
            let base = BacktestConfig::from_file(&config)?;
            let opts = LoadOptions {
                data_path: data,
                synthetic,
            };
            sweep_cmd(&base, &opts, ParamGrid::new(fast, slow), !sequential, top)
        }
        Commands::Synth {
            symbol,
            start,
            end,
            output,
        } => {
            if start > end {
                bail!("--start {start} is after --end {end}");
            }
            let series = generate_synthetic_series(&symbol, start, end)?;
            write_series_csv(&output, &series)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote {} bars for {symbol} to {}", series.len(), output.display());
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = if verbose > 0 {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[allow(clippy::too_many_arguments)]
fn config_from_args(
    symbol: String,
    fast: usize,
    slow: usize,
    cash: f64,
    fixed_cost: f64,
    prop_cost: f64,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<BacktestConfig> {
    let commission = if fixed_cost == 0.0 && prop_cost == 0.0 {
        CommissionConfig::None
    } else {
        CommissionConfig::Fixed {
            fixed: fixed_cost,
            rate: prop_cost,
        }
    };
    let config = BacktestConfig {
        backtest: BacktestSection {
            symbol,
            data_path: None,
            start_date: start,
            end_date: end,
            initial_cash: cash,
            sizing: PositionSizing::AllCash,
        },
        strategy: StrategyConfig::SmaCrossover { fast, slow },
        commission,
    };
    config.validate()?;
    Ok(config)
}

fn run_cmd(config: &BacktestConfig, opts: &LoadOptions, report: &ReportConfig) -> Result<()> {
    let loaded = load_series(config, opts)?;
    let result = run_loaded(config, &loaded)?;
    print_summary(&result);

    let paths = save_artifacts(&result, report)?;
    println!("Artifacts saved to: {}", paths.run_dir.display());
    Ok(())
}

fn sweep_cmd(
    base: &BacktestConfig,
    opts: &LoadOptions,
    grid: ParamGrid,
    parallel: bool,
    top: usize,
) -> Result<()> {
    if grid.size() == 0 {
        bail!("sweep grid has no valid (fast < slow) pairs");
    }
    let loaded = load_series(base, opts)?;
    let sweep = run_sweep(base, &loaded.series, &grid, parallel)?;

    println!(
        "{:<24} {:>12} {:>10} {:>10} {:>8}",
        "strategy", "final", "net %", "sharpe", "trades"
    );
    for r in sweep.top_n(top) {
        println!(
            "{:<24} {:>12.2} {:>10.2} {:>10} {:>8}",
            r.strategy,
            r.metrics.final_balance,
            r.metrics.net_performance_pct,
            fmt_ratio(r.metrics.sharpe),
            r.metrics.trade_count
        );
    }
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    let rule = "=".repeat(55);
    println!("{rule}");
    println!(
        "{} | {} | {} to {}{}",
        result.symbol,
        result.strategy,
        result.start_date,
        result.end_date,
        if result.synthetic { " [synthetic]" } else { "" }
    );
    println!("{rule}");
    for (label, value) in result.metrics.summary() {
        let shown = match label {
            "Trades executed" | "Max drawdown duration" => format!("{value:.0}"),
            _ => fmt_ratio(value),
        };
        println!("{label:<24} {shown:>14}");
    }
    println!("{rule}");
}

fn fmt_ratio(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.4}")
    } else {
        "n/a".to_string()
    }
}
