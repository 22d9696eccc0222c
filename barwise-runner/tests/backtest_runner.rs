//! Config file → load → run, end to end.

use std::path::PathBuf;

use barwise_runner::{
    load_series, run_from_config, run_single_backtest, run_sweep, BacktestConfig, LoadOptions,
    ParamGrid, RunError,
};

fn write(dir: &std::path::Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

const PRICES: &str = "date,price\n\
2024-01-02,10\n\
2024-01-03,11\n\
2024-01-04,9\n\
2024-01-05,12\n\
2024-01-08,15\n";

#[test]
fn toml_and_csv_reproduce_reference_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write(dir.path(), "prices.csv", PRICES);
    let toml = format!(
        r#"
[backtest]
symbol = "TEST"
data_path = "{}"
initial_cash = 1000.0

[strategy]
type = "sma_crossover"
fast = 2
slow = 3
"#,
        csv.display()
    );
    let cfg_path = write(dir.path(), "backtest.toml", &toml);

    let config = BacktestConfig::from_file(&cfg_path).unwrap();
    let result = run_from_config(&config, &LoadOptions::default()).unwrap();

    assert_eq!(result.run.trades.len(), 2);
    assert_eq!(result.run.trades[0].units, 66);
    assert_eq!(result.run.final_cash, 1000.0);
    assert_eq!(result.metrics.net_performance_pct, 0.0);
    assert!(result.metrics.sharpe.is_nan());
    assert!(result.metrics.calmar.is_nan());
    assert!(!result.synthetic);
}

#[test]
fn wide_csv_selects_symbol_column() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write(
        dir.path(),
        "wide.csv",
        "Date,AAPL.O,MSFT.O\n2024-01-02,10,50\n2024-01-03,11,51\n2024-01-04,12,52\n",
    );
    let config = BacktestConfig::from_toml(
        r#"
[backtest]
symbol = "MSFT.O"
initial_cash = 1000.0

[strategy]
type = "momentum"
window = 1
"#,
    )
    .unwrap();
    let opts = LoadOptions {
        data_path: Some(csv),
        synthetic: false,
    };
    let loaded = load_series(&config, &opts).unwrap();
    assert_eq!(loaded.series.prices(), vec![50.0, 51.0, 52.0]);
}

#[test]
fn synthetic_run_with_commission() {
    let config = BacktestConfig::from_toml(
        r#"
[backtest]
symbol = "SYN"
start_date = "2015-01-01"
end_date = "2018-12-31"
initial_cash = 10000.0

[strategy]
type = "sma_crossover"
fast = 10
slow = 50

[commission]
type = "tiered"
per_unit = 0.005
min_commission = 1.0
max_commission_pct = 0.01
"#,
    )
    .unwrap();
    let opts = LoadOptions {
        data_path: None,
        synthetic: true,
    };
    let result = run_from_config(&config, &opts).unwrap();
    assert!(result.synthetic);
    assert_eq!(result.run.warmup_bars, 49);
    assert_eq!(result.run.equity_curve.len(), result.run.bar_count - 49);
    assert_eq!(result.run.equity_curve.last().unwrap().units, 0);
    let commissions: f64 = result.run.trades.iter().map(|t| t.commission).sum();
    assert!((commissions - result.run.total_commission).abs() < 1e-9);
    assert!(result.run.trades.iter().all(|t| t.commission >= 0.0));
}

#[test]
fn missing_data_is_a_run_error() {
    let config = BacktestConfig::from_toml(
        r#"
[backtest]
symbol = "NONE"
initial_cash = 1000.0

[strategy]
type = "momentum"
window = 5
"#,
    )
    .unwrap();
    let err = run_from_config(&config, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, RunError::Data(_)));
}

#[test]
fn sweep_over_loaded_series() {
    let config = BacktestConfig::from_toml(
        r#"
[backtest]
symbol = "SYN"
start_date = "2016-01-01"
end_date = "2017-12-31"
initial_cash = 10000.0

[strategy]
type = "sma_crossover"
fast = 5
slow = 20
"#,
    )
    .unwrap();
    let loaded = load_series(
        &config,
        &LoadOptions {
            data_path: None,
            synthetic: true,
        },
    )
    .unwrap();
    let grid = ParamGrid::new(vec![5, 10, 40], vec![20, 40]);
    let sweep = run_sweep(&config, &loaded.series, &grid, true).unwrap();
    // (5,20) (5,40) (10,20) (10,40); (40, *) is invalid.
    assert_eq!(sweep.len(), 4);

    // Each sweep point matches a standalone run of the same config.
    let best = sweep.best().unwrap();
    let single = run_single_backtest(&best.config, &loaded.series).unwrap();
    assert_eq!(single.run.final_cash, best.run.final_cash);
    assert_eq!(single.run_id, best.run_id);
}
