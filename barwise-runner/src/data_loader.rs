//! Price loading for the runner.
//!
//! Resolution order for a symbol:
//! 1. `LoadOptions::data_path` override, else the config's `data_path`
//! 2. If no file is configured (or it does not exist) and `synthetic` is
//!    set, a deterministic synthetic random walk (tagged)
//! 3. Otherwise fail with a clear error
//!
//! The configured date window is applied after loading.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use thiserror::Error;
use tracing::{info, warn};

use barwise_core::data::{PriceSeries, SeriesError};
use barwise_core::domain::Bar;

use crate::config::BacktestConfig;

/// Window used for synthetic data when the config has no dates.
const SYNTHETIC_DEFAULT_START: (i32, u32, u32) = (2010, 1, 1);
const SYNTHETIC_DEFAULT_END: (i32, u32, u32) = (2019, 12, 31);

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data source for '{symbol}' (set data_path or use --synthetic)")]
    NoDataSource { symbol: String },

    #[error("failed to load {path}: {source}")]
    File { path: PathBuf, source: SeriesError },

    #[error("series error: {0}")]
    Series(#[from] SeriesError),
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Overrides `backtest.data_path`.
    pub data_path: Option<PathBuf>,
    /// Generate synthetic prices when no file can be loaded.
    pub synthetic: bool,
}

/// Loaded prices with provenance.
#[derive(Debug, Clone)]
pub struct LoadedSeries {
    pub series: PriceSeries,
    /// BLAKE3 over symbol, dates and prices.
    pub dataset_hash: String,
    pub synthetic: bool,
}

pub fn load_series(config: &BacktestConfig, opts: &LoadOptions) -> Result<LoadedSeries, LoadError> {
    let section = &config.backtest;
    let symbol = section.symbol.as_str();
    let path = opts.data_path.as_ref().or(section.data_path.as_ref());

    let (full, synthetic) = match path {
        Some(path) => match PriceSeries::from_csv_path(symbol, path) {
            Ok(series) => (series, false),
            // Malformed content stays fatal; only a missing file falls back.
            Err(SeriesError::Io(e)) if opts.synthetic && e.kind() == ErrorKind::NotFound => {
                warn!(symbol, path = %path.display(), error = %e, "falling back to synthetic data");
                (synthetic_for(config)?, true)
            }
            Err(source) => {
                return Err(LoadError::File {
                    path: path.clone(),
                    source,
                })
            }
        },
        None if opts.synthetic => {
            warn!(symbol, "generating synthetic data; results are tagged as synthetic");
            (synthetic_for(config)?, true)
        }
        None => {
            return Err(LoadError::NoDataSource {
                symbol: symbol.to_string(),
            })
        }
    };

    let series = full.slice_dates(section.start_date, section.end_date)?;
    let dataset_hash = compute_dataset_hash(&series);
    info!(
        symbol,
        bars = series.len(),
        first = %series.first_date(),
        last = %series.last_date(),
        synthetic,
        "price series loaded"
    );

    Ok(LoadedSeries {
        series,
        dataset_hash,
        synthetic,
    })
}

fn synthetic_for(config: &BacktestConfig) -> Result<PriceSeries, SeriesError> {
    let (sy, sm, sd) = SYNTHETIC_DEFAULT_START;
    let (ey, em, ed) = SYNTHETIC_DEFAULT_END;
    let start = config
        .backtest
        .start_date
        .or_else(|| NaiveDate::from_ymd_opt(sy, sm, sd))
        .unwrap_or_default();
    let end = config
        .backtest
        .end_date
        .or_else(|| NaiveDate::from_ymd_opt(ey, em, ed))
        .unwrap_or_default();
    generate_synthetic_series(&config.backtest.symbol, start, end)
}

/// Deterministic BLAKE3 hash over the series contents.
pub fn compute_dataset_hash(series: &PriceSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(series.symbol().as_bytes());
    for bar in series.bars() {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.price.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Write `date,price` rows that `PriceSeries::from_csv_path` reads back.
pub fn write_series_csv(path: &Path, series: &PriceSeries) -> Result<(), SeriesError> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["date", "price"])?;
    for bar in series.bars() {
        wtr.write_record([bar.date.to_string(), bar.price.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Random-walk prices on weekdays in `[start, end]`, starting at 100.0.
///
/// Seeded from the symbol name, so the same symbol always produces the same
/// path.
pub fn generate_synthetic_series(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, SeriesError> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        let weekday = current.weekday();
        if weekday != chrono::Weekday::Sat && weekday != chrono::Weekday::Sun {
            bars.push(Bar::new(current, price));
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            price *= 1.0 + daily_return;
        }
        current += chrono::Duration::days(1);
    }

    PriceSeries::new(symbol, bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(symbol: &str) -> BacktestConfig {
        BacktestConfig::from_toml(&format!(
            r#"
[backtest]
symbol = "{symbol}"
start_date = "2020-01-01"
end_date = "2020-03-31"
initial_cash = 1000.0

[strategy]
type = "sma_crossover"
fast = 2
slow = 5
"#
        ))
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn no_source_without_synthetic_fails() {
        let err = load_series(&config("SPY"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::NoDataSource { .. }));
    }

    #[test]
    fn synthetic_is_tagged_and_windowed() {
        let opts = LoadOptions {
            synthetic: true,
            ..Default::default()
        };
        let loaded = load_series(&config("SPY"), &opts).unwrap();
        assert!(loaded.synthetic);
        assert!(loaded.series.first_date() >= date(2020, 1, 1));
        assert!(loaded.series.last_date() <= date(2020, 3, 31));
        assert_eq!(loaded.dataset_hash.len(), 64);
    }

    #[test]
    fn synthetic_data_is_deterministic() {
        let a = generate_synthetic_series("SPY", date(2020, 1, 1), date(2020, 12, 31)).unwrap();
        let b = generate_synthetic_series("SPY", date(2020, 1, 1), date(2020, 12, 31)).unwrap();
        assert_eq!(a.prices(), b.prices());
        assert_eq!(compute_dataset_hash(&a), compute_dataset_hash(&b));
    }

    #[test]
    fn different_symbols_get_different_synthetic_data() {
        let a = generate_synthetic_series("SPY", date(2020, 1, 1), date(2020, 3, 31)).unwrap();
        let b = generate_synthetic_series("QQQ", date(2020, 1, 1), date(2020, 3, 31)).unwrap();
        assert_ne!(a.prices(), b.prices());
    }

    #[test]
    fn synthetic_skips_weekends() {
        // 2024-01-06 and 2024-01-07 are a weekend.
        let s = generate_synthetic_series("SPY", date(2024, 1, 5), date(2024, 1, 8)).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.bars()[0].price, 100.0);
    }

    #[test]
    fn loads_csv_and_applies_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(
            &path,
            "date,price\n2019-12-31,10\n2020-01-02,11\n2020-01-03,12\n2020-04-01,13\n",
        )
        .unwrap();

        let opts = LoadOptions {
            data_path: Some(path),
            synthetic: false,
        };
        let loaded = load_series(&config("SPY"), &opts).unwrap();
        assert!(!loaded.synthetic);
        assert_eq!(loaded.series.prices(), vec![11.0, 12.0]);
    }

    #[test]
    fn written_csv_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("synth.csv");
        let s = generate_synthetic_series("SPY", date(2020, 1, 1), date(2020, 2, 28)).unwrap();
        write_series_csv(&path, &s).unwrap();
        let back = PriceSeries::from_csv_path("SPY", &path).unwrap();
        assert_eq!(back.prices(), s.prices());
        assert_eq!(back.first_date(), s.first_date());
    }

    #[test]
    fn missing_file_falls_back_when_synthetic() {
        let mut cfg = config("SPY");
        cfg.backtest.data_path = Some(PathBuf::from("/nonexistent/prices.csv"));
        assert!(matches!(
            load_series(&cfg, &LoadOptions::default()).unwrap_err(),
            LoadError::File { .. }
        ));

        let opts = LoadOptions {
            synthetic: true,
            ..Default::default()
        };
        assert!(load_series(&cfg, &opts).unwrap().synthetic);
    }

    #[test]
    fn malformed_file_is_fatal_even_when_synthetic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, "date,price\n2020-01-02,10\n2020-01-02,11\n2020-01-03,12\n").unwrap();

        let opts = LoadOptions {
            data_path: Some(path),
            synthetic: true,
        };
        let err = load_series(&config("SPY"), &opts).unwrap_err();
        assert!(matches!(
            err,
            LoadError::File {
                source: SeriesError::DuplicateDate { .. },
                ..
            }
        ));
    }

    #[test]
    fn unparseable_price_is_fatal_even_when_synthetic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(&path, "date,price\n2020-01-02,10\n2020-01-03,abc\n").unwrap();

        let opts = LoadOptions {
            data_path: Some(path),
            synthetic: true,
        };
        let err = load_series(&config("SPY"), &opts).unwrap_err();
        assert!(matches!(
            err,
            LoadError::File {
                source: SeriesError::MissingPrice { .. },
                ..
            }
        ));
    }
}
