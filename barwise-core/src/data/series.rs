//! Price series: the validated, time-ordered bar sequence a backtest consumes.
//!
//! Loading and cleaning market data belongs to the caller. This module owns
//! only the consumed contract: one symbol, one price per date, strictly
//! increasing dates, at least one bar. Anything else is rejected here, before
//! a ledger exists.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::Bar;

/// Malformed input at the load boundary. Always fatal for the run.
#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("price series for '{symbol}' is empty")]
    Empty { symbol: String },

    #[error("duplicate bar for date {date}")]
    DuplicateDate { date: NaiveDate },

    #[error("line {line}: cannot parse date '{value}'")]
    InvalidDate { line: usize, value: String },

    #[error("line {line}: missing or unparseable price for {date}")]
    MissingPrice { line: usize, date: NaiveDate },

    #[error("missing column '{column}' in price file")]
    MissingColumn { column: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validated price series for a single symbol.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series from bars in any order.
    ///
    /// Bars are sorted by date. Duplicate dates and empty input are rejected.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(SeriesError::Empty { symbol });
        }
        bars.sort_by_key(|b| b.date);
        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(SeriesError::DuplicateDate { date: pair[1].date });
        }
        Ok(Self { symbol, bars })
    }

    /// Read a `date,<price>` CSV.
    ///
    /// The date column is the one headed `date` (any case), or the first
    /// column. The price column is `price`, or the column named after the
    /// symbol, which lets a wide one-column-per-symbol file be read directly.
    pub fn from_csv_reader<R: Read>(symbol: &str, reader: R) -> Result<Self, SeriesError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let date_idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case("date"))
            .unwrap_or(0);
        let price_idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case("price"))
            .or_else(|| headers.iter().position(|h| h == symbol))
            .ok_or_else(|| SeriesError::MissingColumn {
                column: format!("price|{symbol}"),
            })?;

        let mut bars = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            // Header is line 1.
            let line = i + 2;

            let raw_date = record.get(date_idx).unwrap_or_default();
            let date = parse_date(raw_date).ok_or_else(|| SeriesError::InvalidDate {
                line,
                value: raw_date.to_string(),
            })?;

            let price = record
                .get(price_idx)
                .filter(|v| !v.is_empty())
                .and_then(|v| v.parse::<f64>().ok())
                .ok_or(SeriesError::MissingPrice { line, date })?;

            bars.push(Bar::new(date, price));
        }

        Self::new(symbol, bars)
    }

    pub fn from_csv_path(symbol: &str, path: &Path) -> Result<Self, SeriesError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(symbol, std::io::BufReader::new(file))
    }

    /// Restrict to bars whose date lies in `[start, end]` (either bound optional).
    pub fn slice_dates(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, SeriesError> {
        let bars: Vec<Bar> = self
            .bars
            .iter()
            .filter(|b| start.map_or(true, |s| b.date >= s) && end.map_or(true, |e| b.date <= e))
            .copied()
            .collect();
        Self::new(self.symbol.clone(), bars)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.price).collect()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }

    /// `ln(p[t] / p[t-1])`; NaN at index 0.
    pub fn log_returns(&self) -> Vec<f64> {
        log_returns(&self.bars)
    }
}

pub(crate) fn log_returns(bars: &[Bar]) -> Vec<f64> {
    let mut out = vec![f64::NAN; bars.len()];
    for i in 1..bars.len() {
        out[i] = (bars[i].price / bars[i - 1].price).ln();
    }
    out
}

/// Accepts `YYYY-MM-DD` and timestamp strings that start with one.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}
