//! Serializable backtest configuration, loaded from TOML.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use barwise_core::costs::CommissionConfig;
use barwise_core::engine::{EngineConfig, PositionSizing};
use barwise_core::strategy::{StrategyConfig, StrategyError};

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid strategy: {0}")]
    Strategy(#[from] StrategyError),
}

/// Everything needed to reproduce a single backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub commission: CommissionConfig,
}

/// The `[backtest]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    pub symbol: String,
    /// CSV with a `date` column and a `price` (or `<symbol>`) column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,
    /// Inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub initial_cash: f64,
    #[serde(default)]
    pub sizing: PositionSizing,
}

impl BacktestConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.backtest;
        if b.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".into()));
        }
        if !b.initial_cash.is_finite() || b.initial_cash <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "initial_cash must be positive, got {}",
                b.initial_cash
            )));
        }
        if let (Some(start), Some(end)) = (b.start_date, b.end_date) {
            if start > end {
                return Err(ConfigError::Invalid(format!(
                    "start_date {start} is after end_date {end}"
                )));
            }
        }
        match b.sizing {
            PositionSizing::FixedUnits { units } if units <= 0 => {
                return Err(ConfigError::Invalid(format!(
                    "sizing.units must be positive, got {units}"
                )));
            }
            PositionSizing::FixedCash { amount } if !(amount.is_finite() && amount > 0.0) => {
                return Err(ConfigError::Invalid(format!(
                    "sizing.amount must be positive, got {amount}"
                )));
            }
            _ => {}
        }
        let negative = self.commission.negative_params();
        if !negative.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "commission parameters must be non-negative: {}",
                negative.join(", ")
            )));
        }
        self.strategy.validate()?;
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.backtest.initial_cash).with_sizing(self.backtest.sizing)
    }

    /// Deterministic BLAKE3 hash of the canonical JSON form.
    ///
    /// Two identical configs share a run id, so their artifacts land in the
    /// same directory.
    pub fn run_id(&self) -> RunId {
        // Plain data with no map keys; serialization cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}
