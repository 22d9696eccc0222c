//! Equity curve export.

use std::path::Path;

use anyhow::{Context, Result};

use barwise_core::domain::EquityCurve;

pub fn write_equity_csv(path: &Path, curve: &EquityCurve, precision: usize) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create equity CSV {}", path.display()))?;
    wtr.write_record(["date", "units", "cash", "net_wealth"])?;
    for p in curve.points() {
        wtr.write_record([
            p.date.to_string(),
            p.units.to_string(),
            format!("{:.precision$}", p.cash),
            format!("{:.precision$}", p.net_wealth),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to write equity CSV {}", path.display()))?;
    Ok(())
}
