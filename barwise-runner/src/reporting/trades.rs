//! Trade log export.

use std::path::Path;

use anyhow::{Context, Result};

use barwise_core::domain::{Side, Trade};

pub fn write_trades_csv(path: &Path, trades: &[Trade], precision: usize) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create trades CSV {}", path.display()))?;
    wtr.write_record(["bar_index", "date", "side", "units", "price", "commission"])?;
    for t in trades {
        let side = match t.side() {
            Side::Buy => "buy",
            Side::Sell => "sell",
        };
        wtr.write_record([
            t.bar_index.to_string(),
            t.date.to_string(),
            side.to_string(),
            t.units.unsigned_abs().to_string(),
            format!("{:.precision$}", t.price),
            format!("{:.precision$}", t.commission),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to write trades CSV {}", path.display()))?;
    Ok(())
}
