//! Performance metrics: pure functions over a net-wealth series.
//!
//! Undefined ratios (zero volatility, zero drawdown, too few points) come
//! back as NaN rather than an error; callers decide how to display them.

use serde::{Deserialize, Serialize};

use barwise_core::engine::RunResult;

/// Trading periods per year for daily bars.
pub const PERIODS_PER_YEAR: f64 = 252.0;

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub final_balance: f64,
    pub net_performance_pct: f64,
    pub trade_count: usize,
    pub total_return: f64,
    #[serde(with = "nan_as_null")]
    pub annualized_return: f64,
    #[serde(with = "nan_as_null")]
    pub sharpe: f64,
    #[serde(with = "nan_as_null")]
    pub sortino: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: usize,
    #[serde(with = "nan_as_null")]
    pub calmar: f64,
}

/// JSON has no NaN: undefined ratios round-trip through `null`.
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            s.serialize_f64(*value)
        } else {
            s.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
    }
}

impl PerformanceMetrics {
    pub fn compute(run: &RunResult) -> Self {
        let nw = run.equity_curve.net_wealth();
        let rets = returns(&nw);
        let index = equity_index(&rets);
        let dd = drawdowns(&index);
        Self {
            final_balance: run.final_cash,
            net_performance_pct: run.net_performance_pct(),
            trade_count: run.trade_count,
            total_return: total_return(&index),
            annualized_return: annualized_return(&index, PERIODS_PER_YEAR),
            sharpe: sharpe_ratio(&rets, PERIODS_PER_YEAR),
            sortino: sortino_ratio(&rets, PERIODS_PER_YEAR),
            max_drawdown: dd.max_drawdown(),
            max_drawdown_duration: dd.max_duration(),
            calmar: calmar_ratio(&index),
        }
    }

    /// Labeled values in display order.
    pub fn summary(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("Final balance", self.final_balance),
            ("Net performance %", self.net_performance_pct),
            ("Trades executed", self.trade_count as f64),
            ("Total return", self.total_return),
            ("Annualized return", self.annualized_return),
            ("Sharpe ratio", self.sharpe),
            ("Sortino ratio", self.sortino),
            ("Max drawdown", self.max_drawdown),
            ("Max drawdown duration", self.max_drawdown_duration as f64),
            ("Calmar ratio", self.calmar),
        ]
    }
}

// ─── Series transforms ──────────────────────────────────────────────

/// Simple returns with `r[0] = 0`. A zero previous value yields a zero return.
pub fn returns(net_wealth: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(net_wealth.len());
    if net_wealth.is_empty() {
        return out;
    }
    out.push(0.0);
    for w in net_wealth.windows(2) {
        out.push(if w[0] == 0.0 { 0.0 } else { w[1] / w[0] - 1.0 });
    }
    out
}

/// Cumulative product of `1 + r`.
pub fn equity_index(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |acc, r| {
            *acc *= 1.0 + r;
            Some(*acc)
        })
        .collect()
}

/// Per-bar drawdown depth and duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawdowns {
    /// `running_max - value`, in equity-index units.
    pub drawdown: Vec<f64>,
    /// Bars since the last high-water mark.
    pub duration: Vec<usize>,
}

impl Drawdowns {
    pub fn max_drawdown(&self) -> f64 {
        self.drawdown.iter().copied().fold(0.0, f64::max)
    }

    pub fn max_duration(&self) -> usize {
        self.duration.iter().copied().max().unwrap_or(0)
    }
}

pub fn drawdowns(equity_index: &[f64]) -> Drawdowns {
    let mut drawdown = Vec::with_capacity(equity_index.len());
    let mut duration = Vec::with_capacity(equity_index.len());
    let mut peak = f64::NEG_INFINITY;
    let mut run = 0usize;

    for &e in equity_index {
        peak = peak.max(e);
        let dd = peak - e;
        run = if dd == 0.0 { 0 } else { run + 1 };
        drawdown.push(dd);
        duration.push(run);
    }
    Drawdowns { drawdown, duration }
}

// ─── Individual metric functions ────────────────────────────────────

/// `e[last] / e[0] - 1`; 0.0 for an empty index.
pub fn total_return(equity_index: &[f64]) -> f64 {
    match (equity_index.first(), equity_index.last()) {
        (Some(&first), Some(&last)) if first != 0.0 => last / first - 1.0,
        _ => 0.0,
    }
}

/// `(1 + total)^(periods / (len - 1)) - 1`; NaN for fewer than 2 points.
pub fn annualized_return(equity_index: &[f64], periods: f64) -> f64 {
    if equity_index.len() < 2 {
        return f64::NAN;
    }
    let total = total_return(equity_index);
    (1.0 + total).powf(periods / (equity_index.len() - 1) as f64) - 1.0
}

/// `sqrt(periods) * mean / stdev` with population stdev.
///
/// NaN when there are no returns or the stdev is zero.
pub fn sharpe_ratio(returns: &[f64], periods: f64) -> f64 {
    if returns.is_empty() {
        return f64::NAN;
    }
    let std = population_std(returns);
    if std == 0.0 || std.is_nan() {
        return f64::NAN;
    }
    periods.sqrt() * mean(returns) / std
}

/// `sqrt(periods) * mean / downside_deviation`, where the downside
/// deviation is `sqrt(mean(min(r, 0)^2))` over all returns.
///
/// NaN when no return is negative.
pub fn sortino_ratio(returns: &[f64], periods: f64) -> f64 {
    if returns.is_empty() {
        return f64::NAN;
    }
    let downside = returns
        .iter()
        .map(|r| r.min(0.0).powi(2))
        .sum::<f64>()
        / returns.len() as f64;
    if downside == 0.0 || downside.is_nan() {
        return f64::NAN;
    }
    periods.sqrt() * mean(returns) / downside.sqrt()
}

/// Annualized return over max drawdown; NaN when there is no drawdown.
pub fn calmar_ratio(equity_index: &[f64]) -> f64 {
    let max_dd = drawdowns(equity_index).max_drawdown();
    if max_dd == 0.0 {
        return f64::NAN;
    }
    annualized_return(equity_index, PERIODS_PER_YEAR) / max_dd
}

// ─── Helpers ────────────────────────────────────────────────────────

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use barwise_core::domain::EquityCurve;

    fn approx(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-10, "expected {b}, got {a}");
    }

    #[test]
    fn returns_start_at_zero() {
        let r = returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 3);
        approx(r[0], 0.0);
        approx(r[1], 0.1);
        approx(r[2], -0.1);
        assert!(returns(&[]).is_empty());
    }

    #[test]
    fn zero_wealth_gives_zero_return() {
        let r = returns(&[0.0, 10.0]);
        assert_eq!(r, vec![0.0, 0.0]);
    }

    #[test]
    fn equity_index_compounds() {
        let e = equity_index(&[0.0, 0.1, -0.1]);
        approx(e[0], 1.0);
        approx(e[1], 1.1);
        approx(e[2], 0.99);
    }

    #[test]
    fn drawdown_depth_and_duration() {
        let dd = drawdowns(&[1.0, 1.2, 1.0, 0.9, 1.3, 1.25]);
        approx(dd.drawdown[2], 0.2);
        approx(dd.drawdown[3], 0.3);
        assert_eq!(dd.duration, vec![0, 0, 1, 2, 0, 1]);
        approx(dd.max_drawdown(), 0.3);
        assert_eq!(dd.max_duration(), 2);
    }

    #[test]
    fn sharpe_uses_population_stdev() {
        let r: [f64; 4] = [0.0, 0.02, -0.01, 0.01];
        let m = 0.02 / 4.0;
        let var = r.iter().map(|x| (x - m).powi(2)).sum::<f64>() / 4.0;
        approx(sharpe_ratio(&r, 252.0), 252f64.sqrt() * m / var.sqrt());
    }

    #[test]
    fn constant_wealth_gives_nan_ratios() {
        let nw = vec![1000.0; 10];
        let r = returns(&nw);
        let e = equity_index(&r);
        assert!(sharpe_ratio(&r, 252.0).is_nan());
        assert!(sortino_ratio(&r, 252.0).is_nan());
        assert!(calmar_ratio(&e).is_nan());
        approx(annualized_return(&e, 252.0), 0.0);
        approx(drawdowns(&e).max_drawdown(), 0.0);
    }

    #[test]
    fn annualized_return_matches_formula() {
        // Two periods elapsed, four per year: 1.1^2 - 1.
        let e = [1.0, 1.05, 1.1];
        approx(annualized_return(&e, 4.0), 0.21);
        assert!(annualized_return(&[1.0], 252.0).is_nan());
        assert!(annualized_return(&[], 252.0).is_nan());
    }

    #[test]
    fn sortino_only_penalizes_downside() {
        let r = [0.0, 0.03, -0.01, 0.02];
        let downside = (0.01f64.powi(2) / 4.0).sqrt();
        approx(sortino_ratio(&r, 252.0), 252f64.sqrt() * 0.01 / downside);
    }

    #[test]
    fn empty_run_does_not_panic() {
        let run = RunResult {
            equity_curve: EquityCurve::new(),
            trades: Vec::new(),
            initial_cash: 1000.0,
            final_cash: 1000.0,
            trade_count: 0,
            warmup_bars: 5,
            bar_count: 3,
            skipped_bars: 0,
            total_commission: 0.0,
            realized_pnl: 0.0,
        };
        let m = PerformanceMetrics::compute(&run);
        assert!(m.sharpe.is_nan());
        assert!(m.calmar.is_nan());
        assert_eq!(m.total_return, 0.0);
        assert_eq!(m.max_drawdown_duration, 0);
        assert_eq!(m.summary().len(), 10);
        assert_eq!(m.summary()[0], ("Final balance", 1000.0));
    }

    #[test]
    fn undefined_ratios_round_trip_as_null() {
        let m = PerformanceMetrics {
            final_balance: 1000.0,
            net_performance_pct: 0.0,
            trade_count: 0,
            total_return: 0.0,
            annualized_return: 0.0,
            sharpe: f64::NAN,
            sortino: f64::NAN,
            max_drawdown: 0.0,
            max_drawdown_duration: 0,
            calmar: f64::NAN,
        };
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"sharpe\":null"));
        let back: PerformanceMetrics = serde_json::from_str(&json).unwrap();
        assert!(back.sharpe.is_nan());
        assert_eq!(back.final_balance, 1000.0);
    }
}
