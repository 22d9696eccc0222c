//! Criterion benchmarks for Barwise hot paths.
//!
//! 1. Bar loop (full backtest per strategy)
//! 2. Ledger fills (buy/sell round trips)
//! 3. Indicator precompute

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use barwise_core::costs::{NoCommission, TieredCommission};
use barwise_core::data::PriceSeries;
use barwise_core::domain::Bar;
use barwise_core::engine::{run_backtest, EngineConfig};
use barwise_core::indicators::{Indicator, IndicatorValues, MeanLogReturn, Sma};
use barwise_core::ledger::{OrderSize, PortfolioLedger};
use barwise_core::strategy::{MeanReversion, Momentum, SmaCrossover, Strategy};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let price = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            Bar::new(base_date + chrono::Duration::days(i as i64), price)
        })
        .collect()
}

fn make_series(n: usize) -> PriceSeries {
    PriceSeries::new("BENCH", make_bars(n)).unwrap()
}

// ── 1. Bar Loop ──────────────────────────────────────────────────────

fn bench_bar_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("bar_loop");
    let config = EngineConfig::new(100_000.0);

    for &bar_count in &[252, 1260, 2520] {
        let series = make_series(bar_count);
        let strategies: [(&str, Box<dyn Strategy>); 3] = [
            ("sma_crossover_20_50", Box::new(SmaCrossover::new(20, 50).unwrap()) as Box<dyn Strategy>),
            ("momentum_20", Box::new(Momentum::new(20).unwrap())),
            ("mean_reversion_20", Box::new(MeanReversion::new(20, 2.0).unwrap())),
        ];

        for (label, strategy) in &strategies {
            group.bench_with_input(BenchmarkId::new(*label, bar_count), &bar_count, |b, _| {
                b.iter(|| {
                    run_backtest(
                        black_box(&series),
                        strategy.as_ref(),
                        Box::new(TieredCommission::new(0.005, 1.0, 0.01)),
                        black_box(&config),
                    )
                });
            });
        }
    }

    group.finish();
}

// ── 2. Ledger Fills ──────────────────────────────────────────────────

fn bench_ledger(c: &mut Criterion) {
    let bars = make_bars(1_000);

    c.bench_function("ledger_round_trips_500", |b| {
        b.iter(|| {
            let mut ledger = PortfolioLedger::new(1_000_000.0, Box::new(NoCommission));
            for (i, pair) in bars.chunks_exact(2).enumerate() {
                let _ = ledger.buy(2 * i, &pair[0], OrderSize::Cash(10_000.0));
                let _ = ledger.close(2 * i + 1, &pair[1]);
            }
            black_box(ledger.cash())
        });
    });
}

// ── 3. Indicator Precompute ──────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator_precompute");

    for &bar_count in &[252, 1260, 2520] {
        let bars = make_bars(bar_count);
        let stack: Vec<Box<dyn Indicator>> = vec![
            Box::new(Sma::new(42)),
            Box::new(Sma::new(252)),
            Box::new(MeanLogReturn::new(20)),
        ];
        group.bench_with_input(BenchmarkId::new("stack_3", bar_count), &bar_count, |b, _| {
            b.iter(|| IndicatorValues::precompute(black_box(&bars), black_box(&stack)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_bar_loop, bench_ledger, bench_indicators);
criterion_main!(benches);
