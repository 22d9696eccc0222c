//! Bar-by-bar loop: the heart of the backtesting engine.
//!
//! Per bar, after warm-up:
//! 1. Skip (as HOLD) if the price is not tradable
//! 2. Ask the strategy for a decision
//! 3. Apply the Flat/Long state machine to the ledger
//! 4. Force-close on the terminal bar
//! 5. Record the equity point

use tracing::{debug, info, warn};

use crate::costs::CommissionModel;
use crate::data::PriceSeries;
use crate::domain::{Bar, EquityCurve, EquityPoint};
use crate::indicators::IndicatorValues;
use crate::ledger::{OrderSize, PortfolioLedger};
use crate::strategy::{Decision, Strategy};

use super::state::{EngineConfig, MarketState, RunResult};

/// Tolerance for the debug-mode accounting identity check.
const CONSERVATION_EPSILON: f64 = 1e-6;

/// Run one strategy over one series.
///
/// Owns its ledger and equity curve and only borrows the series, so
/// independent runs can execute in parallel over the same data.
pub fn run_backtest(
    series: &PriceSeries,
    strategy: &dyn Strategy,
    commission: Box<dyn CommissionModel>,
    config: &EngineConfig,
) -> RunResult {
    let bars = series.bars();
    let n = bars.len();
    let start = strategy.warmup_bars();

    info!(
        symbol = series.symbol(),
        strategy = strategy.name(),
        bars = n,
        warmup = start,
        commission = commission.name(),
        initial_cash = config.initial_cash,
        "backtest started"
    );

    // Trailing windows only, so precomputing on the full series is safe.
    let indicators = IndicatorValues::precompute(bars, &strategy.indicators());

    let mut ledger = PortfolioLedger::new(config.initial_cash, commission);
    let mut curve = EquityCurve::with_capacity(n.saturating_sub(start));
    let mut state = MarketState::Flat;
    let mut skipped_bars = 0usize;
    let mut last_valid_price = bars[..start.min(n)]
        .iter()
        .rev()
        .find(|b| b.is_tradable())
        .map(|b| b.price);

    for t in start..n {
        let bar = &bars[t];
        let is_last = t + 1 == n;

        if bar.is_tradable() {
            last_valid_price = Some(bar.price);
            let decision = strategy.decide(t, &bars[..=t], &indicators);
            state = apply_decision(&mut ledger, state, decision, t, bar, config);
        } else {
            skipped_bars += 1;
            warn!(bar = t, date = %bar.date, price = bar.price, "untradable price, holding");
        }

        if is_last {
            force_close(&mut ledger, t, bar, last_valid_price);
            state = MarketState::Flat;
        }

        let mark = last_valid_price.unwrap_or(0.0);
        let net_wealth = ledger.net_wealth(mark);
        debug_assert!(
            (net_wealth - ledger.expected_net_wealth(mark)).abs()
                <= CONSERVATION_EPSILON * net_wealth.abs().max(1.0),
            "ledger identity violated at bar {t}"
        );
        curve.push(EquityPoint {
            bar_index: t,
            date: bar.date,
            units: ledger.position(),
            cash: ledger.cash(),
            net_wealth,
        });
    }
    debug_assert_eq!(state, MarketState::Flat);

    let result = RunResult {
        equity_curve: curve,
        initial_cash: config.initial_cash,
        final_cash: ledger.cash(),
        trade_count: ledger.trades().len(),
        warmup_bars: start,
        bar_count: n,
        skipped_bars,
        total_commission: ledger.total_commission(),
        realized_pnl: ledger.realized_pnl(),
        trades: ledger.into_trades(),
    };

    info!(
        final_cash = result.final_cash,
        trades = result.trade_count,
        skipped = result.skipped_bars,
        net_performance_pct = result.net_performance_pct(),
        "backtest finished"
    );
    result
}

/// Flat/Long state machine. Every pair other than Flat+Buy and Long+Sell
/// is a no-op.
fn apply_decision(
    ledger: &mut PortfolioLedger,
    state: MarketState,
    decision: Decision,
    t: usize,
    bar: &Bar,
    config: &EngineConfig,
) -> MarketState {
    let outcome = match (state, decision) {
        (MarketState::Flat, Decision::Buy) => {
            let size = config.position_sizing.order_size(ledger.cash());
            ledger.buy(t, bar, size)
        }
        (MarketState::Long, Decision::Sell) => {
            let held = ledger.position();
            ledger.sell(t, bar, OrderSize::Units(held))
        }
        _ => return state,
    };

    match outcome {
        Ok(trade) if trade.is_empty() => {
            debug!(bar = t, ?decision, "order resolved to zero units");
            state
        }
        Ok(_) => match decision {
            Decision::Buy => MarketState::Long,
            _ => MarketState::Flat,
        },
        // Untradable bars never reach here; only sizing errors remain.
        Err(e) => {
            warn!(bar = t, error = %e, "order rejected");
            state
        }
    }
}

/// Close any open position on the terminal bar, falling back to the last
/// valid price when the terminal price is untradable.
fn force_close(ledger: &mut PortfolioLedger, t: usize, bar: &Bar, last_valid_price: Option<f64>) {
    if ledger.position() == 0 {
        return;
    }
    let close_bar = if bar.is_tradable() {
        *bar
    } else {
        match last_valid_price {
            Some(price) => Bar::new(bar.date, price),
            None => {
                warn!(bar = t, "no valid price to close the open position");
                return;
            }
        }
    };
    if let Err(e) = ledger.close(t, &close_bar) {
        warn!(bar = t, error = %e, "terminal close failed");
    }
}
