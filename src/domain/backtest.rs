//! Bar-by-bar backtest simulator.
//!
//! One position slot. Decision bars run from `warmup_bars - 1` to the end;
//! each decision sees only `bars[..=i]`. While a position is open, every
//! later bar is checked in priority order:
//!
//! 1. stop and target both touched: exit at stop (`stop-and-target-same-bar`)
//! 2. target touched: exit at target (`tp`)
//! 3. stop touched: exit at stop (`sl`)
//! 4. `i - open_index >= max_hold_bars`: exit at close (`time`)
//!
//! A bar that closes a position is not used for a new entry. A position
//! still open after the last bar closes at the last close (`end`).

use crate::domain::error::TierscanError;
use crate::domain::metrics::Stats;
use crate::domain::ohlcv::Bar;
use crate::domain::position::{ExitReason, Position, Trade};
use crate::domain::risk::RiskModel;
use crate::domain::scorer::classify;
use crate::domain::signal;
use crate::domain::snapshot::compute_snapshot;
use crate::domain::strategy::{HOLD_HOURS, ScannerConfig};
use tracing::{debug, info};

pub const DEFAULT_WARMUP_BARS: usize = 55;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub max_hold_bars: usize,
    pub warmup_bars: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            max_hold_bars: HOLD_HOURS as usize,
            warmup_bars: DEFAULT_WARMUP_BARS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub stats: Stats,
}

fn check_exit(pos: &Position, bar: &Bar, index: usize, max_hold_bars: usize) -> Option<Trade> {
    let stop_hit = pos.stop_touched(bar);
    let target_hit = pos.target_touched(bar);

    let (price, reason) = if stop_hit && target_hit {
        (pos.stop, ExitReason::StopAndTargetSameBar)
    } else if target_hit {
        (pos.target, ExitReason::TakeProfit)
    } else if stop_hit {
        (pos.stop, ExitReason::StopLoss)
    } else if index - pos.open_index >= max_hold_bars {
        (bar.close, ExitReason::Time)
    } else {
        return None;
    };

    Some(pos.close(price, index, bar.time, reason))
}

fn try_open(bars: &[Bar], index: usize, config: &ScannerConfig) -> Option<Position> {
    let window = &bars[..=index];
    let bar = &bars[index];
    let prev_close = bars[index - 1].close;

    let snap = compute_snapshot(window, &config.indicators);
    let class = classify(&snap, bar.close, prev_close, config)?;
    let levels = config.risk.levels(class.side, class.stage, bar.close);

    Some(Position {
        side: class.side,
        stage: class.stage,
        entry_price: bar.close,
        entry_time: bar.time,
        stop: levels.stop,
        target: levels.target,
        open_index: index,
        risk_pct: levels.risk_pct,
        reward_pct: levels.reward_pct,
        score: class.score,
        strength: signal::strength(class.score, config.score_max),
    })
}

pub fn run_backtest(
    bars: &[Bar],
    scanner: &ScannerConfig,
    config: &BacktestConfig,
) -> Result<BacktestResult, TierscanError> {
    let warmup = config.warmup_bars.max(2);
    if bars.len() < warmup {
        return Err(TierscanError::InsufficientData {
            bars: bars.len(),
            minimum: warmup,
        });
    }

    let mut trades: Vec<Trade> = Vec::new();
    let mut open: Option<Position> = None;

    for i in (warmup - 1)..bars.len() {
        if let Some(pos) = open.as_ref() {
            if i > pos.open_index {
                if let Some(trade) = check_exit(pos, &bars[i], i, config.max_hold_bars) {
                    debug!(
                        index = i,
                        side = %trade.side,
                        reason = %trade.exit_reason,
                        r = trade.r_multiple,
                        "position closed"
                    );
                    trades.push(trade);
                    open = None;
                }
            }
            continue;
        }

        if let Some(pos) = try_open(bars, i, scanner) {
            debug!(
                index = i,
                side = %pos.side,
                stage = %pos.stage,
                entry = pos.entry_price,
                "position opened"
            );
            open = Some(pos);
        }
    }

    if let Some(pos) = open.take() {
        let last_index = bars.len() - 1;
        let last = &bars[last_index];
        let trade = pos.close(last.close, last_index, last.time, ExitReason::End);
        debug!(index = last_index, side = %trade.side, "position closed at end of data");
        trades.push(trade);
    }

    let stats = Stats::compute(&trades);
    info!(
        bars = bars.len(),
        trades = stats.total_trades,
        total_r = stats.total_r,
        "backtest complete"
    );

    Ok(BacktestResult { trades, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::Side;
    use chrono::{NaiveDate, NaiveDateTime};

    fn t(i: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::hours(i as i64)
    }

    fn flat_bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| Bar {
                time: t(i),
                open: 100.0,
                high: 100.0,
                low: 100.0,
                close: 100.0,
                volume: 50.0,
            })
            .collect()
    }

    fn long_pos(open_index: usize) -> Position {
        Position {
            side: Side::Long,
            stage: crate::domain::signal::Stage::Confirm,
            entry_price: 100.0,
            entry_time: t(open_index),
            stop: 98.0,
            target: 105.0,
            open_index,
            risk_pct: 2.0,
            reward_pct: 5.0,
            score: 4,
            strength: 3,
        }
    }

    fn bar(i: usize, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            time: t(i),
            open: close,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn defaults() {
        let c = BacktestConfig::default();
        assert_eq!(c.max_hold_bars, 6);
        assert_eq!(c.warmup_bars, 55);
    }

    #[test]
    fn insufficient_data_fails_fast() {
        let err = run_backtest(
            &flat_bars(54),
            &ScannerConfig::default(),
            &BacktestConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TierscanError::InsufficientData {
                bars: 54,
                minimum: 55
            }
        ));
    }

    #[test]
    fn flat_series_no_trades() {
        let result = run_backtest(
            &flat_bars(150),
            &ScannerConfig::default(),
            &BacktestConfig::default(),
        )
        .unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.stats.total_trades, 0);
        assert_eq!(result.stats.max_drawdown_r, 0.0);
    }

    #[test]
    fn same_bar_collision_exits_at_stop() {
        let pos = long_pos(3);
        let trade = check_exit(&pos, &bar(4, 106.0, 97.0, 101.0), 4, 6).unwrap();
        assert_eq!(trade.exit_reason, ExitReason::StopAndTargetSameBar);
        assert_eq!(trade.exit_price, 98.0);
        assert!(trade.r_multiple < 0.0);
    }

    #[test]
    fn exit_priority_target_then_stop_then_time() {
        let pos = long_pos(3);

        let tp = check_exit(&pos, &bar(4, 105.5, 99.0, 105.0), 4, 6).unwrap();
        assert_eq!(tp.exit_reason, ExitReason::TakeProfit);
        assert_eq!(tp.exit_price, 105.0);

        let sl = check_exit(&pos, &bar(4, 101.0, 97.5, 98.5), 4, 6).unwrap();
        assert_eq!(sl.exit_reason, ExitReason::StopLoss);
        assert_eq!(sl.exit_price, 98.0);

        assert!(check_exit(&pos, &bar(8, 101.0, 99.0, 100.5), 8, 6).is_none());
        let time = check_exit(&pos, &bar(9, 101.0, 99.0, 100.5), 9, 6).unwrap();
        assert_eq!(time.exit_reason, ExitReason::Time);
        assert_eq!(time.exit_price, 100.5);
        assert_eq!(time.held_bars, 6);
    }

    #[test]
    fn warmup_never_below_two() {
        let cfg = BacktestConfig {
            warmup_bars: 0,
            ..BacktestConfig::default()
        };
        let err = run_backtest(&flat_bars(1), &ScannerConfig::default(), &cfg).unwrap_err();
        assert!(matches!(err, TierscanError::InsufficientData { minimum: 2, .. }));
    }
}
