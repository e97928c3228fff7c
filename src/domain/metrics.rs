//! Trade ledger statistics, expressed in R multiples.
//!
//! win rate      = wins / total
//! profit factor = sum(winning R) / |sum(losing R)|
//! max drawdown  = min(equity - running peak), running peak starts at 0

use super::position::{ExitReason, Trade};

#[derive(Debug, Clone, PartialEq)]
pub struct Stats {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakeven: usize,
    pub win_rate: f64,
    pub total_r: f64,
    pub avg_r: f64,
    pub best_r: f64,
    pub worst_r: f64,
    pub avg_win_r: f64,
    pub avg_loss_r: f64,
    pub profit_factor: f64,
    /// Cumulative R after each trade.
    pub equity_curve: Vec<f64>,
    /// Zero or negative.
    pub max_drawdown_r: f64,
    pub avg_held_bars: f64,
    pub exit_counts: Vec<(ExitReason, usize)>,
}

impl Stats {
    pub fn compute(trades: &[Trade]) -> Self {
        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut breakeven = 0usize;
        let mut total_win_r = 0.0_f64;
        let mut total_loss_r = 0.0_f64;
        let mut total_r = 0.0_f64;
        let mut best_r = f64::NEG_INFINITY;
        let mut worst_r = f64::INFINITY;
        let mut total_held = 0usize;
        let mut equity_curve = Vec::with_capacity(trades.len());

        for trade in trades {
            let r = trade.r_multiple;
            if r > 0.0 {
                wins += 1;
                total_win_r += r;
            } else if r < 0.0 {
                losses += 1;
                total_loss_r += r;
            } else {
                breakeven += 1;
            }
            total_r += r;
            best_r = best_r.max(r);
            worst_r = worst_r.min(r);
            total_held += trade.held_bars;
            equity_curve.push(total_r);
        }

        let total_trades = trades.len();
        if total_trades == 0 {
            best_r = 0.0;
            worst_r = 0.0;
        }

        let ratio = |num: f64, den: usize| if den > 0 { num / den as f64 } else { 0.0 };

        let profit_factor = if total_loss_r < 0.0 {
            total_win_r / total_loss_r.abs()
        } else if total_win_r > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let exit_counts = ExitReason::ALL
            .iter()
            .map(|&reason| {
                let n = trades.iter().filter(|t| t.exit_reason == reason).count();
                (reason, n)
            })
            .collect();

        Stats {
            total_trades,
            wins,
            losses,
            breakeven,
            win_rate: ratio(wins as f64, total_trades),
            total_r,
            avg_r: ratio(total_r, total_trades),
            best_r,
            worst_r,
            avg_win_r: ratio(total_win_r, wins),
            avg_loss_r: ratio(total_loss_r, losses),
            profit_factor,
            max_drawdown_r: max_drawdown(&equity_curve),
            equity_curve,
            avg_held_bars: ratio(total_held as f64, total_trades),
            exit_counts,
        }
    }

    pub fn exit_count(&self, reason: ExitReason) -> usize {
        self.exit_counts
            .iter()
            .find(|(r, _)| *r == reason)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let mut peak = 0.0_f64;
    let mut worst = 0.0_f64;
    for &equity in equity_curve {
        peak = peak.max(equity);
        worst = worst.min(equity - peak);
    }
    worst
}
