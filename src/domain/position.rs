//! Open position and closed trade records for the bar-by-bar simulator.

use crate::domain::ohlcv::Bar;
use crate::domain::signal::{Side, Stage};
use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub side: Side,
    pub stage: Stage,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub stop: f64,
    pub target: f64,
    pub open_index: usize,
    pub risk_pct: f64,
    pub reward_pct: f64,
    pub score: usize,
    pub strength: u8,
}

impl Position {
    pub fn is_long(&self) -> bool {
        self.side == Side::Long
    }

    /// Long: low at or below stop. Short: high at or above stop.
    pub fn stop_touched(&self, bar: &Bar) -> bool {
        if self.is_long() {
            bar.low <= self.stop
        } else {
            bar.high >= self.stop
        }
    }

    /// Long: high at or above target. Short: low at or below target.
    pub fn target_touched(&self, bar: &Bar) -> bool {
        if self.is_long() {
            bar.high >= self.target
        } else {
            bar.low <= self.target
        }
    }

    /// Signed percentage return from entry to `exit_price`.
    pub fn pnl_pct(&self, exit_price: f64) -> f64 {
        match self.side {
            Side::Long => (exit_price - self.entry_price) / self.entry_price * 100.0,
            Side::Short => (self.entry_price - exit_price) / self.entry_price * 100.0,
        }
    }

    pub fn close(
        &self,
        exit_price: f64,
        exit_index: usize,
        exit_time: NaiveDateTime,
        exit_reason: ExitReason,
    ) -> Trade {
        let pnl_pct = self.pnl_pct(exit_price);
        let r_multiple = if self.risk_pct > 0.0 {
            pnl_pct / self.risk_pct
        } else {
            0.0
        };
        Trade {
            side: self.side,
            stage: self.stage,
            entry_price: self.entry_price,
            exit_price,
            entry_index: self.open_index,
            exit_index,
            entry_time: self.entry_time,
            exit_time,
            pnl_pct,
            r_multiple,
            held_bars: exit_index - self.open_index,
            exit_reason,
            score: self.score,
            strength: self.strength,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    StopAndTargetSameBar,
    Time,
    End,
}

impl ExitReason {
    pub const ALL: [ExitReason; 5] = [
        ExitReason::StopLoss,
        ExitReason::TakeProfit,
        ExitReason::StopAndTargetSameBar,
        ExitReason::Time,
        ExitReason::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::StopLoss => "sl",
            ExitReason::TakeProfit => "tp",
            ExitReason::StopAndTargetSameBar => "stop-and-target-same-bar",
            ExitReason::Time => "time",
            ExitReason::End => "end",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub side: Side,
    pub stage: Stage,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub pnl_pct: f64,
    /// `pnl_pct / risk_pct`
    pub r_multiple: f64,
    pub held_bars: usize,
    pub exit_reason: ExitReason,
    pub score: usize,
    pub strength: u8,
}
