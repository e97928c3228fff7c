//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow), both seeded at the first value
//! Signal Line = EMA(signal) of the MACD line, seeded with MACD[slow] at index
//! `slow` rather than warmed independently
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Requires at least slow + signal + 5 values.

use crate::domain::indicator::ema_series;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdValue {
    pub line: f64,
    pub signal: f64,
    pub hist: f64,
    pub hist_prev: f64,
}

pub fn macd(values: &[f64], fast: usize, slow: usize, signal_period: usize) -> Option<MacdValue> {
    if fast == 0 || slow == 0 || signal_period == 0 {
        return None;
    }
    if values.len() < slow + signal_period + 5 {
        return None;
    }

    let ema_fast = ema_series(values, fast);
    let ema_slow = ema_series(values, slow);
    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();

    let k = 2.0 / (signal_period as f64 + 1.0);
    let last = macd_line.len() - 1;
    let mut signal = macd_line[slow];
    let mut signal_prev = signal;
    for (i, &line) in macd_line.iter().enumerate().skip(slow + 1) {
        if i == last {
            signal_prev = signal;
        }
        signal = line * k + signal * (1.0 - k);
    }

    let line = macd_line[last];
    let line_prev = macd_line[last - 1];

    Some(MacdValue {
        line,
        signal,
        hist: line - signal,
        hist_prev: line_prev - signal_prev,
    })
}
