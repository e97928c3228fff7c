//! RSI (Relative Strength Index).
//!
//! Fixed-window variant: gains and losses are summed over exactly the last
//! `period` consecutive differences and divided by `period`. This is not
//! Wilder's smoothing; values differ from textbook RSI on the same data.
//! A zero difference counts toward gains.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100

pub const DEFAULT_PERIOD: usize = 14;

/// RSI at the latest value. `None` when fewer than `period + 1` values exist.
pub fn rsi(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period + 1 {
        return None;
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in values.len() - period..values.len() {
        let diff = values[i] - values[i - 1];
        if diff >= 0.0 {
            gains += diff;
        } else {
            losses -= diff;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return Some(100.0);
    }

    Some(100.0 - 100.0 / (1.0 + avg_gain / avg_loss))
}
