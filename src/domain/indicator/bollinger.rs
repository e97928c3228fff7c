//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//! Width is also reported for the window ending one bar earlier so callers
//! can detect band expansion.
//!
//! Default parameters: period=20, multiplier=2.0
//! Requires at least period + 1 values.

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerValue {
    pub middle: f64,
    pub upper: f64,
    pub lower: f64,
    pub width: f64,
    pub width_prev: f64,
}

fn mean_stddev(window: &[f64]) -> (f64, f64) {
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}

pub fn bollinger(values: &[f64], period: usize, mult: f64) -> Option<BollingerValue> {
    if period == 0 || values.len() < period + 1 {
        return None;
    }

    let len = values.len();
    let (middle, stddev) = mean_stddev(&values[len - period..]);
    let (_, stddev_prev) = mean_stddev(&values[len - period - 1..len - 1]);

    let upper = middle + mult * stddev;
    let lower = middle - mult * stddev;

    Some(BollingerValue {
        middle,
        upper,
        lower,
        width: upper - lower,
        width_prev: 2.0 * mult * stddev_prev,
    })
}
