//! Exponential and simple moving averages.
//!
//! EMA: k = 2/(n+1), seeded with the first value (no SMA warm-up), then
//! EMA[i] = V[i]*k + EMA[i-1]*(1-k).
//! SMA: arithmetic mean of the last n values.

/// Full EMA series over `values`, one entry per input.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.is_empty() {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut series = Vec::with_capacity(values.len());
    let mut ema = values[0];
    series.push(ema);

    for &value in &values[1..] {
        ema = value * k + ema * (1.0 - k);
        series.push(ema);
    }

    series
}

/// EMA at the latest value. `None` when `values` is empty.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).last().copied()
}

/// Mean of the last `period` values. `None` when fewer than `period` exist.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}
