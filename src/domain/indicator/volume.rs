//! Volume pulse and spike.
//!
//! Pulse = SMA(volume, fast) / SMA(volume, slow). Spike = latest volume above
//! `mult` times SMA(volume, slow).

use crate::domain::indicator::sma;

pub const DEFAULT_FAST: usize = 5;
pub const DEFAULT_SLOW: usize = 20;
pub const DEFAULT_SPIKE_MULT: f64 = 1.5;

pub fn volume_pulse(volumes: &[f64], fast: usize, slow: usize) -> Option<f64> {
    let fast_avg = sma(volumes, fast)?;
    let slow_avg = sma(volumes, slow)?;
    if slow_avg == 0.0 {
        return None;
    }
    Some(fast_avg / slow_avg)
}

pub fn volume_spike(volumes: &[f64], slow: usize, mult: f64) -> bool {
    match (volumes.last(), sma(volumes, slow)) {
        (Some(&current), Some(avg)) if avg > 0.0 => current > avg * mult,
        _ => false,
    }
}
