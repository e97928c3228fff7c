//! Indicator snapshot at the latest bar of a bar prefix.

use crate::domain::indicator::{
    bollinger, ema, macd, prior_range, rsi, structure_bias, volume_pulse, volume_spike, vwap,
    BollingerValue, MacdValue, PriorRange, StructureBias,
};
use crate::domain::ohlcv::{closes, volumes, Bar};
use crate::domain::strategy::IndicatorParams;

/// Every indicator value the scorer reads. Each component is optional;
/// missing history leaves it `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<MacdValue>,
    pub bollinger: Option<BollingerValue>,
    pub vwap: Option<f64>,
    pub volume_pulse: Option<f64>,
    pub volume_spike: bool,
    pub structure_bias: StructureBias,
    pub prior_range: Option<PriorRange>,
}

impl IndicatorSnapshot {
    /// Snapshot with nothing computed.
    pub fn empty() -> Self {
        IndicatorSnapshot {
            ema_fast: None,
            ema_slow: None,
            rsi: None,
            macd: None,
            bollinger: None,
            vwap: None,
            volume_pulse: None,
            volume_spike: false,
            structure_bias: StructureBias::Neutral,
            prior_range: None,
        }
    }

    /// Percentage distance of `price` from VWAP.
    pub fn vwap_dev_pct(&self, price: f64) -> Option<f64> {
        self.vwap.map(|v| (price - v) / v * 100.0)
    }
}

/// Computes the snapshot from `bars` only; callers pass `&bars[..=i]` to
/// evaluate bar `i` without lookahead.
pub fn compute_snapshot(bars: &[Bar], params: &IndicatorParams) -> IndicatorSnapshot {
    let closes = closes(bars);
    let volumes = volumes(bars);

    IndicatorSnapshot {
        ema_fast: ema(&closes, params.ema_fast),
        ema_slow: ema(&closes, params.ema_slow),
        rsi: rsi(&closes, params.rsi_period),
        macd: macd(
            &closes,
            params.macd_fast,
            params.macd_slow,
            params.macd_signal,
        ),
        bollinger: bollinger(&closes, params.bb_period, params.bb_mult),
        vwap: vwap(bars, params.vwap_period),
        volume_pulse: volume_pulse(&volumes, params.volume_fast, params.volume_slow),
        volume_spike: volume_spike(&volumes, params.volume_slow, params.volume_spike_mult),
        structure_bias: structure_bias(&closes),
        prior_range: prior_range(bars, params.range_lookback),
    }
}
