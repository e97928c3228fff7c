//! Scanner strategy configuration: indicator windows, predicate thresholds,
//! tier minimums and the side tie-break policy.
//!
//! Everything here is passed explicitly into the scorer and simulator; the
//! core never reads process-wide settings.

use crate::domain::indicator::{bollinger, macd, rsi, structure, volume, vwap, IndicatorType};
use crate::domain::risk::FixedPctRisk;
use std::fmt;
use std::str::FromStr;

pub const CONFIRM_MIN_SCORE: usize = 4;
pub const WATCH_MIN_SCORE: usize = 2;
pub const SCORE_MAX: usize = 8;
pub const HOLD_HOURS: i64 = 6;
/// Upper bound on `hold_hours` (100 years).
pub const MAX_HOLD_HOURS: i64 = 24 * 365 * 100;

/// Which side wins when both sides qualify for the same stage.
///
/// Resolution is always confirm before watch; within a stage the preferred
/// side is checked first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SidePreference {
    #[default]
    LongFirst,
    ShortFirst,
}

impl FromStr for SidePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" | "long_first" | "long-first" => Ok(SidePreference::LongFirst),
            "short" | "short_first" | "short-first" => Ok(SidePreference::ShortFirst),
            other => Err(format!("unknown side preference '{other}'")),
        }
    }
}

impl fmt::Display for SidePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SidePreference::LongFirst => f.write_str("long_first"),
            SidePreference::ShortFirst => f.write_str("short_first"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_period: usize,
    pub bb_mult: f64,
    pub vwap_period: usize,
    pub volume_fast: usize,
    pub volume_slow: usize,
    pub volume_spike_mult: f64,
    pub range_lookback: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        IndicatorParams {
            ema_fast: 20,
            ema_slow: 50,
            rsi_period: rsi::DEFAULT_PERIOD,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            bb_period: bollinger::DEFAULT_PERIOD,
            bb_mult: bollinger::DEFAULT_MULT,
            vwap_period: vwap::DEFAULT_PERIOD,
            volume_fast: volume::DEFAULT_FAST,
            volume_slow: volume::DEFAULT_SLOW,
            volume_spike_mult: volume::DEFAULT_SPIKE_MULT,
            range_lookback: structure::DEFAULT_RANGE_LOOKBACK,
        }
    }
}

impl IndicatorParams {
    pub fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Ema(self.ema_fast),
            IndicatorType::Ema(self.ema_slow),
            IndicatorType::Rsi(self.rsi_period),
            IndicatorType::Macd {
                fast: self.macd_fast,
                slow: self.macd_slow,
                signal: self.macd_signal,
            },
            IndicatorType::Bollinger {
                period: self.bb_period,
                stddev_mult_x100: (self.bb_mult * 100.0).round() as u32,
            },
            IndicatorType::Vwap(self.vwap_period),
            IndicatorType::Sma(self.volume_slow),
            IndicatorType::PriorRange(self.range_lookback),
            IndicatorType::Structure,
        ]
    }

    /// Bars needed before every indicator can be present. The slow EMA is
    /// counted at `period + 5` so it has moved away from its seed.
    pub fn required_bars(&self) -> usize {
        self.indicators()
            .iter()
            .map(|ind| match ind {
                IndicatorType::Ema(period) => period + 5,
                other => other.min_bars(),
            })
            .max()
            .unwrap_or(0)
    }
}

/// Inclusive/exclusive band limits used by the predicate checklist.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// Inclusive RSI pullback band, long.
    pub rsi_pullback_long: (f64, f64),
    /// Inclusive RSI pullback band, short.
    pub rsi_pullback_short: (f64, f64),
    /// Inclusive RSI extended band (hot), long.
    pub rsi_extended_long: (f64, f64),
    /// Inclusive RSI extended band (cold), short.
    pub rsi_extended_short: (f64, f64),
    pub volume_pulse_min: f64,
    /// Exclusive VWAP deviation (%) band for confirm, long.
    pub vwap_confirm_long: (f64, f64),
    pub vwap_confirm_short: (f64, f64),
    /// Exclusive VWAP deviation (%) band for watch, long.
    pub vwap_watch_long: (f64, f64),
    pub vwap_watch_short: (f64, f64),
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            rsi_pullback_long: (48.0, 55.0),
            rsi_pullback_short: (45.0, 52.0),
            rsi_extended_long: (60.0, 72.0),
            rsi_extended_short: (28.0, 40.0),
            volume_pulse_min: 1.1,
            vwap_confirm_long: (-1.5, 3.0),
            vwap_confirm_short: (-3.0, 1.5),
            vwap_watch_long: (-3.0, 6.0),
            vwap_watch_short: (-6.0, 3.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScannerConfig {
    pub confirm_min_score: usize,
    pub watch_min_score: usize,
    pub score_max: usize,
    pub side_preference: SidePreference,
    pub hold_hours: i64,
    pub indicators: IndicatorParams,
    pub thresholds: Thresholds,
    pub risk: FixedPctRisk,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            confirm_min_score: CONFIRM_MIN_SCORE,
            watch_min_score: WATCH_MIN_SCORE,
            score_max: SCORE_MAX,
            side_preference: SidePreference::default(),
            hold_hours: HOLD_HOURS,
            indicators: IndicatorParams::default(),
            thresholds: Thresholds::default(),
            risk: FixedPctRisk::default(),
        }
    }
}
