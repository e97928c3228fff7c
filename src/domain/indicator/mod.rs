//! Technical indicator library.
//!
//! Every function is pure and evaluates at the latest element of its input.
//! Insufficient history yields `None`; callers treat absence as "predicate
//! false", never as an error.
//!
//! - `ema` / `sma`: moving averages
//! - `rsi`: fixed-window relative strength
//! - `macd`: line, signal and histogram (current and previous)
//! - `bollinger`: bands plus current and previous band width
//! - `vwap`: volume-weighted typical price
//! - `volume`: short/long average volume pulse and spike
//! - `structure`: short-term structure bias and prior range high/low

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod structure;
pub mod volume;
pub mod vwap;

pub use bollinger::{bollinger, BollingerValue};
pub use ema::{ema, ema_series, sma};
pub use macd::{macd, MacdValue};
pub use rsi::rsi;
pub use structure::{prior_range, structure_bias, PriorRange, StructureBias};
pub use volume::{volume_pulse, volume_spike};
pub use vwap::vwap;

use std::fmt;

/// Indicator identity + parameters, used for labelling and warm-up math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Sma(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
    Vwap(usize),
    PriorRange(usize),
    Structure,
}

impl IndicatorType {
    /// Minimum number of bars before the indicator produces a value.
    pub fn min_bars(&self) -> usize {
        match *self {
            IndicatorType::Ema(_) => 1,
            IndicatorType::Sma(period) => period,
            IndicatorType::Rsi(period) => period + 1,
            IndicatorType::Macd { slow, signal, .. } => slow + signal + 5,
            IndicatorType::Bollinger { period, .. } => period + 1,
            IndicatorType::Vwap(period) => period,
            IndicatorType::PriorRange(lookback) => lookback + 2,
            IndicatorType::Structure => structure::STRUCTURE_WINDOW,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
            IndicatorType::Vwap(period) => write!(f, "VWAP({})", period),
            IndicatorType::PriorRange(lookback) => write!(f, "RANGE({})", lookback),
            IndicatorType::Structure => write!(f, "STRUCTURE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display_macd() {
        let macd = IndicatorType::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(macd.to_string(), "MACD(12,26,9)");
    }

    #[test]
    fn indicator_type_display_bollinger() {
        let boll = IndicatorType::Bollinger {
            period: 20,
            stddev_mult_x100: 200,
        };
        assert_eq!(boll.to_string(), "BOLLINGER(20,2)");
    }

    #[test]
    fn min_bars_matches_guards() {
        assert_eq!(IndicatorType::Ema(50).min_bars(), 1);
        assert_eq!(IndicatorType::Sma(20).min_bars(), 20);
        assert_eq!(IndicatorType::Rsi(14).min_bars(), 15);
        assert_eq!(
            IndicatorType::Macd {
                fast: 12,
                slow: 26,
                signal: 9
            }
            .min_bars(),
            40
        );
        assert_eq!(
            IndicatorType::Bollinger {
                period: 20,
                stddev_mult_x100: 200
            }
            .min_bars(),
            21
        );
        assert_eq!(IndicatorType::Vwap(30).min_bars(), 30);
        assert_eq!(IndicatorType::PriorRange(20).min_bars(), 22);
        assert_eq!(IndicatorType::Structure.min_bars(), 5);
    }
}
