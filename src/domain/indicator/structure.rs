//! Short-term structure bias and prior range.

use crate::domain::ohlcv::Bar;
use std::fmt;

pub const STRUCTURE_WINDOW: usize = 5;
pub const DEFAULT_RANGE_LOOKBACK: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureBias {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for StructureBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StructureBias::Bullish => "bullish",
            StructureBias::Bearish => "bearish",
            StructureBias::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// Bias of the last five closes: bullish with at least three up-moves and a
/// net rise, bearish symmetric, otherwise neutral. Short input is neutral.
pub fn structure_bias(closes: &[f64]) -> StructureBias {
    if closes.len() < STRUCTURE_WINDOW {
        return StructureBias::Neutral;
    }

    let last = &closes[closes.len() - STRUCTURE_WINDOW..];
    let mut up = 0;
    let mut down = 0;
    for w in last.windows(2) {
        if w[1] > w[0] {
            up += 1;
        }
        if w[1] < w[0] {
            down += 1;
        }
    }

    let first = last[0];
    let latest = last[STRUCTURE_WINDOW - 1];
    if up >= 3 && latest > first {
        StructureBias::Bullish
    } else if down >= 3 && latest < first {
        StructureBias::Bearish
    } else {
        StructureBias::Neutral
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorRange {
    pub high: f64,
    pub low: f64,
}

/// High/low of the `lookback` bars before the latest bar; the latest bar is
/// excluded. Needs `lookback + 2` bars.
pub fn prior_range(bars: &[Bar], lookback: usize) -> Option<PriorRange> {
    if lookback == 0 || bars.len() < lookback + 2 {
        return None;
    }

    let end = bars.len() - 1;
    let window = &bars[end - lookback..end];
    let high = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

    if !high.is_finite() || !low.is_finite() {
        return None;
    }
    Some(PriorRange { high, low })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bar(i: usize, high: f64, low: f64) -> Bar {
        Bar {
            time: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                + chrono::Duration::hours(i as i64),
            open: (high + low) / 2.0,
            high,
            low,
            close: (high + low) / 2.0,
            volume: 1.0,
        }
    }

    #[test]
    fn bias_bullish() {
        assert_eq!(
            structure_bias(&[1.0, 2.0, 3.0, 2.5, 4.0]),
            StructureBias::Bullish
        );
    }

    #[test]
    fn bias_bearish() {
        assert_eq!(
            structure_bias(&[5.0, 4.0, 4.5, 3.0, 2.0]),
            StructureBias::Bearish
        );
    }

    #[test]
    fn bias_needs_net_move() {
        // three up-moves but last below first
        assert_eq!(
            structure_bias(&[10.0, 1.0, 2.0, 3.0, 4.0]),
            StructureBias::Neutral
        );
    }

    #[test]
    fn bias_only_last_five() {
        assert_eq!(
            structure_bias(&[9.0, 8.0, 7.0, 1.0, 2.0, 3.0, 4.0, 5.0]),
            StructureBias::Bullish
        );
    }

    #[test]
    fn bias_short_input_neutral() {
        assert_eq!(structure_bias(&[1.0, 2.0, 3.0, 4.0]), StructureBias::Neutral);
        assert_eq!(structure_bias(&[]), StructureBias::Neutral);
    }

    #[test]
    fn bias_display() {
        assert_eq!(StructureBias::Bullish.to_string(), "bullish");
        assert_eq!(StructureBias::Neutral.to_string(), "neutral");
    }

    #[test]
    fn prior_range_excludes_latest_bar() {
        let bars = vec![
            make_bar(0, 50.0, 40.0),
            make_bar(1, 12.0, 8.0),
            make_bar(2, 15.0, 9.0),
            make_bar(3, 100.0, 1.0),
        ];
        let range = prior_range(&bars, 2).unwrap();
        assert_eq!(range, PriorRange { high: 15.0, low: 8.0 });
    }

    #[test]
    fn prior_range_insufficient() {
        let bars = vec![
            make_bar(0, 3.0, 2.0),
            make_bar(1, 1.0, 0.0),
            make_bar(2, 9.0, 8.0),
        ];
        assert_eq!(prior_range(&bars, 1), Some(PriorRange { high: 1.0, low: 0.0 }));
        assert_eq!(prior_range(&bars, 2), None);
        assert_eq!(prior_range(&bars, 0), None);
    }
}
