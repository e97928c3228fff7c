//! Signal scorer: evaluates the predicate checklist for both sides and
//! resolves at most one (side, stage) classification.
//!
//! Resolution order, first match wins:
//!
//! 1. preferred side, confirm (`confirm score >= confirm_min_score`)
//! 2. other side, confirm
//! 3. preferred side, watch (gate holds and `watch score >= watch_min_score`)
//! 4. other side, watch
//!
//! An absent indicator makes every predicate reading it false.

use crate::domain::indicator::StructureBias;
use crate::domain::ohlcv::Bar;
use crate::domain::risk::RiskModel;
use crate::domain::signal::{self, Instrument, Predicate, Reason, Side, Signal, Stage};
use crate::domain::snapshot::{compute_snapshot, IndicatorSnapshot};
use crate::domain::strategy::{ScannerConfig, SidePreference, Thresholds};
use chrono::{Duration, NaiveDateTime};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub side: Side,
    pub stage: Stage,
    pub score: usize,
    pub reasons: Vec<Reason>,
}

fn in_inclusive(value: f64, band: (f64, f64)) -> bool {
    value >= band.0 && value <= band.1
}

fn in_exclusive(value: f64, band: (f64, f64)) -> bool {
    value > band.0 && value < band.1
}

fn band_expanding(snap: &IndicatorSnapshot) -> bool {
    snap.bollinger
        .is_some_and(|bb| bb.width_prev > 0.0 && bb.width >= bb.width_prev)
}

pub fn evaluate(
    predicate: Predicate,
    side: Side,
    snap: &IndicatorSnapshot,
    price: f64,
    prev_close: f64,
    thresholds: &Thresholds,
) -> bool {
    match predicate {
        Predicate::TrendAligned => match (snap.ema_fast, snap.ema_slow) {
            (Some(fast), Some(slow)) => match side {
                Side::Long => fast > slow && price > fast,
                Side::Short => fast < slow && price < fast,
            },
            _ => false,
        },
        Predicate::StructureAgrees => match side {
            Side::Long => snap.structure_bias != StructureBias::Bearish,
            Side::Short => snap.structure_bias != StructureBias::Bullish,
        },
        Predicate::RsiPullback => snap.rsi.is_some_and(|rsi| match side {
            Side::Long => in_inclusive(rsi, thresholds.rsi_pullback_long),
            Side::Short => in_inclusive(rsi, thresholds.rsi_pullback_short),
        }),
        Predicate::RsiExtended => snap.rsi.is_some_and(|rsi| match side {
            Side::Long => in_inclusive(rsi, thresholds.rsi_extended_long),
            Side::Short => in_inclusive(rsi, thresholds.rsi_extended_short),
        }),
        Predicate::MacdMomentum => snap.macd.is_some_and(|m| match side {
            Side::Long => m.hist > m.hist_prev && m.hist >= 0.0,
            Side::Short => m.hist < m.hist_prev && m.hist <= 0.0,
        }),
        Predicate::BandExpansion => band_expanding(snap),
        Predicate::BandExpansionWithMid => {
            band_expanding(snap)
                && snap.bollinger.is_some_and(|bb| match side {
                    Side::Long => price >= bb.middle,
                    Side::Short => price <= bb.middle,
                })
        }
        Predicate::VolumePulse => snap
            .volume_pulse
            .is_some_and(|p| p > thresholds.volume_pulse_min),
        Predicate::VolumeSpike => snap.volume_spike,
        Predicate::VwapConfirm => snap.vwap_dev_pct(price).is_some_and(|dev| match side {
            Side::Long => in_exclusive(dev, thresholds.vwap_confirm_long),
            Side::Short => in_exclusive(dev, thresholds.vwap_confirm_short),
        }),
        Predicate::VwapWatch => snap.vwap_dev_pct(price).is_some_and(|dev| match side {
            Side::Long => in_exclusive(dev, thresholds.vwap_watch_long),
            Side::Short => in_exclusive(dev, thresholds.vwap_watch_short),
        }),
        Predicate::RangeBreakout => snap.prior_range.is_some_and(|r| match side {
            Side::Long => price >= r.high,
            Side::Short => price <= r.low,
        }),
        Predicate::ShortTermMove => match side {
            Side::Long => price > prev_close,
            Side::Short => price < prev_close,
        },
    }
}

fn checklist(
    predicates: &[Predicate],
    side: Side,
    snap: &IndicatorSnapshot,
    price: f64,
    prev_close: f64,
    thresholds: &Thresholds,
) -> Vec<Reason> {
    predicates
        .iter()
        .map(|&predicate| Reason {
            predicate,
            side,
            passed: evaluate(predicate, side, snap, price, prev_close, thresholds),
        })
        .collect()
}

fn passed(reasons: &[Reason]) -> usize {
    reasons.iter().filter(|r| r.passed).count()
}

fn side_order(pref: SidePreference) -> [Side; 2] {
    match pref {
        SidePreference::LongFirst => [Side::Long, Side::Short],
        SidePreference::ShortFirst => [Side::Short, Side::Long],
    }
}

pub fn classify(
    snap: &IndicatorSnapshot,
    price: f64,
    prev_close: f64,
    config: &ScannerConfig,
) -> Option<Classification> {
    let thresholds = &config.thresholds;
    let order = side_order(config.side_preference);

    for side in order {
        let reasons = checklist(&Predicate::CONFIRM, side, snap, price, prev_close, thresholds);
        let score = passed(&reasons);
        if score >= config.confirm_min_score {
            return Some(Classification {
                side,
                stage: Stage::Confirm,
                score,
                reasons,
            });
        }
    }

    for side in order {
        let gate = Predicate::WATCH_GATE
            .iter()
            .all(|&p| evaluate(p, side, snap, price, prev_close, thresholds));
        if !gate {
            continue;
        }
        let reasons = checklist(&Predicate::WATCH, side, snap, price, prev_close, thresholds);
        let score = passed(&reasons);
        if score >= config.watch_min_score {
            return Some(Classification {
                side,
                stage: Stage::Watch,
                score,
                reasons,
            });
        }
    }

    None
}

/// Scores the latest bar of `bars` at `current_price`. Needs at least two
/// bars; the second-to-last close is the previous close.
pub fn score_signal(
    instrument: &Instrument,
    bars: &[Bar],
    current_price: f64,
    config: &ScannerConfig,
) -> Option<Signal> {
    if bars.len() < 2 {
        return None;
    }
    let last = &bars[bars.len() - 1];
    let prev_close = bars[bars.len() - 2].close;
    // saturates instead of overflowing on out-of-range hold_hours
    let exit_by = Duration::try_hours(config.hold_hours)
        .and_then(|d| last.time.checked_add_signed(d))
        .unwrap_or(if config.hold_hours < 0 {
            NaiveDateTime::MIN
        } else {
            NaiveDateTime::MAX
        });

    let snap = compute_snapshot(bars, &config.indicators);
    let class = classify(&snap, current_price, prev_close, config)?;
    let levels = config.risk.levels(class.side, class.stage, current_price);

    debug!(
        %instrument,
        side = %class.side,
        stage = %class.stage,
        score = class.score,
        "signal"
    );

    Some(Signal {
        instrument: instrument.clone(),
        time: last.time,
        exit_by,
        side: class.side,
        stage: class.stage,
        score: class.score,
        score_max: config.score_max,
        strength: signal::strength(class.score, config.score_max),
        entry: current_price,
        stop: levels.stop,
        target: levels.target,
        risk_pct: levels.risk_pct,
        reward_pct: levels.reward_pct,
        rr: levels.rr,
        vwap: snap.vwap,
        vwap_dev_pct: snap.vwap_dev_pct(current_price),
        volume_pulse: snap.volume_pulse,
        structure_bias: snap.structure_bias,
        reasons: class.reasons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::{BollingerValue, MacdValue, PriorRange};
    use chrono::NaiveDate;

    /// Long-friendly snapshot where every confirm item passes at price 101.
    fn long_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            ema_fast: Some(100.0),
            ema_slow: Some(98.0),
            rsi: Some(50.0),
            macd: Some(MacdValue {
                line: 1.0,
                signal: 0.5,
                hist: 0.5,
                hist_prev: 0.3,
            }),
            bollinger: Some(BollingerValue {
                middle: 100.0,
                upper: 104.0,
                lower: 96.0,
                width: 8.0,
                width_prev: 7.0,
            }),
            vwap: Some(100.0),
            volume_pulse: Some(1.5),
            volume_spike: false,
            structure_bias: StructureBias::Bullish,
            prior_range: Some(PriorRange {
                high: 110.0,
                low: 90.0,
            }),
        }
    }

    fn mirror(snap: &IndicatorSnapshot) -> IndicatorSnapshot {
        // reflect prices around 100 so a long setup becomes a short setup
        let r = |v: f64| 200.0 - v;
        IndicatorSnapshot {
            ema_fast: snap.ema_fast.map(r),
            ema_slow: snap.ema_slow.map(r),
            rsi: snap.rsi.map(|v| 100.0 - v),
            macd: snap.macd.map(|m| MacdValue {
                line: -m.line,
                signal: -m.signal,
                hist: -m.hist,
                hist_prev: -m.hist_prev,
            }),
            bollinger: snap.bollinger,
            vwap: snap.vwap,
            volume_pulse: snap.volume_pulse,
            volume_spike: snap.volume_spike,
            structure_bias: StructureBias::Bearish,
            prior_range: snap.prior_range,
        }
    }

    fn bars(closes: &[f64]) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                time: start + Duration::hours(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 10.0,
            })
            .collect()
    }

    #[test]
    fn long_confirm_when_all_items_pass() {
        let cfg = ScannerConfig::default();
        let c = classify(&long_snapshot(), 101.0, 100.5, &cfg).unwrap();
        assert_eq!(c.side, Side::Long);
        assert_eq!(c.stage, Stage::Confirm);
        assert_eq!(c.score, 6);
        assert_eq!(c.reasons.len(), 6);
        assert!(c.reasons.iter().all(|r| r.passed && r.side == Side::Long));
    }

    #[test]
    fn short_confirm_on_mirrored_snapshot() {
        let cfg = ScannerConfig::default();
        let c = classify(&mirror(&long_snapshot()), 99.0, 99.5, &cfg).unwrap();
        assert_eq!(c.side, Side::Short);
        assert_eq!(c.stage, Stage::Confirm);
    }

    #[test]
    fn absent_indicators_are_false() {
        let snap = IndicatorSnapshot::empty();
        let t = Thresholds::default();
        for p in Predicate::CONFIRM {
            assert!(!evaluate(p, Side::Long, &snap, 100.0, 99.0, &t), "{p:?}");
            assert!(!evaluate(p, Side::Short, &snap, 100.0, 101.0, &t), "{p:?}");
        }
        // neutral structure agrees with both sides
        assert!(evaluate(Predicate::StructureAgrees, Side::Long, &snap, 1.0, 1.0, &t));
        assert!(evaluate(Predicate::StructureAgrees, Side::Short, &snap, 1.0, 1.0, &t));
    }

    #[test]
    fn rsi_bands_inclusive_vwap_bands_exclusive() {
        let t = Thresholds::default();
        let mut snap = IndicatorSnapshot::empty();
        snap.rsi = Some(55.0);
        assert!(evaluate(Predicate::RsiPullback, Side::Long, &snap, 0.0, 0.0, &t));
        snap.rsi = Some(55.01);
        assert!(!evaluate(Predicate::RsiPullback, Side::Long, &snap, 0.0, 0.0, &t));

        snap.vwap = Some(100.0);
        assert!(!evaluate(Predicate::VwapConfirm, Side::Long, &snap, 103.0, 0.0, &t));
        assert!(evaluate(Predicate::VwapConfirm, Side::Long, &snap, 102.9, 0.0, &t));
        assert!(!evaluate(Predicate::VwapConfirm, Side::Long, &snap, 98.0, 0.0, &t));
    }

    #[test]
    fn band_expansion_needs_prior_width() {
        let t = Thresholds::default();
        let mut snap = IndicatorSnapshot::empty();
        snap.bollinger = Some(BollingerValue {
            middle: 100.0,
            upper: 100.0,
            lower: 100.0,
            width: 0.0,
            width_prev: 0.0,
        });
        assert!(!evaluate(Predicate::BandExpansion, Side::Long, &snap, 100.0, 0.0, &t));
    }

    #[test]
    fn watch_requires_gate() {
        let cfg = ScannerConfig::default();
        let mut snap = long_snapshot();
        // knock confirm down to 3 so only watch can match
        snap.rsi = Some(65.0);
        snap.vwap = Some(90.0);
        snap.volume_pulse = Some(1.0);
        let c = classify(&snap, 111.0, 110.0, &cfg).unwrap();
        assert_eq!(c.stage, Stage::Watch);
        assert_eq!(c.side, Side::Long);
        assert_eq!(c.reasons.len(), 8);

        snap.structure_bias = StructureBias::Bearish;
        assert_eq!(classify(&snap, 111.0, 110.0, &cfg), None);
    }

    #[test]
    fn side_preference_breaks_ties() {
        // a snapshot where both sides reach the confirm minimum
        let snap = IndicatorSnapshot {
            ema_fast: None,
            ema_slow: None,
            rsi: Some(50.0),
            macd: Some(MacdValue {
                line: 0.0,
                signal: 0.0,
                hist: 0.0,
                hist_prev: 0.0,
            }),
            bollinger: Some(BollingerValue {
                middle: 100.0,
                upper: 102.0,
                lower: 98.0,
                width: 4.0,
                width_prev: 4.0,
            }),
            vwap: Some(100.0),
            volume_pulse: Some(2.0),
            volume_spike: false,
            structure_bias: StructureBias::Neutral,
            prior_range: None,
        };
        let long_first = ScannerConfig::default();
        let c = classify(&snap, 100.0, 100.0, &long_first).unwrap();
        assert_eq!((c.side, c.stage, c.score), (Side::Long, Stage::Confirm, 4));

        let short_first = ScannerConfig {
            side_preference: SidePreference::ShortFirst,
            ..ScannerConfig::default()
        };
        let c = classify(&snap, 100.0, 100.0, &short_first).unwrap();
        assert_eq!((c.side, c.stage, c.score), (Side::Short, Stage::Confirm, 4));
    }

    #[test]
    fn score_signal_needs_two_bars() {
        let cfg = ScannerConfig::default();
        let one = bars(&[100.0]);
        assert!(score_signal(&Instrument::new("X-USDT", "1h"), &one, 100.0, &cfg).is_none());
        assert!(score_signal(&Instrument::new("X-USDT", "1h"), &[], 100.0, &cfg).is_none());
    }

    #[test]
    fn flat_series_scores_nothing() {
        let cfg = ScannerConfig::default();
        let flat = bars(&[100.0; 120]);
        let inst = Instrument::new("FLAT-USDT", "1h");
        for end in 2..=flat.len() {
            assert!(score_signal(&inst, &flat[..end], 100.0, &cfg).is_none());
        }
    }

    #[test]
    fn signal_carries_levels_and_exit_time() {
        let cfg = ScannerConfig::default();
        let closes: Vec<f64> = (0..120).map(|i| 100.0 * 1.005_f64.powi(i)).collect();
        let mut series = bars(&closes);
        let n = series.len();
        for (k, bar) in series[n - 10..].iter_mut().enumerate() {
            bar.volume = 100.0 + 20.0 * (k as f64 + 1.0);
        }
        let inst = Instrument::new("UP-USDT", "1h");
        let price = series[n - 1].close;
        let sig = score_signal(&inst, &series, price, &cfg).unwrap();

        assert_eq!(sig.side, Side::Long);
        assert_eq!(sig.instrument, inst);
        assert_eq!(sig.time, series[n - 1].time);
        assert_eq!(sig.exit_by, series[n - 1].time + Duration::hours(6));
        assert_eq!(sig.score_max, 8);
        assert!((1..=5).contains(&sig.strength));
        assert!(sig.stop < sig.entry && sig.target > sig.entry);
        assert!(sig.vwap.is_some());
        assert_eq!(sig.reasons.iter().filter(|r| r.passed).count(), sig.score);

        let huge = ScannerConfig {
            hold_hours: i64::MAX,
            ..ScannerConfig::default()
        };
        let sig = score_signal(&inst, &series, price, &huge).unwrap();
        assert_eq!(sig.exit_by, NaiveDateTime::MAX);
    }
}
