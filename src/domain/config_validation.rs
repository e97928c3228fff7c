//! Configuration loading and validation.
//!
//! Every key is optional and falls back to the built-in default. Present
//! keys must parse and pass range checks; cross-field rules (fast < slow,
//! ordered bands, tier minimums within `score_max`) are checked after the
//! section is read.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::TierscanError;
use crate::domain::risk::{FixedPctRisk, RiskTier};
use crate::domain::screener::ScreenerConfig;
use crate::domain::signal::{Side, Stage};
use crate::domain::strategy::{
    IndicatorParams, ScannerConfig, SidePreference, Thresholds, MAX_HOLD_HOURS,
};
use crate::ports::config_port::ConfigPort;

fn read_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
    min: usize,
) -> Result<usize, TierscanError> {
    let value = match config.get_string(section, key) {
        None => default,
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| TierscanError::invalid(section, key, format!("'{raw}' is not a non-negative integer")))?,
    };
    if value < min {
        return Err(TierscanError::invalid(
            section,
            key,
            format!("{key} must be at least {min}"),
        ));
    }
    Ok(value)
}

fn read_positive_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, TierscanError> {
    let value = match config.get_string(section, key) {
        None => default,
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| TierscanError::invalid(section, key, format!("'{raw}' is not a number")))?,
    };
    if !value.is_finite() || value <= 0.0 {
        return Err(TierscanError::invalid(
            section,
            key,
            format!("{key} must be positive"),
        ));
    }
    Ok(value)
}

/// `low,high` with `low < high`.
fn read_band(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: (f64, f64),
) -> Result<(f64, f64), TierscanError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(default);
    };
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let band = match parts.as_slice() {
        [lo, hi] => match (lo.parse::<f64>(), hi.parse::<f64>()) {
            (Ok(lo), Ok(hi)) if lo.is_finite() && hi.is_finite() => (lo, hi),
            _ => {
                return Err(TierscanError::invalid(
                    section,
                    key,
                    format!("'{raw}' is not a numeric band"),
                ))
            }
        },
        _ => {
            return Err(TierscanError::invalid(
                section,
                key,
                "expected two values: low,high",
            ))
        }
    };
    if band.0 >= band.1 {
        return Err(TierscanError::invalid(
            section,
            key,
            "band low must be below band high",
        ));
    }
    Ok(band)
}

/// `all` (or absent) means no filter.
fn read_filter<T: std::str::FromStr<Err = String>>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, TierscanError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) if raw.trim().eq_ignore_ascii_case("all") || raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| TierscanError::invalid(section, key, e)),
    }
}

fn read_indicators(config: &dyn ConfigPort) -> Result<IndicatorParams, TierscanError> {
    let d = IndicatorParams::default();
    let s = "indicators";
    let params = IndicatorParams {
        ema_fast: read_usize(config, s, "ema_fast", d.ema_fast, 1)?,
        ema_slow: read_usize(config, s, "ema_slow", d.ema_slow, 1)?,
        rsi_period: read_usize(config, s, "rsi_period", d.rsi_period, 1)?,
        macd_fast: read_usize(config, s, "macd_fast", d.macd_fast, 1)?,
        macd_slow: read_usize(config, s, "macd_slow", d.macd_slow, 1)?,
        macd_signal: read_usize(config, s, "macd_signal", d.macd_signal, 1)?,
        bb_period: read_usize(config, s, "bb_period", d.bb_period, 2)?,
        bb_mult: read_positive_f64(config, s, "bb_mult", d.bb_mult)?,
        vwap_period: read_usize(config, s, "vwap_period", d.vwap_period, 1)?,
        volume_fast: read_usize(config, s, "volume_fast", d.volume_fast, 1)?,
        volume_slow: read_usize(config, s, "volume_slow", d.volume_slow, 1)?,
        volume_spike_mult: read_positive_f64(config, s, "volume_spike_mult", d.volume_spike_mult)?,
        range_lookback: read_usize(config, s, "range_lookback", d.range_lookback, 1)?,
    };

    if params.ema_fast >= params.ema_slow {
        return Err(TierscanError::invalid(s, "ema_fast", "ema_fast must be below ema_slow"));
    }
    if params.macd_fast >= params.macd_slow {
        return Err(TierscanError::invalid(s, "macd_fast", "macd_fast must be below macd_slow"));
    }
    if params.volume_fast >= params.volume_slow {
        return Err(TierscanError::invalid(
            s,
            "volume_fast",
            "volume_fast must be below volume_slow",
        ));
    }
    Ok(params)
}

fn read_thresholds(config: &dyn ConfigPort) -> Result<Thresholds, TierscanError> {
    let d = Thresholds::default();
    let s = "thresholds";
    Ok(Thresholds {
        rsi_pullback_long: read_band(config, s, "rsi_pullback_long", d.rsi_pullback_long)?,
        rsi_pullback_short: read_band(config, s, "rsi_pullback_short", d.rsi_pullback_short)?,
        rsi_extended_long: read_band(config, s, "rsi_extended_long", d.rsi_extended_long)?,
        rsi_extended_short: read_band(config, s, "rsi_extended_short", d.rsi_extended_short)?,
        volume_pulse_min: read_positive_f64(config, s, "volume_pulse_min", d.volume_pulse_min)?,
        vwap_confirm_long: read_band(config, s, "vwap_confirm_long", d.vwap_confirm_long)?,
        vwap_confirm_short: read_band(config, s, "vwap_confirm_short", d.vwap_confirm_short)?,
        vwap_watch_long: read_band(config, s, "vwap_watch_long", d.vwap_watch_long)?,
        vwap_watch_short: read_band(config, s, "vwap_watch_short", d.vwap_watch_short)?,
    })
}

fn read_risk(config: &dyn ConfigPort) -> Result<FixedPctRisk, TierscanError> {
    let d = FixedPctRisk::default();
    let s = "risk";
    let risk = FixedPctRisk {
        confirm: RiskTier {
            risk_pct: read_positive_f64(config, s, "confirm_risk_pct", d.confirm.risk_pct)?,
            reward_pct: read_positive_f64(config, s, "confirm_reward_pct", d.confirm.reward_pct)?,
        },
        watch: RiskTier {
            risk_pct: read_positive_f64(config, s, "watch_risk_pct", d.watch.risk_pct)?,
            reward_pct: read_positive_f64(config, s, "watch_reward_pct", d.watch.reward_pct)?,
        },
    };
    for (key, value) in [
        ("confirm_risk_pct", risk.confirm.risk_pct),
        ("watch_risk_pct", risk.watch.risk_pct),
    ] {
        if value >= 100.0 {
            return Err(TierscanError::invalid(s, key, "risk must be below 100%"));
        }
    }
    Ok(risk)
}

pub fn build_scanner_config(config: &dyn ConfigPort) -> Result<ScannerConfig, TierscanError> {
    let d = ScannerConfig::default();
    let s = "scanner";

    let score_max = read_usize(config, s, "score_max", d.score_max, 1)?;
    let confirm_min_score = read_usize(config, s, "confirm_min_score", d.confirm_min_score, 1)?;
    let watch_min_score = read_usize(config, s, "watch_min_score", d.watch_min_score, 1)?;
    if confirm_min_score > score_max {
        return Err(TierscanError::invalid(
            s,
            "confirm_min_score",
            "confirm_min_score cannot exceed score_max",
        ));
    }
    if watch_min_score > score_max {
        return Err(TierscanError::invalid(
            s,
            "watch_min_score",
            "watch_min_score cannot exceed score_max",
        ));
    }

    let side_preference = match config.get_string(s, "side_preference") {
        None => d.side_preference,
        Some(raw) => raw
            .parse::<SidePreference>()
            .map_err(|e| TierscanError::invalid(s, "side_preference", e))?,
    };
    let hold_hours = read_usize(config, s, "hold_hours", d.hold_hours as usize, 1)?;
    let hold_hours = i64::try_from(hold_hours)
        .ok()
        .filter(|h| *h <= MAX_HOLD_HOURS)
        .ok_or_else(|| {
            TierscanError::invalid(
                s,
                "hold_hours",
                format!("hold_hours must be at most {MAX_HOLD_HOURS}"),
            )
        })?;

    Ok(ScannerConfig {
        confirm_min_score,
        watch_min_score,
        score_max,
        side_preference,
        hold_hours,
        indicators: read_indicators(config)?,
        thresholds: read_thresholds(config)?,
        risk: read_risk(config)?,
    })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, TierscanError> {
    let d = BacktestConfig::default();
    Ok(BacktestConfig {
        max_hold_bars: read_usize(config, "backtest", "max_hold_bars", d.max_hold_bars, 1)?,
        warmup_bars: read_usize(config, "backtest", "warmup_bars", d.warmup_bars, 2)?,
    })
}

pub fn build_screener_config(config: &dyn ConfigPort) -> Result<ScreenerConfig, TierscanError> {
    let d = ScreenerConfig::default();
    let s = "screener";

    let timeframes = config.get_list(s, "timeframes").unwrap_or(d.timeframes);
    if timeframes.is_empty() {
        return Err(TierscanError::invalid(s, "timeframes", "at least one timeframe is required"));
    }

    Ok(ScreenerConfig {
        symbols: config.get_list(s, "symbols").unwrap_or_default(),
        timeframes,
        min_bars: read_usize(config, s, "min_bars", d.min_bars, 2)?,
        max_signals: read_usize(config, s, "max_signals", d.max_signals, 1)?,
        stage: read_filter::<Stage>(config, s, "stage")?,
        side: read_filter::<Side>(config, s, "side")?,
        symbol_filter: config
            .get_string(s, "symbol_filter")
            .filter(|f| !f.trim().is_empty()),
        exclude_bases: config.get_list(s, "exclude_bases").unwrap_or(d.exclude_bases),
    })
}

/// Checks every section; returns the first problem found.
pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TierscanError> {
    build_scanner_config(config)?;
    build_backtest_config(config)?;
    build_screener_config(config)?;
    Ok(())
}
