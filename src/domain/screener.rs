//! Multi-instrument screener.
//!
//! For every (symbol, timeframe) pair: fetch bars and the last price, check
//! the bar count, score, filter. Per-pair failures are recorded and the scan
//! continues. Scanning stops once `max_signals` signals are collected.
//!
//! Output order: confirm before watch, then strength desc, then score desc.

use crate::domain::ohlcv::{is_time_ordered, Bar};
use crate::domain::scorer::score_signal;
use crate::domain::signal::{Instrument, Side, Signal, Stage};
use crate::domain::strategy::ScannerConfig;
use crate::ports::data_port::{DataPort, TickerPort};
use std::fmt;
use tracing::{debug, info, warn};

pub const DEFAULT_MIN_BARS: usize = 55;
pub const DEFAULT_MAX_SIGNALS: usize = 120;

/// Stablecoin bases skipped for `XXX-USDT` pairs.
pub const EXCLUDED_BASES: [&str; 13] = [
    "USDC", "USD1", "USDT", "TUSD", "USDP", "USDD", "DAI", "FDUSD", "BUSD", "PYUSD", "FRAX",
    "GUSD", "USDE",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenerConfig {
    pub symbols: Vec<String>,
    pub timeframes: Vec<String>,
    pub min_bars: usize,
    pub max_signals: usize,
    pub stage: Option<Stage>,
    pub side: Option<Side>,
    /// Case-insensitive substring match on the symbol.
    pub symbol_filter: Option<String>,
    pub exclude_bases: Vec<String>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        ScreenerConfig {
            symbols: Vec::new(),
            timeframes: vec!["1h".to_string(), "6h".to_string()],
            min_bars: DEFAULT_MIN_BARS,
            max_signals: DEFAULT_MAX_SIGNALS,
            stage: None,
            side: None,
            symbol_filter: None,
            exclude_bases: EXCLUDED_BASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// True for `BASE-USDT` where BASE is in `excluded` (case-insensitive).
pub fn is_excluded_symbol(symbol: &str, excluded: &[String]) -> bool {
    let mut parts = symbol.split('-');
    let (Some(base), Some(quote), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if !quote.eq_ignore_ascii_case("USDT") {
        return false;
    }
    excluded.iter().any(|b| b.eq_ignore_ascii_case(base))
}

fn matches_filter(symbol: &str, filter: Option<&str>) -> bool {
    match filter {
        Some(f) if !f.trim().is_empty() => symbol
            .to_uppercase()
            .contains(&f.trim().to_uppercase()),
        _ => true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSource {
    Candles,
    Ticker,
    Compute,
}

impl fmt::Display for ErrorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSource::Candles => f.write_str("candles"),
            ErrorSource::Ticker => f.write_str("ticker"),
            ErrorSource::Compute => f.write_str("compute"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenError {
    pub symbol: String,
    pub timeframe: String,
    pub source: ErrorSource,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScreenReport {
    pub signals: Vec<Signal>,
    pub errors: Vec<ScreenError>,
    pub pairs_scanned: usize,
}

/// Sorts confirm first, then by strength and score, both descending.
pub fn sort_signals(signals: &mut [Signal]) {
    signals.sort_by(|a, b| {
        a.stage
            .cmp(&b.stage)
            .then(b.strength.cmp(&a.strength))
            .then(b.score.cmp(&a.score))
    });
}

enum PairOutcome {
    Signal(Box<Signal>),
    Nothing,
    Failed(ErrorSource, String),
}

fn scan_pair(
    data: &dyn DataPort,
    ticker: Option<&dyn TickerPort>,
    instrument: &Instrument,
    scanner: &ScannerConfig,
    screener: &ScreenerConfig,
) -> PairOutcome {
    let bars: Vec<Bar> = match data.fetch_bars(&instrument.symbol, &instrument.timeframe) {
        Ok(bars) => bars,
        Err(e) => return PairOutcome::Failed(ErrorSource::Candles, e.to_string()),
    };

    if bars.len() < screener.min_bars.max(2) {
        return PairOutcome::Failed(
            ErrorSource::Candles,
            format!(
                "not enough bars (need {}, got {})",
                screener.min_bars.max(2),
                bars.len()
            ),
        );
    }
    if !is_time_ordered(&bars) {
        return PairOutcome::Failed(
            ErrorSource::Compute,
            "bars are not in ascending time order".to_string(),
        );
    }

    let price = match ticker {
        Some(port) => match port.last_price(&instrument.symbol) {
            Ok(p) => p,
            Err(e) => return PairOutcome::Failed(ErrorSource::Ticker, e.to_string()),
        },
        None => bars[bars.len() - 1].close,
    };
    if !price.is_finite() || price <= 0.0 {
        return PairOutcome::Failed(ErrorSource::Ticker, format!("invalid price {price}"));
    }

    let Some(signal) = score_signal(instrument, &bars, price, scanner) else {
        return PairOutcome::Nothing;
    };

    if screener.stage.is_some_and(|s| s != signal.stage)
        || screener.side.is_some_and(|s| s != signal.side)
    {
        return PairOutcome::Nothing;
    }
    PairOutcome::Signal(Box::new(signal))
}

pub fn run_screen(
    data: &dyn DataPort,
    ticker: Option<&dyn TickerPort>,
    scanner: &ScannerConfig,
    screener: &ScreenerConfig,
) -> ScreenReport {
    let mut report = ScreenReport::default();

    let symbols: Vec<&String> = screener
        .symbols
        .iter()
        .filter(|s| !is_excluded_symbol(s, &screener.exclude_bases))
        .filter(|s| matches_filter(s, screener.symbol_filter.as_deref()))
        .collect();

    'symbols: for symbol in symbols {
        for timeframe in &screener.timeframes {
            let instrument = Instrument::new(symbol.as_str(), timeframe.as_str());
            report.pairs_scanned += 1;

            match scan_pair(data, ticker, &instrument, scanner, screener) {
                PairOutcome::Signal(signal) => {
                    debug!(%instrument, stage = %signal.stage, side = %signal.side, "match");
                    report.signals.push(*signal);
                }
                PairOutcome::Nothing => debug!(%instrument, "no signal"),
                PairOutcome::Failed(source, message) => {
                    warn!(%instrument, %source, %message, "skipped");
                    report.errors.push(ScreenError {
                        symbol: instrument.symbol,
                        timeframe: instrument.timeframe,
                        source,
                        message,
                    });
                }
            }

            if report.signals.len() >= screener.max_signals {
                break 'symbols;
            }
        }
    }

    sort_signals(&mut report.signals);
    info!(
        pairs = report.pairs_scanned,
        signals = report.signals.len(),
        errors = report.errors.len(),
        "screen complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn excluded() -> Vec<String> {
        ScreenerConfig::default().exclude_bases
    }

    #[test]
    fn stablecoin_pairs_excluded() {
        assert!(is_excluded_symbol("USDC-USDT", &excluded()));
        assert!(is_excluded_symbol("fdusd-usdt", &excluded()));
        assert!(!is_excluded_symbol("BTC-USDT", &excluded()));
        // only USDT-quoted pairs are considered
        assert!(!is_excluded_symbol("USDC-BTC", &excluded()));
        assert!(!is_excluded_symbol("USDC", &excluded()));
        assert!(!is_excluded_symbol("USDC-USDT-X", &excluded()));
    }

    #[test]
    fn symbol_filter_substring() {
        assert!(matches_filter("BTC-USDT", Some("btc")));
        assert!(matches_filter("BTC-USDT", None));
        assert!(matches_filter("BTC-USDT", Some("  ")));
        assert!(!matches_filter("ETH-USDT", Some("btc")));
    }

    #[test]
    fn error_source_labels() {
        assert_eq!(ErrorSource::Candles.to_string(), "candles");
        assert_eq!(ErrorSource::Ticker.to_string(), "ticker");
        assert_eq!(ErrorSource::Compute.to_string(), "compute");
    }

    #[test]
    fn defaults() {
        let c = ScreenerConfig::default();
        assert_eq!(c.min_bars, 55);
        assert_eq!(c.max_signals, 120);
        assert_eq!(c.exclude_bases.len(), 13);
        assert_eq!(c.timeframes, vec!["1h", "6h"]);
    }
}
