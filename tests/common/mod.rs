#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
pub use tierscan::domain::ohlcv::Bar;
use tierscan::domain::error::TierscanError;
use tierscan::ports::data_port::{DataPort, TickerPort};

pub struct MockDataPort {
    pub data: HashMap<(String, String), Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, timeframe: &str, bars: Vec<Bar>) -> Self {
        self.data
            .insert((symbol.to_string(), timeframe.to_string()), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, symbol: &str, timeframe: &str) -> Result<Vec<Bar>, TierscanError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TierscanError::Data {
                reason: reason.clone(),
            });
        }
        self.data
            .get(&(symbol.to_string(), timeframe.to_string()))
            .cloned()
            .ok_or_else(|| TierscanError::NoData {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
            })
    }

    fn list_symbols(&self) -> Result<Vec<String>, TierscanError> {
        let mut symbols: Vec<String> = self.data.keys().map(|(s, _)| s.clone()).collect();
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }
}

pub struct MockTickerPort {
    pub prices: HashMap<String, f64>,
}

impl MockTickerPort {
    pub fn new(prices: &[(&str, f64)]) -> Self {
        Self {
            prices: prices.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
        }
    }
}

impl TickerPort for MockTickerPort {
    fn last_price(&self, symbol: &str) -> Result<f64, TierscanError> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| TierscanError::Data {
                reason: format!("no ticker for {symbol}"),
            })
    }
}

pub fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn hour(i: usize) -> NaiveDateTime {
    t0() + chrono::Duration::hours(i as i64)
}

/// Hourly bars from closes; high/low are close +/- 0.1%, open is the
/// previous close.
pub fn bars_from_closes(closes: &[f64], volumes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| Bar {
            time: hour(i),
            open: if i == 0 { close } else { closes[i - 1] },
            high: close * 1.001,
            low: close * 0.999,
            close,
            volume,
        })
        .collect()
}

/// `n` bars rising 0.5% per bar from 100; volume 100, ramping linearly to
/// 300 over the last 10 bars.
pub fn uptrend_bars(n: usize) -> Vec<Bar> {
    let closes: Vec<f64> = (0..n).map(|i| 100.0 * 1.005_f64.powi(i as i32)).collect();
    let volumes: Vec<f64> = (0..n)
        .map(|i| {
            let from_end = n - 1 - i;
            if from_end < 10 {
                100.0 + 200.0 * (10 - from_end) as f64 / 10.0
            } else {
                100.0
            }
        })
        .collect();
    bars_from_closes(&closes, &volumes)
}

/// `n` identical bars at 100.
pub fn flat_bars(n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| Bar {
            time: hour(i),
            open: 100.0,
            high: 100.0,
            low: 100.0,
            close: 100.0,
            volume: 100.0,
        })
        .collect()
}

pub fn bar(i: usize, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar {
        time: hour(i),
        open,
        high,
        low,
        close,
        volume: 100.0,
    }
}
