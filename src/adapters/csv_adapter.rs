//! CSV file data adapters.
//!
//! Bars live in `{dir}/{symbol}_{timeframe}.csv` with columns
//! `time,open,high,low,close,volume`. `time` is either a datetime
//! (`YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD`) or unix
//! seconds. Last prices live in a `symbol,price` file.

use crate::domain::error::TierscanError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::{DataPort, TickerPort};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, timeframe: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, timeframe))
    }
}

fn data_err(reason: impl Into<String>) -> TierscanError {
    TierscanError::Data {
        reason: reason.into(),
    }
}

pub fn parse_time(raw: &str) -> Result<NaiveDateTime, TierscanError> {
    let s = raw.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(t);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(t) = d.and_hms_opt(0, 0, 0) {
            return Ok(t);
        }
    }
    if let Ok(secs) = s.parse::<i64>() {
        if let Some(t) = DateTime::<Utc>::from_timestamp(secs, 0) {
            return Ok(t.naive_utc());
        }
    }
    Err(data_err(format!("invalid time value '{s}'")))
}

fn field(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, TierscanError> {
    let raw = record
        .get(index)
        .ok_or_else(|| data_err(format!("missing {name} column")))?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e| data_err(format!("invalid {name} value '{raw}': {e}")))?;
    if !value.is_finite() {
        return Err(data_err(format!("non-finite {name} value")));
    }
    Ok(value)
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, symbol: &str, timeframe: &str) -> Result<Vec<Bar>, TierscanError> {
        let path = self.csv_path(symbol, timeframe);
        let content = fs::read_to_string(&path)
            .map_err(|e| data_err(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| data_err(format!("CSV parse error: {e}")))?;

            let time_str = record
                .get(0)
                .ok_or_else(|| data_err("missing time column"))?;

            bars.push(Bar {
                time: parse_time(time_str)?,
                open: field(&record, 1, "open")?,
                high: field(&record, 2, "high")?,
                low: field(&record, 3, "low")?,
                close: field(&record, 4, "close")?,
                volume: field(&record, 5, "volume")?,
            });
        }

        if bars.is_empty() {
            return Err(TierscanError::NoData {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
            });
        }

        bars.sort_by_key(|b| b.time);
        bars.dedup_by_key(|b| b.time);
        debug!(symbol, timeframe, bars = bars.len(), "loaded bars");
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, TierscanError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            data_err(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut symbols = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| data_err(format!("directory entry error: {e}")))?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            let Some(stem) = name_str.strip_suffix(".csv") else {
                continue;
            };
            if let Some((symbol, _timeframe)) = stem.rsplit_once('_') {
                symbols.insert(symbol.to_string());
            }
        }

        Ok(symbols.into_iter().collect())
    }
}

/// Last prices loaded once from a `symbol,price` CSV.
pub struct CsvTickerAdapter {
    prices: HashMap<String, f64>,
}

impl CsvTickerAdapter {
    pub fn from_file(path: &Path) -> Result<Self, TierscanError> {
        let mut rdr = csv::Reader::from_path(path)?;
        let mut prices = HashMap::new();
        for result in rdr.records() {
            let record = result?;
            let symbol = record
                .get(0)
                .ok_or_else(|| data_err("missing symbol column"))?
                .trim()
                .to_uppercase();
            let price = field(&record, 1, "price")?;
            prices.insert(symbol, price);
        }
        Ok(Self { prices })
    }
}

impl TickerPort for CsvTickerAdapter {
    fn last_price(&self, symbol: &str) -> Result<f64, TierscanError> {
        self.prices
            .get(&symbol.to_uppercase())
            .copied()
            .ok_or_else(|| data_err(format!("no ticker for {symbol}")))
    }
}
