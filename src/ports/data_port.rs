//! Market data ports: bar history and last traded price.

use crate::domain::error::TierscanError;
use crate::domain::ohlcv::Bar;

pub trait DataPort {
    /// Bars for `symbol` on `timeframe`, ascending by time.
    fn fetch_bars(&self, symbol: &str, timeframe: &str) -> Result<Vec<Bar>, TierscanError>;

    fn list_symbols(&self) -> Result<Vec<String>, TierscanError>;
}

pub trait TickerPort {
    fn last_price(&self, symbol: &str) -> Result<f64, TierscanError>;
}
