//! Report output port.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TierscanError;
use crate::domain::screener::ScreenReport;
use std::path::Path;

pub trait ReportPort {
    /// Writes the trade ledger of a backtest run.
    fn write_trades(&self, result: &BacktestResult, path: &Path) -> Result<(), TierscanError>;

    fn write_signals(&self, report: &ScreenReport, path: &Path) -> Result<(), TierscanError>;
}
