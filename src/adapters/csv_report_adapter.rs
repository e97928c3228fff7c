//! CSV report adapter implementing ReportPort.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::TierscanError;
use crate::domain::screener::ScreenReport;
use crate::ports::report_port::ReportPort;
use std::path::Path;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvReportAdapter;

fn opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_default()
}

impl ReportPort for CsvReportAdapter {
    fn write_trades(&self, result: &BacktestResult, path: &Path) -> Result<(), TierscanError> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record([
            "side",
            "stage",
            "entry_time",
            "exit_time",
            "entry_index",
            "exit_index",
            "entry_price",
            "exit_price",
            "pnl_pct",
            "r_multiple",
            "held_bars",
            "exit_reason",
            "score",
            "strength",
        ])?;

        for t in &result.trades {
            wtr.write_record([
                t.side.to_string(),
                t.stage.to_string(),
                t.entry_time.format(TIME_FORMAT).to_string(),
                t.exit_time.format(TIME_FORMAT).to_string(),
                t.entry_index.to_string(),
                t.exit_index.to_string(),
                format!("{:.8}", t.entry_price),
                format!("{:.8}", t.exit_price),
                format!("{:.4}", t.pnl_pct),
                format!("{:.4}", t.r_multiple),
                t.held_bars.to_string(),
                t.exit_reason.to_string(),
                t.score.to_string(),
                t.strength.to_string(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }

    fn write_signals(&self, report: &ScreenReport, path: &Path) -> Result<(), TierscanError> {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record([
            "symbol",
            "timeframe",
            "time",
            "exit_by",
            "side",
            "stage",
            "score",
            "score_max",
            "strength",
            "entry",
            "stop",
            "target",
            "risk_pct",
            "reward_pct",
            "rr",
            "vwap",
            "vwap_dev_pct",
            "volume_pulse",
            "structure",
            "reasons",
        ])?;

        for s in &report.signals {
            let passed: Vec<String> = s
                .reasons
                .iter()
                .filter(|r| r.passed)
                .map(|r| r.predicate.describe(r.side).to_string())
                .collect();
            wtr.write_record([
                s.instrument.symbol.clone(),
                s.instrument.timeframe.clone(),
                s.time.format(TIME_FORMAT).to_string(),
                s.exit_by.format(TIME_FORMAT).to_string(),
                s.side.to_string(),
                s.stage.to_string(),
                s.score.to_string(),
                s.score_max.to_string(),
                s.strength.to_string(),
                format!("{:.8}", s.entry),
                format!("{:.8}", s.stop),
                format!("{:.8}", s.target),
                format!("{:.2}", s.risk_pct),
                format!("{:.2}", s.reward_pct),
                format!("{:.2}", s.rr),
                opt(s.vwap, 8),
                opt(s.vwap_dev_pct, 3),
                opt(s.volume_pulse, 3),
                s.structure_bias.to_string(),
                passed.join("; "),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }
}
