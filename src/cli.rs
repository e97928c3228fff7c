//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::{CsvAdapter, CsvTickerAdapter};
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    build_backtest_config, build_scanner_config, build_screener_config, validate_config,
};
use crate::domain::error::TierscanError;
use crate::domain::ohlcv::is_time_ordered;
use crate::domain::position::ExitReason;
use crate::domain::screener::{run_screen, ScreenReport, ScreenerConfig};
use crate::domain::signal::{Side, Signal, Stage};
use crate::domain::strategy::ScannerConfig;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::{DataPort, TickerPort};
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "tierscan", about = "Tiered signal screener and bar-by-bar backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan every configured symbol and timeframe for signals
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory holding {symbol}_{timeframe}.csv files
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// symbol,price CSV of last prices; latest close is used otherwise
        #[arg(long)]
        tickers: Option<PathBuf>,
        /// Case-insensitive substring filter on symbols
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        stage: Option<Stage>,
        #[arg(long)]
        side: Option<Side>,
        /// Write signals as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replay one instrument bar by bar
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long, default_value = "1h")]
        timeframe: String,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Write the trade ledger as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Scan {
            config,
            data_dir,
            tickers,
            symbol,
            stage,
            side,
            output,
        } => run_scan(
            &config,
            ScanOverrides {
                data_dir,
                tickers,
                symbol,
                stage,
                side,
            },
            output.as_deref(),
        ),
        Command::Backtest {
            config,
            symbol,
            timeframe,
            data_dir,
            output,
        } => run_backtest_command(
            &config,
            &symbol,
            &timeframe,
            data_dir.as_deref(),
            output.as_deref(),
        ),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config, data_dir } => run_list_symbols(&config, data_dir.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub struct ScanOverrides {
    pub data_dir: Option<PathBuf>,
    pub tickers: Option<PathBuf>,
    pub symbol: Option<String>,
    pub stage: Option<Stage>,
    pub side: Option<Side>,
}

fn data_dir(config: &dyn ConfigPort, cli_override: Option<&Path>) -> PathBuf {
    cli_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("data", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn run_scan(
    config_path: &Path,
    overrides: ScanOverrides,
    output: Option<&Path>,
) -> Result<(), TierscanError> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let scanner = build_scanner_config(&adapter)?;
    let mut screener = build_screener_config(&adapter)?;

    if overrides.symbol.is_some() {
        screener.symbol_filter = overrides.symbol;
    }
    if overrides.stage.is_some() {
        screener.stage = overrides.stage;
    }
    if overrides.side.is_some() {
        screener.side = overrides.side;
    }

    let data = CsvAdapter::new(data_dir(&adapter, overrides.data_dir.as_deref()));
    let tickers_path = overrides
        .tickers
        .or_else(|| adapter.get_string("data", "tickers").map(PathBuf::from));
    let tickers = match tickers_path {
        Some(path) => Some(CsvTickerAdapter::from_file(&path)?),
        None => None,
    };

    let report = scan_pipeline(
        &data,
        tickers.as_ref().map(|t| t as &dyn TickerPort),
        &scanner,
        screener,
    )?;

    print_signals(&report.signals);
    for err in &report.errors {
        eprintln!(
            "  skipped {} {} [{}]: {}",
            err.symbol, err.timeframe, err.source, err.message
        );
    }
    eprintln!(
        "\n{} signals from {} pairs ({} skipped)",
        report.signals.len(),
        report.pairs_scanned,
        report.errors.len()
    );

    if let Some(path) = output {
        CsvReportAdapter.write_signals(&report, path)?;
        eprintln!("Signals written to: {}", path.display());
    }
    Ok(())
}

/// Fills the symbol list from the data source when the config names none,
/// then runs the screener.
pub fn scan_pipeline(
    data: &dyn DataPort,
    tickers: Option<&dyn TickerPort>,
    scanner: &ScannerConfig,
    mut screener: ScreenerConfig,
) -> Result<ScreenReport, TierscanError> {
    if screener.symbols.is_empty() {
        screener.symbols = data.list_symbols()?;
        info!(symbols = screener.symbols.len(), "using symbols from data source");
    }
    if screener.symbols.is_empty() {
        return Err(TierscanError::Data {
            reason: "no symbols to scan".to_string(),
        });
    }
    Ok(run_screen(data, tickers, scanner, &screener))
}

fn print_signals(signals: &[Signal]) {
    for s in signals {
        println!(
            "{:<14} {:<4} {:<5} {:<7} {}/{} str {} entry {:.6} stop {:.6} target {:.6} rr {:.2} exit_by {}",
            s.instrument.symbol,
            s.instrument.timeframe,
            s.side,
            s.stage,
            s.score,
            s.score_max,
            s.strength,
            s.entry,
            s.stop,
            s.target,
            s.rr,
            s.exit_by.format("%Y-%m-%d %H:%M"),
        );
    }
}

fn run_backtest_command(
    config_path: &Path,
    symbol: &str,
    timeframe: &str,
    data_dir_override: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), TierscanError> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let scanner = build_scanner_config(&adapter)?;
    let bt_config = build_backtest_config(&adapter)?;
    let data = CsvAdapter::new(data_dir(&adapter, data_dir_override));

    let result = backtest_pipeline(&data, symbol, timeframe, &scanner, &bt_config)?;

    print_backtest_summary(symbol, timeframe, &result);

    if let Some(path) = output {
        CsvReportAdapter.write_trades(&result, path)?;
        eprintln!("\nTrades written to: {}", path.display());
    }
    Ok(())
}

pub fn backtest_pipeline(
    data: &dyn DataPort,
    symbol: &str,
    timeframe: &str,
    scanner: &ScannerConfig,
    bt_config: &BacktestConfig,
) -> Result<BacktestResult, TierscanError> {
    let bars = data.fetch_bars(symbol, timeframe)?;
    if !is_time_ordered(&bars) {
        return Err(TierscanError::Data {
            reason: format!("{symbol} {timeframe}: bars are not in ascending time order"),
        });
    }
    if bars.len() < scanner.indicators.required_bars() {
        warn!(
            bars = bars.len(),
            required = scanner.indicators.required_bars(),
            "history shorter than the longest indicator window"
        );
    }
    eprintln!(
        "Running backtest: {} {}, {} bars, warm-up {}",
        symbol,
        timeframe,
        bars.len(),
        bt_config.warmup_bars
    );
    run_backtest(&bars, scanner, bt_config)
}

fn print_backtest_summary(symbol: &str, timeframe: &str, result: &BacktestResult) {
    for t in &result.trades {
        println!(
            "{} -> {}  {:<5} {:<7} entry {:.6} exit {:.6}  {:+.2}%  {:+.2}R  {} bars  {}",
            t.entry_time.format("%Y-%m-%d %H:%M"),
            t.exit_time.format("%Y-%m-%d %H:%M"),
            t.side,
            t.stage,
            t.entry_price,
            t.exit_price,
            t.pnl_pct,
            t.r_multiple,
            t.held_bars,
            t.exit_reason,
        );
    }

    let s = &result.stats;
    eprintln!("\n=== {} {} ===", symbol, timeframe);
    eprintln!("Total Trades:     {}", s.total_trades);
    eprintln!(
        "Wins/Losses/BE:   {}/{}/{}",
        s.wins, s.losses, s.breakeven
    );
    eprintln!("Win Rate:         {:.1}%", s.win_rate * 100.0);
    eprintln!("Total R:          {:+.2}", s.total_r);
    eprintln!("Average R:        {:+.3}", s.avg_r);
    eprintln!("Best / Worst R:   {:+.2} / {:+.2}", s.best_r, s.worst_r);
    eprintln!("Profit Factor:    {:.2}", s.profit_factor);
    eprintln!("Max Drawdown:     {:.2}R", s.max_drawdown_r);
    eprintln!("Avg Held Bars:    {:.1}", s.avg_held_bars);
    let exits: Vec<String> = ExitReason::ALL
        .iter()
        .map(|r| format!("{}={}", r, s.exit_count(*r)))
        .collect();
    eprintln!("Exits:            {}", exits.join(" "));
}

fn run_validate(config_path: &Path) -> Result<(), TierscanError> {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = FileConfigAdapter::from_file(config_path)?;
    validate_config(&adapter)?;

    let scanner = build_scanner_config(&adapter)?;
    let bt_config = build_backtest_config(&adapter)?;
    let screener = build_screener_config(&adapter)?;

    eprintln!("\nScanner:");
    eprintln!(
        "  confirm >= {}, watch >= {}, score max {}, {}",
        scanner.confirm_min_score,
        scanner.watch_min_score,
        scanner.score_max,
        scanner.side_preference
    );
    eprintln!("  indicators:");
    for ind in scanner.indicators.indicators() {
        eprintln!("    {}", ind);
    }
    eprintln!("  bars required: {}", scanner.indicators.required_bars());
    eprintln!("\nBacktest:");
    eprintln!(
        "  warm-up {} bars, max hold {} bars",
        bt_config.warmup_bars, bt_config.max_hold_bars
    );
    eprintln!("\nScreener:");
    eprintln!("  timeframes: {}", screener.timeframes.join(", "));
    if screener.symbols.is_empty() {
        eprintln!("  symbols: (all in data directory)");
    } else {
        eprintln!("  symbols: {}", screener.symbols.join(", "));
    }

    eprintln!("\nConfiguration is valid.");
    Ok(())
}

fn run_list_symbols(config_path: &Path, data_dir_override: Option<&Path>) -> Result<(), TierscanError> {
    let adapter = FileConfigAdapter::from_file(config_path)?;
    let data = CsvAdapter::new(data_dir(&adapter, data_dir_override));
    let symbols = data.list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}
