//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod snapshot;
pub mod signal;
pub mod strategy;
pub mod risk;
pub mod scorer;
pub mod position;
pub mod backtest;
pub mod metrics;
pub mod screener;
pub mod config_validation;
pub mod error;
