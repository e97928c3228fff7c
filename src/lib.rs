//! tierscan: tiered signal screener and bar-by-bar backtester.
//!
//! Hexagonal architecture: indicator, scoring and simulation logic in
//! [`domain`], port traits in [`ports`], file-backed implementations in
//! [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
