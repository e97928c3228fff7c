//! Signal types: side, stage, the named predicate checklist and the emitted
//! signal record.

use crate::domain::indicator::StructureBias;
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => f.write_str("long"),
            Side::Short => f.write_str("short"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" => Ok(Side::Long),
            "short" => Ok(Side::Short),
            other => Err(format!("unknown side '{other}'")),
        }
    }
}

/// Confirm is actionable now; watch is forming and worth revisiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Confirm,
    Watch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Confirm => f.write_str("confirm"),
            Stage::Watch => f.write_str("watch"),
        }
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "confirm" => Ok(Stage::Confirm),
            "watch" => Ok(Stage::Watch),
            other => Err(format!("unknown stage '{other}'")),
        }
    }
}

/// Named checklist items. Each is evaluated per side; the side-specific
/// meaning is documented on the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    TrendAligned,
    StructureAgrees,
    RsiPullback,
    RsiExtended,
    MacdMomentum,
    BandExpansion,
    BandExpansionWithMid,
    VolumePulse,
    VolumeSpike,
    VwapConfirm,
    VwapWatch,
    RangeBreakout,
    ShortTermMove,
}

impl Predicate {
    /// Items counted toward the confirm score.
    pub const CONFIRM: [Predicate; 6] = [
        Predicate::TrendAligned,
        Predicate::RsiPullback,
        Predicate::MacdMomentum,
        Predicate::BandExpansionWithMid,
        Predicate::VolumePulse,
        Predicate::VwapConfirm,
    ];

    /// Both must hold before a watch score is considered.
    pub const WATCH_GATE: [Predicate; 2] = [Predicate::TrendAligned, Predicate::StructureAgrees];

    /// Items counted toward the watch score.
    pub const WATCH: [Predicate; 8] = [
        Predicate::RangeBreakout,
        Predicate::MacdMomentum,
        Predicate::RsiExtended,
        Predicate::BandExpansion,
        Predicate::VolumePulse,
        Predicate::VolumeSpike,
        Predicate::ShortTermMove,
        Predicate::VwapWatch,
    ];

    pub fn describe(&self, side: Side) -> &'static str {
        match (self, side) {
            (Predicate::TrendAligned, Side::Long) => "trend: fast EMA above slow EMA, price above fast EMA",
            (Predicate::TrendAligned, Side::Short) => "trend: fast EMA below slow EMA, price below fast EMA",
            (Predicate::StructureAgrees, Side::Long) => "structure not bearish",
            (Predicate::StructureAgrees, Side::Short) => "structure not bullish",
            (Predicate::RsiPullback, Side::Long) => "RSI pullback band",
            (Predicate::RsiPullback, Side::Short) => "RSI bounce band",
            (Predicate::RsiExtended, Side::Long) => "RSI running hot",
            (Predicate::RsiExtended, Side::Short) => "RSI running cold",
            (Predicate::MacdMomentum, Side::Long) => "MACD histogram rising and non-negative",
            (Predicate::MacdMomentum, Side::Short) => "MACD histogram falling and non-positive",
            (Predicate::BandExpansion, _) => "Bollinger width not contracting",
            (Predicate::BandExpansionWithMid, Side::Long) => "Bollinger expanding, price at or above mid-band",
            (Predicate::BandExpansionWithMid, Side::Short) => "Bollinger expanding, price at or below mid-band",
            (Predicate::VolumePulse, _) => "volume pulse (short/long average)",
            (Predicate::VolumeSpike, _) => "volume spike on latest bar",
            (Predicate::VwapConfirm, _) => "VWAP deviation within entry tolerance",
            (Predicate::VwapWatch, _) => "VWAP deviation within watch tolerance",
            (Predicate::RangeBreakout, Side::Long) => "breaking prior range high",
            (Predicate::RangeBreakout, Side::Short) => "breaking prior range low",
            (Predicate::ShortTermMove, Side::Long) => "price above previous close",
            (Predicate::ShortTermMove, Side::Short) => "price below previous close",
        }
    }
}

/// One evaluated checklist item, kept on the signal for auditability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reason {
    pub predicate: Predicate,
    pub side: Side,
    pub passed: bool,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.passed { "[x]" } else { "[ ]" };
        write!(f, "{} {}", mark, self.predicate.describe(self.side))
    }
}

/// Instrument and bar interval a scan runs against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instrument {
    pub symbol: String,
    pub timeframe: String,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<String>) -> Self {
        Instrument {
            symbol: symbol.into(),
            timeframe: timeframe.into(),
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbol, self.timeframe)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub instrument: Instrument,
    pub time: NaiveDateTime,
    pub exit_by: NaiveDateTime,
    pub side: Side,
    pub stage: Stage,
    pub score: usize,
    pub score_max: usize,
    pub strength: u8,
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
    pub risk_pct: f64,
    pub reward_pct: f64,
    pub rr: f64,
    pub vwap: Option<f64>,
    pub vwap_dev_pct: Option<f64>,
    pub volume_pulse: Option<f64>,
    pub structure_bias: StructureBias,
    pub reasons: Vec<Reason>,
}

/// `clamp(round(score / score_max * 5), 1, 5)`
pub fn strength(score: usize, score_max: usize) -> u8 {
    if score_max == 0 {
        return 1;
    }
    let scaled = (score as f64 / score_max as f64 * 5.0).round();
    scaled.clamp(1.0, 5.0) as u8
}
