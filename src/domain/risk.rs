//! Risk model: stop/target levels per (side, stage).
//!
//! The shipped model is a fixed percentage lookup (confirm 2% risk / 5%
//! reward, watch 3% / 4%). It does not adapt to volatility; an ATR-based
//! model can implement [`RiskModel`] without touching the scorer.

use crate::domain::signal::{Side, Stage};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskLevels {
    pub stop: f64,
    pub target: f64,
    pub risk_pct: f64,
    pub reward_pct: f64,
    pub rr: f64,
}

pub trait RiskModel {
    fn levels(&self, side: Side, stage: Stage, entry: f64) -> RiskLevels;
}

/// Risk and reward, both in percent of entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskTier {
    pub risk_pct: f64,
    pub reward_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPctRisk {
    pub confirm: RiskTier,
    pub watch: RiskTier,
}

impl Default for FixedPctRisk {
    fn default() -> Self {
        FixedPctRisk {
            confirm: RiskTier {
                risk_pct: 2.0,
                reward_pct: 5.0,
            },
            watch: RiskTier {
                risk_pct: 3.0,
                reward_pct: 4.0,
            },
        }
    }
}

impl FixedPctRisk {
    pub fn tier(&self, stage: Stage) -> RiskTier {
        match stage {
            Stage::Confirm => self.confirm,
            Stage::Watch => self.watch,
        }
    }
}

impl RiskModel for FixedPctRisk {
    fn levels(&self, side: Side, stage: Stage, entry: f64) -> RiskLevels {
        let tier = self.tier(stage);
        let risk = tier.risk_pct / 100.0;
        let reward = tier.reward_pct / 100.0;

        let (stop, target) = match side {
            Side::Long => (entry * (1.0 - risk), entry * (1.0 + reward)),
            Side::Short => (entry * (1.0 + risk), entry * (1.0 - reward)),
        };

        RiskLevels {
            stop,
            target,
            risk_pct: tier.risk_pct,
            reward_pct: tier.reward_pct,
            rr: tier.reward_pct / tier.risk_pct,
        }
    }
}
