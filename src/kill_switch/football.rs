//! NFL and NCAAF rule sets.

use serde::{Deserialize, Serialize};

use super::{KillDecision, MarketContext, SituationalFacts};

pub const NFL_WIND_KILL_MPH: f64 = 20.0;
pub const NFL_WIND_UNDER_MPH: f64 = 15.0;
/// Totals above this are forced to the under in high wind.
pub const NFL_WIND_UNDER_TOTAL: f64 = 42.0;
pub const NCAAF_SPREAD_KILL: f64 = 28.0;
/// NCAAF months with reliable data: September through January.
pub const NCAAF_SEASON_MONTHS: [u32; 5] = [9, 10, 11, 12, 1];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NflFacts {
    pub backup_qb: bool,
    pub wind_mph: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NcaafFacts {
    /// Calendar month (1–12) the game is played in. The engine has no
    /// clock, so the caller supplies it.
    pub month: Option<u32>,
}

pub fn nfl(ctx: &MarketContext, facts: Option<&SituationalFacts>) -> KillDecision {
    let facts = match facts {
        Some(SituationalFacts::Nfl(f)) => f.clone(),
        _ => NflFacts::default(),
    };

    if facts.backup_qb {
        return KillDecision::kill("KILL: backup QB starting");
    }
    if !ctx.is_total() {
        return KillDecision::pass();
    }
    if facts.wind_mph > NFL_WIND_KILL_MPH {
        return KillDecision::kill(format!(
            "KILL: wind {:.0} mph, skip totals",
            facts.wind_mph
        ));
    }
    let high_total = ctx.point.is_some_and(|t| t > NFL_WIND_UNDER_TOTAL);
    if facts.wind_mph > NFL_WIND_UNDER_MPH && high_total {
        if ctx.is_over() {
            return KillDecision::kill(format!(
                "KILL: wind {:.0} mph with high total, force under",
                facts.wind_mph
            ));
        }
        return KillDecision::flag(format!(
            "FLAG: wind {:.0} mph with high total, under only",
            facts.wind_mph
        ));
    }
    KillDecision::pass()
}

pub fn ncaaf(ctx: &MarketContext, facts: Option<&SituationalFacts>) -> KillDecision {
    let facts = match facts {
        Some(SituationalFacts::Ncaaf(f)) => f.clone(),
        _ => NcaafFacts::default(),
    };

    if let Some(month) = facts.month {
        if !NCAAF_SEASON_MONTHS.contains(&month) {
            return KillDecision::kill(format!("KILL: NCAAF off-season (month {month})"));
        }
    }
    if ctx.is_spread() {
        if let Some(line) = ctx.point.map(f64::abs).filter(|l| *l >= NCAAF_SPREAD_KILL) {
            return KillDecision::kill(format!(
                "KILL: NCAAF spread {line} at or beyond {NCAAF_SPREAD_KILL}, blowout noise"
            ));
        }
    }
    KillDecision::pass()
}
