//! NBA and NCAAB rule sets.

use serde::{Deserialize, Serialize};

use super::{KillDecision, MarketContext, SituationalFacts};

/// Spreads tighter than this are killed when the side is on shorter rest.
pub const NBA_REST_SPREAD: f64 = 4.0;
pub const NBA_PACE_STD_DEV: f64 = 4.0;
pub const NCAAB_THREE_POINT_RELIANCE: f64 = 0.40;
pub const NCAAB_TEMPO_DIFF: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NbaFacts {
    pub rest_days: u32,
    pub opponent_rest_days: u32,
    pub star_absent: bool,
    /// Team's average winning margin, in points.
    pub avg_margin: f64,
    pub back_to_back: bool,
    pub road: bool,
    /// Standard deviation of combined pace over recent games.
    pub pace_std_dev: f64,
}

impl Default for NbaFacts {
    fn default() -> Self {
        Self {
            rest_days: 1,
            opponent_rest_days: 1,
            star_absent: false,
            avg_margin: 5.0,
            back_to_back: false,
            road: false,
            pace_std_dev: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NcaabFacts {
    /// Share of points from three-point range, 0–1.
    pub three_point_reliance: f64,
    pub away: bool,
    /// Difference in possessions per game between the two teams.
    pub tempo_diff: f64,
    pub conference_tournament: bool,
}

pub fn nba(ctx: &MarketContext, facts: Option<&SituationalFacts>) -> KillDecision {
    let facts = match facts {
        Some(SituationalFacts::Nba(f)) => f.clone(),
        _ => NbaFacts::default(),
    };
    let line = ctx.point.map(f64::abs);

    if ctx.is_spread() && facts.rest_days < facts.opponent_rest_days {
        if let Some(line) = line.filter(|l| *l < NBA_REST_SPREAD) {
            return KillDecision::kill(format!(
                "KILL: rest disadvantage with spread {line} inside {NBA_REST_SPREAD}"
            ));
        }
    }
    // Moneylines carry no point and are judged as a pick'em.
    if !ctx.is_total() && facts.star_absent {
        let line = line.unwrap_or(0.0);
        if line < facts.avg_margin {
            return KillDecision::kill(format!(
                "KILL: star absent with line {line} inside average margin {}",
                facts.avg_margin
            ));
        }
    }
    if ctx.is_total() && facts.pace_std_dev > NBA_PACE_STD_DEV {
        return KillDecision::kill(format!(
            "KILL: pace variance {:.1} too high for a total",
            facts.pace_std_dev
        ));
    }
    if facts.back_to_back {
        if facts.road {
            return KillDecision::flag("FLAG: road back-to-back, require 8%+ edge");
        }
        return KillDecision::flag("FLAG: home back-to-back, reduce Kelly");
    }
    KillDecision::pass()
}

pub fn ncaab(ctx: &MarketContext, facts: Option<&SituationalFacts>) -> KillDecision {
    let facts = match facts {
        Some(SituationalFacts::Ncaab(f)) => f.clone(),
        _ => NcaabFacts::default(),
    };

    if facts.away && facts.three_point_reliance > NCAAB_THREE_POINT_RELIANCE {
        return KillDecision::kill(format!(
            "KILL: 3PT reliance {:.0}% on the road",
            facts.three_point_reliance * 100.0
        ));
    }
    if ctx.is_total() && facts.tempo_diff > NCAAB_TEMPO_DIFF {
        return KillDecision::kill(format!(
            "KILL: tempo difference {:.1} possessions, skip total",
            facts.tempo_diff
        ));
    }
    if facts.conference_tournament {
        return KillDecision::flag("FLAG: conference tournament, require 8%+ edge");
    }
    KillDecision::pass()
}
