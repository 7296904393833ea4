//! Soccer rule set.

use serde::{Deserialize, Serialize};

use super::{KillDecision, MarketContext, SituationalFacts};
use crate::poisson::{poisson_soccer, ExpectedGoals, TeamStrength};

/// Drift against the position beyond this kills the side.
pub const SOCCER_DRIFT_KILL: f64 = 0.10;
/// A total side the goal model gives less than this is flagged.
pub const POISSON_DISAGREE: f64 = 0.35;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoccerFacts {
    /// Implied-probability drift against the position. When absent the
    /// side's own open→current move is used instead.
    pub market_drift: Option<f64>,
    pub dead_rubber: bool,
    pub key_creator_out: bool,
    /// Goal-model means. When absent they are derived from the context's
    /// efficiency gap.
    pub expected_goals: Option<ExpectedGoals>,
}

pub fn evaluate(ctx: &MarketContext, facts: Option<&SituationalFacts>) -> KillDecision {
    let facts = match facts {
        Some(SituationalFacts::Soccer(f)) => f.clone(),
        _ => SoccerFacts::default(),
    };

    // A falling implied probability is the market moving away from the side.
    let drift = facts.market_drift.unwrap_or(-ctx.rlm_drift);
    if drift > SOCCER_DRIFT_KILL {
        return KillDecision::kill(format!(
            "KILL: market drifted {:.1}% against position",
            drift * 100.0
        ));
    }
    if facts.dead_rubber {
        return KillDecision::kill("KILL: dead rubber");
    }
    if facts.key_creator_out {
        return KillDecision::flag("FLAG: key creator out");
    }
    if let Some(reason) = poisson_disagreement(ctx, &facts) {
        return KillDecision::flag(reason);
    }
    KillDecision::pass()
}

/// Cross-check a totals side against the Poisson goal model.
fn poisson_disagreement(ctx: &MarketContext, facts: &SoccerFacts) -> Option<String> {
    let line = ctx.point.filter(|l| *l > 0.0)?;
    if !(ctx.is_over() || ctx.is_under()) {
        return None;
    }
    let expected = facts.expected_goals.unwrap_or_else(|| {
        TeamStrength::from_efficiency_gap(ctx.efficiency_gap).expected_goals(true)
    });
    let model = poisson_soccer(expected, line);
    let (label, p_side) = if ctx.is_over() {
        ("Over", model.over)
    } else {
        ("Under", model.under)
    };
    (p_side < POISSON_DISAGREE).then(|| {
        format!(
            "FLAG: Poisson disagrees (Poisson {label}={:.0}%, xG {:.2})",
            p_side * 100.0,
            model.expected.total()
        )
    })
}
