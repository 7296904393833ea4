//! Per-sport kill switches.
//!
//! Each sport owns a pure rule set that reads only its own situational
//! facts and returns a [`KillDecision`]. Rule sets are looked up through
//! [`rule_set`]; a sport without one (MLB) gets `None` and relies on the
//! collar and edge floor alone.
//!
//! Within a rule set every KILL predicate is checked before any FLAG, so
//! the most severe verdict wins.

pub mod basketball;
pub mod football;
pub mod nhl;
pub mod soccer;
pub mod tennis;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{KillVerdict, MarketType, Sport};
pub use basketball::{NbaFacts, NcaabFacts};
pub use football::{NcaafFacts, NflFacts};
pub use nhl::NhlFacts;
pub use soccer::SoccerFacts;
pub use tennis::{Surface, TennisFacts};

/// Situational facts, tagged by the sport they describe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sport", rename_all = "UPPERCASE")]
pub enum SituationalFacts {
    Nba(NbaFacts),
    Ncaab(NcaabFacts),
    Nfl(NflFacts),
    Ncaaf(NcaafFacts),
    Nhl(NhlFacts),
    Soccer(SoccerFacts),
    Tennis(TennisFacts),
}

impl SituationalFacts {
    pub fn sport(&self) -> Sport {
        match self {
            SituationalFacts::Nba(_) => Sport::Nba,
            SituationalFacts::Ncaab(_) => Sport::Ncaab,
            SituationalFacts::Nfl(_) => Sport::Nfl,
            SituationalFacts::Ncaaf(_) => Sport::Ncaaf,
            SituationalFacts::Nhl(_) => Sport::Nhl,
            SituationalFacts::Soccer(_) => Sport::Soccer,
            SituationalFacts::Tennis(_) => Sport::Tennis,
        }
    }
}

/// The market side a rule set is judging.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketContext {
    pub market_type: MarketType,
    pub side_label: String,
    /// Spread or total line for the side, if the market has one.
    pub point: Option<f64>,
    pub price: i32,
    /// Vig-inclusive implied probability of `price`.
    pub implied: f64,
    /// Signed implied-probability move since the open (`current − open`).
    pub rlm_drift: f64,
    /// Home-team efficiency gap (0–20, 10 is even) for model cross-checks.
    pub efficiency_gap: f64,
}

impl MarketContext {
    pub fn is_total(&self) -> bool {
        self.market_type == MarketType::Total
    }

    pub fn is_spread(&self) -> bool {
        self.market_type == MarketType::Spread
    }

    pub fn is_over(&self) -> bool {
        self.is_total() && self.side_label.eq_ignore_ascii_case("over")
    }

    pub fn is_under(&self) -> bool {
        self.is_total() && self.side_label.eq_ignore_ascii_case("under")
    }
}

/// Verdict plus the human-readable rule that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillDecision {
    pub verdict: KillVerdict,
    pub reason: Option<String>,
}

impl KillDecision {
    pub fn pass() -> Self {
        Self {
            verdict: KillVerdict::Pass,
            reason: None,
        }
    }

    pub fn flag(reason: impl Into<String>) -> Self {
        Self {
            verdict: KillVerdict::Flag,
            reason: Some(reason.into()),
        }
    }

    pub fn kill(reason: impl Into<String>) -> Self {
        Self {
            verdict: KillVerdict::Kill,
            reason: Some(reason.into()),
        }
    }

    pub fn is_kill(&self) -> bool {
        self.verdict == KillVerdict::Kill
    }
}

/// A sport's rule set. Receives `None` when no facts for that sport exist.
pub type RuleSet = fn(&MarketContext, Option<&SituationalFacts>) -> KillDecision;

/// Sport → rule set. `None` means the sport has no kill switches.
pub fn rule_set(sport: Sport) -> Option<RuleSet> {
    match sport {
        Sport::Nba => Some(basketball::nba),
        Sport::Ncaab => Some(basketball::ncaab),
        Sport::Nfl => Some(football::nfl),
        Sport::Ncaaf => Some(football::ncaaf),
        Sport::Nhl => Some(nhl::evaluate),
        Sport::Soccer => Some(soccer::evaluate),
        Sport::Tennis => Some(tennis::evaluate),
        Sport::Mlb => None,
    }
}

/// Run `sport`'s rule set against one market side.
///
/// Facts tagged for a different sport are dropped before the rule set
/// sees them. Returns `None` when the sport has no rule set.
pub fn evaluate(
    sport: Sport,
    ctx: &MarketContext,
    facts: Option<&SituationalFacts>,
) -> Option<KillDecision> {
    let rules = rule_set(sport)?;
    let facts = facts.filter(|f| {
        let own = f.sport() == sport;
        if !own {
            debug!(%sport, facts_for = %f.sport(), "Ignoring facts for another sport");
        }
        own
    });
    Some(rules(ctx, facts))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
