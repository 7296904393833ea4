//! NHL rule set.

use serde::{Deserialize, Serialize};

use super::{KillDecision, MarketContext, SituationalFacts};

/// Goaltending and schedule facts for the team being backed.
///
/// An unconfirmed starter is the default: without goalie data every side
/// is flagged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NhlFacts {
    /// A backup goalie is confirmed in net for the backed team.
    pub backup_goalie: bool,
    pub back_to_back: bool,
    pub starter_confirmed: bool,
}

pub fn evaluate(_ctx: &MarketContext, facts: Option<&SituationalFacts>) -> KillDecision {
    let facts = match facts {
        Some(SituationalFacts::Nhl(f)) => f.clone(),
        _ => NhlFacts::default(),
    };

    if facts.backup_goalie {
        return KillDecision::kill("KILL: backup goalie confirmed");
    }
    if facts.back_to_back {
        return KillDecision::flag("FLAG: back-to-back, reduce Kelly");
    }
    if !facts.starter_confirmed {
        return KillDecision::flag("FLAG: starting goalie not yet confirmed");
    }
    KillDecision::pass()
}
