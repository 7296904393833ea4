//! Tennis rule set.
//!
//! Tennis never kills outright. Surface risk is inferred from the
//! tournament key and only ever flags.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{KillDecision, MarketContext, SituationalFacts};

pub const CLAY_FAVOURITE_FLAG: f64 = 0.72;
pub const GRASS_FAVOURITE_FLAG: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Hard,
    Grass,
    Clay,
    Unknown,
}

const HARD_KEYWORDS: &[&str] = &[
    "us_open", "australian_open", "australia", "indian_wells", "miami", "cincinnati",
    "montreal", "toronto", "canada_open", "canadian_open", "paris", "shanghai", "beijing",
    "tokyo", "vienna", "basel", "stockholm", "st_petersburg", "doha", "qatar", "dubai",
    "adelaide", "auckland", "atpfinals", "atp_finals", "nitto", "winston_salem",
    "washington", "los_cabos", "metz", "sofia", "nur_sultan", "astana", "almaty", "dallas",
    "delray_beach", "acapulco", "rotterdam", "marseille", "memphis", "singapore",
    "wta_finals", "pan_pacific", "china_open", "hard",
];

const GRASS_KEYWORDS: &[&str] = &[
    "wimbledon", "queens", "halle", "hertogenbosch", "eastbourne", "birmingham",
    "nottingham", "newport", "grass",
];

const CLAY_KEYWORDS: &[&str] = &[
    "french", "roland", "madrid", "barcelona", "monte_carlo", "montecarlo", "rome",
    "italian_open", "hamburg", "lyon", "geneva", "bucharest", "casablanca", "gstaad",
    "bastad", "bogota", "umag", "kitzbuhel", "estoril", "houston", "marrakech",
    "buenos_aires", "cordoba", "rio_de_janeiro", "santiago", "munich", "belgrade",
];

impl Surface {
    /// Infer the surface from a tournament key such as
    /// `tennis_atp_french_open`. Hard-court keywords win over grass, grass
    /// over clay.
    pub fn from_sport_key(key: &str) -> Surface {
        let key = key.to_lowercase();
        let hit = |words: &[&str]| words.iter().any(|w| key.contains(w));
        if key.is_empty() {
            Surface::Unknown
        } else if hit(HARD_KEYWORDS) {
            Surface::Hard
        } else if hit(GRASS_KEYWORDS) {
            Surface::Grass
        } else if hit(CLAY_KEYWORDS) {
            Surface::Clay
        } else {
            Surface::Unknown
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Surface::Hard => write!(f, "hard"),
            Surface::Grass => write!(f, "grass"),
            Surface::Clay => write!(f, "clay"),
            Surface::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TennisFacts {
    /// Tournament sport key, e.g. `tennis_wta_wimbledon`.
    pub tournament_key: String,
}

pub fn evaluate(ctx: &MarketContext, facts: Option<&SituationalFacts>) -> KillDecision {
    if ctx.is_total() {
        return KillDecision::pass();
    }
    let surface = match facts {
        Some(SituationalFacts::Tennis(f)) => Surface::from_sport_key(&f.tournament_key),
        _ => Surface::Unknown,
    };
    let favourite = ctx.implied > 0.5;
    let head_to_head = !ctx.is_spread();

    match surface {
        Surface::Unknown => KillDecision::flag("FLAG: surface unknown, require 8%+ edge"),
        Surface::Clay if head_to_head && favourite && ctx.implied > CLAY_FAVOURITE_FLAG => {
            KillDecision::flag(format!(
                "FLAG: clay court with heavy favourite ({:.1}%)",
                ctx.implied * 100.0
            ))
        }
        Surface::Grass if head_to_head && favourite && ctx.implied > GRASS_FAVOURITE_FLAG => {
            KillDecision::flag(format!(
                "FLAG: grass court with heavy favourite ({:.1}%)",
                ctx.implied * 100.0
            ))
        }
        _ => KillDecision::pass(),
    }
}
