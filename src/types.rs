//! Shared types for the SHARP EDGE engine.
//!
//! These types form the data model used across all modules. They carry
//! no behaviour beyond identity, ordering and display so that the
//! probability, strategy, RLM and kill-switch modules can depend on them
//! without circular references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Sport
// ---------------------------------------------------------------------------

/// Sport an event belongs to. Drives collar band and kill-switch dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sport {
    Nba,
    Ncaab,
    Nfl,
    Ncaaf,
    Nhl,
    Mlb,
    Soccer,
    Tennis,
}

impl Sport {
    /// All known sports (useful for iteration).
    pub const ALL: &'static [Sport] = &[
        Sport::Nba,
        Sport::Ncaab,
        Sport::Nfl,
        Sport::Ncaaf,
        Sport::Nhl,
        Sport::Mlb,
        Sport::Soccer,
        Sport::Tennis,
    ];

    pub fn is_soccer(&self) -> bool {
        matches!(self, Sport::Soccer)
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sport::Nba => write!(f, "NBA"),
            Sport::Ncaab => write!(f, "NCAAB"),
            Sport::Nfl => write!(f, "NFL"),
            Sport::Ncaaf => write!(f, "NCAAF"),
            Sport::Nhl => write!(f, "NHL"),
            Sport::Mlb => write!(f, "MLB"),
            Sport::Soccer => write!(f, "SOCCER"),
            Sport::Tennis => write!(f, "TENNIS"),
        }
    }
}

/// Parse a sport key (case-insensitive). Soccer league keys and tennis
/// tour keys collapse onto their sport.
impl std::str::FromStr for Sport {
    type Err = EngineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = s.trim().to_uppercase();
        match key.as_str() {
            "NBA" => Ok(Sport::Nba),
            "NCAAB" => Ok(Sport::Ncaab),
            "NFL" => Ok(Sport::Nfl),
            "NCAAF" => Ok(Sport::Ncaaf),
            "NHL" => Ok(Sport::Nhl),
            "MLB" => Ok(Sport::Mlb),
            "SOCCER" | "EPL" | "LIGUE1" | "BUNDESLIGA" | "SERIE_A" | "LA_LIGA" | "MLS" => {
                Ok(Sport::Soccer)
            }
            _ if key.starts_with("TENNIS") => Ok(Sport::Tennis),
            _ => Err(EngineError::Config(format!("unknown sport: {s}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Markets
// ---------------------------------------------------------------------------

/// Market shape. Per-player markets are deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarketType {
    /// Two-way moneyline.
    #[serde(rename = "h2h")]
    Moneyline,
    #[serde(rename = "spreads")]
    Spread,
    #[serde(rename = "totals")]
    Total,
    /// Home / away / draw moneyline.
    #[serde(rename = "h2h_3way")]
    ThreeWay,
}

impl MarketType {
    /// Number of complementary sides a complete quote of this market carries.
    pub fn arity(&self) -> usize {
        match self {
            MarketType::ThreeWay => 3,
            _ => 2,
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketType::Moneyline => write!(f, "h2h"),
            MarketType::Spread => write!(f, "spreads"),
            MarketType::Total => write!(f, "totals"),
            MarketType::ThreeWay => write!(f, "h2h_3way"),
        }
    }
}

/// One market of one event (all of its sides share this key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarketKey {
    pub event_id: String,
    pub market_type: MarketType,
}

impl fmt::Display for MarketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.event_id, self.market_type)
    }
}

/// A specific outcome of a market, e.g. one team to cover a spread.
///
/// Ordering is lexicographic over (event, market type, label), which gives
/// the deterministic tie-break used when ranking candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarketSideId {
    pub event_id: String,
    pub market_type: MarketType,
    pub side_label: String,
}

impl MarketSideId {
    pub fn new(event_id: &str, market_type: MarketType, side_label: &str) -> Self {
        Self {
            event_id: event_id.to_string(),
            market_type,
            side_label: side_label.to_string(),
        }
    }

    /// The market this side belongs to.
    pub fn market(&self) -> MarketKey {
        MarketKey {
            event_id: self.event_id.clone(),
            market_type: self.market_type,
        }
    }
}

impl fmt::Display for MarketSideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.event_id, self.market_type, self.side_label)
    }
}

// ---------------------------------------------------------------------------
// Quotes and open prices
// ---------------------------------------------------------------------------

/// A single price from one source for one market side. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub source_id: String,
    pub market_side: MarketSideId,
    /// Conventional American odds (-110, +150, ...).
    pub american_odds: i32,
    /// Spread or total line attached to the price, if any.
    #[serde(default)]
    pub point: Option<f64>,
    pub observed_at: DateTime<Utc>,
}

/// First-ever-observed price for a market side. Write-once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPriceRecord {
    pub event_id: String,
    pub market_side: MarketSideId,
    pub american_odds: i32,
    pub first_seen_at: DateTime<Utc>,
}

impl OpenPriceRecord {
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            event_id: quote.market_side.event_id.clone(),
            market_side: quote.market_side.clone(),
            american_odds: quote.american_odds,
            first_seen_at: quote.observed_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Candidate output
// ---------------------------------------------------------------------------

/// Kill-switch verdict for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KillVerdict {
    /// No intervention.
    Pass,
    /// Surface, but with reduced stake / confidence.
    Flag,
    /// Never surface, regardless of score.
    Kill,
}

impl fmt::Display for KillVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KillVerdict::Pass => write!(f, "PASS"),
            KillVerdict::Flag => write!(f, "FLAG"),
            KillVerdict::Kill => write!(f, "KILL"),
        }
    }
}

/// Sizing label derived from the Sharp Score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SizeLabel {
    Lean,
    Standard,
    Nuclear,
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeLabel::Lean => write!(f, "LEAN"),
            SizeLabel::Standard => write!(f, "STANDARD"),
            SizeLabel::Nuclear => write!(f, "NUCLEAR"),
        }
    }
}

/// Points contributed by each Sharp Score component.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SharpBreakdown {
    pub edge: f64,
    pub rlm: f64,
    pub efficiency: f64,
    pub situational: f64,
}

/// Strongest standard argument against a bet. Display only: it never
/// changes ranking, sizing or the kill verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nemesis {
    pub counter: String,
    /// Rough likelihood the counter-thesis plays out.
    pub probability: f64,
    /// Sharp Score points the counter would cost, for context.
    pub adjustment: i32,
    /// Whether the counter alone would argue for passing on the bet.
    pub remove: bool,
}

/// A ranked wager recommendation. Built fresh each cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetCandidate {
    pub market_side: MarketSideId,
    pub sport: Sport,
    /// Consensus vig-free probability.
    pub fair_probability: f64,
    /// Population std-dev of per-source fair probabilities (display only).
    pub dispersion: f64,
    pub n_sources: usize,
    /// Best available American odds across sources.
    pub best_price: i32,
    pub best_source: String,
    pub point: Option<f64>,
    /// Vig-inclusive implied probability of `best_price`.
    pub market_implied: f64,
    pub edge: f64,
    /// Fractional Kelly stake in units, after any FLAG reduction.
    pub kelly_units: f64,
    pub sharp_score: f64,
    pub sharp_breakdown: SharpBreakdown,
    pub size_label: Option<SizeLabel>,
    /// Advisory: score is at or above the configured Sharp threshold.
    pub meets_sharp_threshold: bool,
    pub rlm_confirmed: bool,
    pub rlm_drift: f64,
    pub kill_verdict: KillVerdict,
    pub kill_reason: Option<String>,
    pub nemesis: Nemesis,
}

impl fmt::Display for BetCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} @ {:+} (fair {:.1}% | edge {:.1}% | sharp {:.1} | {:.2}u | {})",
            self.sport,
            self.market_side,
            self.best_price,
            self.fair_probability * 100.0,
            self.edge * 100.0,
            self.sharp_score,
            self.kelly_units,
            self.kill_verdict,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the engine.
///
/// Collar violations, edge floors and KILL verdicts are normal negative
/// outcomes and never appear here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid American odds: {0}")]
    InvalidOdds(String),

    #[error("Invalid probability: {0}")]
    InvalidProbability(f64),

    #[error("Insufficient consensus for {market_side}: {sources} source(s), need {required}")]
    InsufficientConsensus {
        market_side: String,
        sources: usize,
        required: usize,
    },

    #[error("Malformed market {market}: {message}")]
    MalformedMarket { market: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
