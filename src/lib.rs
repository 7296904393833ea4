//! SHARP EDGE: edge detection and risk engine for sportsbook markets.
//!
//! Takes quotes from several bookmakers for an event, builds a vig-free
//! consensus probability, and surfaces the sides whose best available
//! price beats it, sized, scored and screened by per-sport kill switches.
//! Reverse line movement is tracked against persisted open prices, and
//! closing line value grades settled bets. Surfaced candidates can be
//! paired into two-leg parlays.

pub mod clv;
pub mod config;
pub mod kill_switch;
pub mod poisson;
pub mod probability;
pub mod rlm;
pub mod strategy;
pub mod types;

pub use config::EngineConfig;
pub use strategy::parlay::{ParlayBuilder, ParlayCombo};
pub use strategy::{CandidateAssembler, DecisionRecord, EventSnapshot};
pub use types::{BetCandidate, EngineError, KillVerdict, MarketSideId, MarketType, Quote, Sport};
