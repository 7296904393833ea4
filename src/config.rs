//! Engine configuration.
//!
//! Every threshold the engine applies is a named constant here and a field
//! of [`EngineConfig`]. A TOML file can override any subset of them; each
//! section falls back to the constants below when omitted.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use crate::types::EngineError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const COLLAR_MIN: i32 = -180;
pub const COLLAR_MAX: i32 = 150;
pub const SOCCER_COLLAR_MIN: i32 = -250;
pub const SOCCER_COLLAR_MAX: i32 = 400;
pub const MIN_EDGE: f64 = 0.035;
pub const MIN_BOOKS: usize = 2;
pub const KELLY_FRACTION: f64 = 0.25;
pub const SHARP_THRESHOLD: f64 = 45.0;
pub const RLM_THRESHOLD: f64 = 0.03;
pub const RLM_FIRE_GATE: u64 = 20;
pub const CLV_GATE: usize = 30;
/// Prices steeper than this are treated as carrying public money.
pub const PUBLIC_SIDE_PRICE: i32 = -105;
pub const PARLAY_MIN_EV: f64 = 0.02;
pub const PARLAY_KELLY_FRACTION: f64 = 0.10;
pub const PARLAY_MAX_UNITS: f64 = 0.50;
/// EV haircut when both legs are in the same sport.
pub const PARLAY_SAME_SPORT_DISCOUNT: f64 = 0.05;

/// Top-level engine configuration.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub collar: CollarConfig,
    pub consensus: ConsensusConfig,
    pub sizing: SizingConfig,
    pub sharp: SharpConfig,
    pub rlm: RlmConfig,
    pub clv: ClvConfig,
    pub parlay: ParlayConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CollarConfig {
    pub min: i32,
    pub max: i32,
    pub soccer_min: i32,
    pub soccer_max: i32,
}

impl Default for CollarConfig {
    fn default() -> Self {
        Self {
            min: COLLAR_MIN,
            max: COLLAR_MAX,
            soccer_min: SOCCER_COLLAR_MIN,
            soccer_max: SOCCER_COLLAR_MAX,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ConsensusConfig {
    pub min_books: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self { min_books: MIN_BOOKS }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SizingConfig {
    pub min_edge: f64,
    pub kelly_fraction: f64,
    /// Stake multiplier applied to FLAG candidates.
    pub flag_stake_multiplier: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            min_edge: MIN_EDGE,
            kelly_fraction: KELLY_FRACTION,
            flag_stake_multiplier: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SharpConfig {
    /// Advisory promotion threshold; surfaced on candidates, never filters.
    pub threshold: f64,
}

impl Default for SharpConfig {
    fn default() -> Self {
        Self { threshold: SHARP_THRESHOLD }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RlmConfig {
    pub threshold: f64,
    pub fire_gate: u64,
    pub public_side_price: i32,
}

impl Default for RlmConfig {
    fn default() -> Self {
        Self {
            threshold: RLM_THRESHOLD,
            fire_gate: RLM_FIRE_GATE,
            public_side_price: PUBLIC_SIDE_PRICE,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClvConfig {
    pub gate: usize,
    pub excellent: f64,
    pub good: f64,
}

impl Default for ClvConfig {
    fn default() -> Self {
        Self {
            gate: CLV_GATE,
            excellent: 0.02,
            good: 0.005,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ParlayConfig {
    pub min_ev: f64,
    /// Each leg must clear this Sharp Score.
    pub min_sharp_score: f64,
    /// Each leg must clear this edge.
    pub min_edge: f64,
    pub kelly_fraction: f64,
    pub max_units: f64,
    pub same_sport_discount: f64,
    pub max_results: usize,
}

impl Default for ParlayConfig {
    fn default() -> Self {
        Self {
            min_ev: PARLAY_MIN_EV,
            min_sharp_score: 40.0,
            min_edge: 0.04,
            kelly_fraction: PARLAY_KELLY_FRACTION,
            max_units: PARLAY_MAX_UNITS,
            same_sport_discount: PARLAY_SAME_SPORT_DISCOUNT,
            max_results: 10,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the engine's invariants meaningless.
    pub fn validate(&self) -> std::result::Result<(), EngineError> {
        let c = &self.collar;
        if c.min >= c.max || c.soccer_min >= c.soccer_max {
            return Err(EngineError::Config("collar min must be below collar max".into()));
        }
        if self.consensus.min_books < 2 {
            return Err(EngineError::Config("min_books must be at least 2".into()));
        }
        if !(0.0..1.0).contains(&self.sizing.min_edge) {
            return Err(EngineError::Config("min_edge must be in [0, 1)".into()));
        }
        if !(self.sizing.kelly_fraction > 0.0 && self.sizing.kelly_fraction <= 1.0) {
            return Err(EngineError::Config("kelly_fraction must be in (0, 1]".into()));
        }
        if !(0.0..=1.0).contains(&self.sizing.flag_stake_multiplier) {
            return Err(EngineError::Config("flag_stake_multiplier must be in [0, 1]".into()));
        }
        if !(0.0..=100.0).contains(&self.sharp.threshold) {
            return Err(EngineError::Config("sharp threshold must be in [0, 100]".into()));
        }
        if !(self.rlm.threshold > 0.0 && self.rlm.threshold < 1.0) {
            return Err(EngineError::Config("rlm threshold must be in (0, 1)".into()));
        }
        if self.rlm.fire_gate == 0 {
            return Err(EngineError::Config("rlm fire_gate must be positive".into()));
        }
        if self.clv.good > self.clv.excellent {
            return Err(EngineError::Config("clv good cut must not exceed excellent".into()));
        }
        let p = &self.parlay;
        if !(p.kelly_fraction > 0.0 && p.kelly_fraction <= 1.0) || p.max_units < 0.0 {
            return Err(EngineError::Config("parlay sizing must be positive".into()));
        }
        if !(0.0..1.0).contains(&p.same_sport_discount) {
            return Err(EngineError::Config("parlay same_sport_discount must be in [0, 1)".into()));
        }
        Ok(())
    }
}
