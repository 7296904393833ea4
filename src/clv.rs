//! Closing line value (CLV).
//!
//! Measures how a bet's price compared with where the market closed.
//! Consistently beating the close is the long-run evidence that the
//! engine's edges are real, so settled bets are graded here and rolled
//! up into a summary verdict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::ClvConfig;
use crate::probability::implied_probability;
use crate::types::{MarketSideId, Result};

/// Mean CLV (percentage points) and positive rate needed for each
/// summary verdict.
const STRONG_MEAN_PCT: f64 = 1.5;
const STRONG_POSITIVE_RATE: f64 = 0.60;
const MARGINAL_MEAN_PCT: f64 = 0.5;
const MARGINAL_POSITIVE_RATE: f64 = 0.50;

// ---------------------------------------------------------------------------
// Calculation and grading
// ---------------------------------------------------------------------------

/// CLV as a fraction of the closing probability.
///
/// `clv = (close_prob − bet_prob) / close_prob`, using vig-inclusive
/// implied probabilities. Positive means the bet was placed at a better
/// price than the close. `open_price` is validated but does not enter the
/// formula.
pub fn calculate_clv(open_price: i32, close_price: i32, bet_price: i32) -> Result<f64> {
    implied_probability(open_price)?;
    let close_prob = implied_probability(close_price)?;
    let bet_prob = implied_probability(bet_price)?;
    Ok((close_prob - bet_prob) / close_prob)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClvGrade {
    Excellent,
    Good,
    Neutral,
    Poor,
}

impl ClvGrade {
    pub fn from_clv(clv: f64, config: &ClvConfig) -> Self {
        if clv >= config.excellent {
            ClvGrade::Excellent
        } else if clv >= config.good {
            ClvGrade::Good
        } else if clv >= 0.0 {
            ClvGrade::Neutral
        } else {
            ClvGrade::Poor
        }
    }
}

impl fmt::Display for ClvGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClvGrade::Excellent => write!(f, "EXCELLENT"),
            ClvGrade::Good => write!(f, "GOOD"),
            ClvGrade::Neutral => write!(f, "NEUTRAL"),
            ClvGrade::Poor => write!(f, "POOR"),
        }
    }
}

/// Grade with the default cut points (2% / 0.5% / 0).
pub fn clv_grade(clv: f64) -> ClvGrade {
    ClvGrade::from_clv(clv, &ClvConfig::default())
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// CLV of one settled bet. Built once at settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClvRecord {
    pub event_id: String,
    pub market_side: MarketSideId,
    pub open_price: i32,
    pub bet_price: i32,
    pub close_price: i32,
    /// CLV in percentage points (1.88 = 1.88%), rounded to four places.
    pub clv_pct: f64,
    pub grade: ClvGrade,
    pub settled_at: DateTime<Utc>,
}

impl ClvRecord {
    pub fn settle(
        market_side: MarketSideId,
        open_price: i32,
        bet_price: i32,
        close_price: i32,
        settled_at: DateTime<Utc>,
        config: &ClvConfig,
    ) -> Result<Self> {
        let clv = calculate_clv(open_price, close_price, bet_price)?;
        Ok(Self {
            event_id: market_side.event_id.clone(),
            market_side,
            open_price,
            bet_price,
            close_price,
            clv_pct: round4(clv * 100.0),
            grade: ClvGrade::from_clv(clv, config),
            settled_at,
        })
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClvVerdict {
    /// Fewer records than the CLV gate.
    InsufficientData,
    StrongEdgeCapture,
    Marginal,
    NoEdge,
}

impl fmt::Display for ClvVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClvVerdict::InsufficientData => write!(f, "INSUFFICIENT DATA"),
            ClvVerdict::StrongEdgeCapture => write!(f, "STRONG EDGE CAPTURE"),
            ClvVerdict::Marginal => write!(f, "MARGINAL"),
            ClvVerdict::NoEdge => write!(f, "NO EDGE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Roll-up of settled records. CLV figures are in percentage points.
pub struct ClvSummary {
    pub count: usize,
    pub mean_clv_pct: f64,
    /// Share of records with CLV above zero.
    pub positive_rate: f64,
    pub min_clv_pct: f64,
    pub max_clv_pct: f64,
    pub grades: BTreeMap<ClvGrade, usize>,
    pub verdict: ClvVerdict,
}

impl ClvSummary {
    pub fn from_records(records: &[ClvRecord], config: &ClvConfig) -> Self {
        if records.is_empty() {
            return Self {
                count: 0,
                mean_clv_pct: 0.0,
                positive_rate: 0.0,
                min_clv_pct: 0.0,
                max_clv_pct: 0.0,
                grades: BTreeMap::new(),
                verdict: ClvVerdict::InsufficientData,
            };
        }

        let n = records.len() as f64;
        let mean_clv_pct = records.iter().map(|r| r.clv_pct).sum::<f64>() / n;
        let positive_rate = records.iter().filter(|r| r.clv_pct > 0.0).count() as f64 / n;
        let min_clv_pct = records.iter().map(|r| r.clv_pct).fold(f64::INFINITY, f64::min);
        let max_clv_pct = records.iter().map(|r| r.clv_pct).fold(f64::NEG_INFINITY, f64::max);

        let mut grades = BTreeMap::new();
        for r in records {
            *grades.entry(r.grade).or_insert(0) += 1;
        }

        let verdict = if records.len() < config.gate {
            ClvVerdict::InsufficientData
        } else if mean_clv_pct >= STRONG_MEAN_PCT && positive_rate >= STRONG_POSITIVE_RATE {
            ClvVerdict::StrongEdgeCapture
        } else if mean_clv_pct >= MARGINAL_MEAN_PCT && positive_rate >= MARGINAL_POSITIVE_RATE
        {
            ClvVerdict::Marginal
        } else {
            ClvVerdict::NoEdge
        };

        Self {
            count: records.len(),
            mean_clv_pct,
            positive_rate,
            min_clv_pct,
            max_clv_pct,
            grades,
            verdict,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
