//! Mispricing detection.
//!
//! Compares the consensus fair probability to the best available price and
//! keeps only sides inside the odds collar whose edge clears the floor.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::consensus::ConsensusEstimate;
use crate::config::CollarConfig;
use crate::probability::implied_probability;
use crate::types::{EngineError, MarketSideId, Result, Sport};

/// Edge = fair probability − implied probability of the offered price.
///
/// May be negative; filtering is the caller's job.
pub fn calculate_edge(fair_probability: f64, best_odds: i32) -> Result<f64> {
    if !(fair_probability > 0.0 && fair_probability < 1.0) {
        return Err(EngineError::InvalidProbability(fair_probability));
    }
    Ok(fair_probability - implied_probability(best_odds)?)
}

// ---------------------------------------------------------------------------
// Edge detection
// ---------------------------------------------------------------------------

/// Detected edge on one market side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub market_side: MarketSideId,
    pub fair_probability: f64,
    pub best_price: i32,
    /// Vig-inclusive implied probability of `best_price`.
    pub market_implied: f64,
    pub edge: f64,
}

/// Why a priced side never became an edge. Not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeRejection {
    OutsideCollar { odds: i32 },
    BelowMinEdge { edge: f64 },
    Invalid(EngineError),
}

impl fmt::Display for EdgeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeRejection::OutsideCollar { odds } => write!(f, "price {odds:+} outside collar"),
            EdgeRejection::BelowMinEdge { edge } => {
                write!(f, "edge {:.2}% below floor", edge * 100.0)
            }
            EdgeRejection::Invalid(e) => write!(f, "{e}"),
        }
    }
}

pub struct EdgeDetector {
    collar: CollarConfig,
    min_edge: f64,
}

impl EdgeDetector {
    pub fn new(collar: CollarConfig, min_edge: f64) -> Self {
        Self { collar, min_edge }
    }

    pub fn min_edge(&self) -> f64 {
        self.min_edge
    }

    /// Whether `odds` lie inside the sport's collar (inclusive).
    pub fn passes_collar(&self, odds: i32, sport: Sport) -> bool {
        let (min, max) = if sport.is_soccer() {
            (self.collar.soccer_min, self.collar.soccer_max)
        } else {
            (self.collar.min, self.collar.max)
        };
        (min..=max).contains(&odds)
    }

    /// Check one side against the collar, then the edge floor.
    ///
    /// The collar runs first and is never waived by a large edge.
    pub fn detect_edge(
        &self,
        estimate: &ConsensusEstimate,
        best_price: i32,
        sport: Sport,
    ) -> std::result::Result<Edge, EdgeRejection> {
        if !self.passes_collar(best_price, sport) {
            debug!(
                market_side = %estimate.market_side,
                odds = best_price,
                "Price outside collar"
            );
            return Err(EdgeRejection::OutsideCollar { odds: best_price });
        }

        let edge = calculate_edge(estimate.fair_probability, best_price)
            .map_err(EdgeRejection::Invalid)?;
        if edge < self.min_edge {
            debug!(
                market_side = %estimate.market_side,
                edge = %format!("{:.2}%", edge * 100.0),
                floor = %format!("{:.2}%", self.min_edge * 100.0),
                "Edge below floor"
            );
            return Err(EdgeRejection::BelowMinEdge { edge });
        }

        let market_implied = estimate.fair_probability - edge;
        debug!(
            market_side = %estimate.market_side,
            odds = best_price,
            edge = %format!("{:.2}%", edge * 100.0),
            fair = %format!("{:.1}%", estimate.fair_probability * 100.0),
            "Edge detected"
        );

        Ok(Edge {
            market_side: estimate.market_side.clone(),
            fair_probability: estimate.fair_probability,
            best_price,
            market_implied,
            edge,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
