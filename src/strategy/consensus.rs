//! Multi-book consensus fair probability.
//!
//! Each source that quotes every side of a market contributes one de-vigged
//! probability for the target side; the consensus is their mean, and the
//! population standard deviation is reported as dispersion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::ConsensusConfig;
use crate::probability::no_vig_probabilities;
use crate::types::{EngineError, MarketSideId, Quote, Result};

/// Consensus estimate for one market side. Recomputed every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusEstimate {
    pub market_side: MarketSideId,
    pub fair_probability: f64,
    /// Diagnostic only. Never used to gate a candidate.
    pub dispersion: f64,
    pub n_sources: usize,
}

pub struct ConsensusBuilder {
    config: ConsensusConfig,
}

impl ConsensusBuilder {
    pub fn new(config: ConsensusConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Build the consensus fair probability for `side` from `quotes`.
    ///
    /// `quotes` may hold any mix of sources, sides and markets; only quotes
    /// for the side's own market are considered. Sources are visited in
    /// sorted id order so the result does not depend on input order.
    pub fn consensus_fair_probability(
        &self,
        side: &MarketSideId,
        quotes: &[Quote],
    ) -> Result<ConsensusEstimate> {
        let market = side.market();
        let arity = side.market_type.arity();

        // source -> side label -> latest quote
        let mut by_source: BTreeMap<&str, BTreeMap<&str, &Quote>> = BTreeMap::new();
        for q in quotes.iter().filter(|q| q.market_side.market() == market) {
            let sides = by_source.entry(q.source_id.as_str()).or_default();
            let label = q.market_side.side_label.as_str();
            let newer = sides.get(label).map_or(true, |existing| {
                (q.observed_at, q.american_odds) > (existing.observed_at, existing.american_odds)
            });
            if newer {
                sides.insert(label, q);
            }
        }

        let mut fair_probs: Vec<f64> = Vec::with_capacity(by_source.len());
        for (source, sides) in &by_source {
            if sides.len() != arity || !sides.contains_key(side.side_label.as_str()) {
                continue;
            }
            let labels: Vec<&str> = sides.keys().copied().collect();
            let odds: Vec<i32> = sides.values().map(|q| q.american_odds).collect();
            match no_vig_probabilities(&odds) {
                Ok(probs) => {
                    let idx = labels
                        .iter()
                        .position(|l| *l == side.side_label)
                        .unwrap_or_default();
                    fair_probs.push(probs[idx]);
                }
                Err(e) => {
                    warn!(source = %source, market = %market, error = %e, "Skipping malformed source quote");
                }
            }
        }

        let n = fair_probs.len();
        if n < self.config.min_books {
            debug!(
                market_side = %side,
                sources = n,
                required = self.config.min_books,
                "Insufficient consensus"
            );
            return Err(EngineError::InsufficientConsensus {
                market_side: side.to_string(),
                sources: n,
                required: self.config.min_books,
            });
        }

        let mean = fair_probs.iter().sum::<f64>() / n as f64;
        let variance = fair_probs.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n as f64;

        Ok(ConsensusEstimate {
            market_side: side.clone(),
            fair_probability: mean,
            dispersion: variance.sqrt(),
            n_sources: n,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
