//! Strategy engine: consensus, edge detection, sizing, scoring and ranking.
//!
//! [`CandidateAssembler`] is the seam collaborators talk to. It takes one
//! event's quotes, runs every market side through the pipeline and hands
//! back a ranked, deduplicated candidate list plus a log of every decision
//! it made along the way.

pub mod consensus;
pub mod edge;
pub mod kelly;
pub mod nemesis;
pub mod parlay;
pub mod sharp;

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::kill_switch::{self, KillDecision, MarketContext, SituationalFacts};
use crate::probability::implied_probability;
use crate::rlm::{OpenPriceStore, RlmSignal, RlmTracker};
use crate::types::{
    BetCandidate, EngineError, KillVerdict, MarketKey, MarketSideId, Quote, Sport,
};
use consensus::ConsensusBuilder;
use edge::{EdgeDetector, EdgeRejection};
use kelly::KellyCalculator;
use nemesis::run_nemesis;
use parlay::{ParlayBuilder, ParlayCombo};
use sharp::{calculate_sharp_score, sharp_to_size, SituationalInputs};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Everything the engine knows about one event for one evaluation cycle.
#[derive(Debug, Clone)]
pub struct EventSnapshot {
    pub event_id: String,
    pub sport: Sport,
    pub quotes: Vec<Quote>,
    /// Facts that apply to every side of the event.
    pub event_facts: Option<SituationalFacts>,
    /// Facts for one side, keyed by side label. Override `event_facts`.
    pub side_facts: HashMap<String, SituationalFacts>,
    /// Efficiency gap points (0–20) from an external ratings feed.
    pub efficiency_gap: f64,
    pub situational: SituationalInputs,
}

impl EventSnapshot {
    pub fn new(event_id: &str, sport: Sport, quotes: Vec<Quote>) -> Self {
        Self {
            event_id: event_id.to_string(),
            sport,
            quotes,
            event_facts: None,
            side_facts: HashMap::new(),
            efficiency_gap: 0.0,
            situational: SituationalInputs::default(),
        }
    }

    fn facts_for(&self, side_label: &str) -> Option<&SituationalFacts> {
        self.side_facts
            .get(side_label)
            .or(self.event_facts.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Decision log
// ---------------------------------------------------------------------------

/// Record of every decision made (or skipped) while assembling candidates.
/// Includes the sides that were passed on and the reason why.
#[derive(Debug, Clone)]
pub enum DecisionRecord {
    /// Quote dropped before evaluation.
    InvalidQuote { quote: Quote, error: EngineError },
    /// Not enough complete sources to price the side.
    NoSignal {
        market_side: MarketSideId,
        error: EngineError,
    },
    /// Priced, but outside the collar or under the edge floor.
    Rejected {
        market_side: MarketSideId,
        reason: EdgeRejection,
    },
    /// Removed by a kill switch.
    Killed {
        market_side: MarketSideId,
        sharp_score: f64,
        reason: String,
    },
    /// Lost to a higher-ranked side of the same market.
    Duplicate {
        market_side: MarketSideId,
        kept: MarketSideId,
    },
    /// Surfaced as a candidate.
    Selected { candidate: Box<BetCandidate> },
}

/// Highest Sharp Score first; ties by market side id ascending.
fn rank_order(a: &BetCandidate, b: &BetCandidate) -> Ordering {
    b.sharp_score
        .total_cmp(&a.sharp_score)
        .then_with(|| a.market_side.cmp(&b.market_side))
}

/// Sort candidates into output order.
pub fn rank_candidates(candidates: &mut [BetCandidate]) {
    candidates.sort_by(rank_order);
}

// ---------------------------------------------------------------------------
// Assembler
// ---------------------------------------------------------------------------

/// Pipelines consensus → collar/edge → Kelly → RLM → Sharp Score → kill
/// switches → dedup and ranking.
///
/// Owns the RLM tracker, so one instance should live for the whole process
/// and be reused every cycle.
pub struct CandidateAssembler {
    config: EngineConfig,
    consensus: ConsensusBuilder,
    edge_detector: EdgeDetector,
    kelly: KellyCalculator,
    rlm: RlmTracker,
}

impl CandidateAssembler {
    pub fn new(config: EngineConfig, store: Arc<dyn OpenPriceStore>) -> Self {
        Self {
            consensus: ConsensusBuilder::new(config.consensus.clone()),
            edge_detector: EdgeDetector::new(config.collar.clone(), config.sizing.min_edge),
            kelly: KellyCalculator::new(config.sizing.kelly_fraction),
            rlm: RlmTracker::new(config.rlm.clone(), store),
            config,
        }
    }

    /// Assembler with a fresh process-local open-price store.
    pub fn in_memory(config: EngineConfig) -> Self {
        Self::new(config, Arc::new(crate::rlm::InMemoryOpenPriceStore::new()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rlm(&self) -> &RlmTracker {
        &self.rlm
    }

    /// Evaluate every market side of one event.
    ///
    /// Returns at most one candidate per market, sorted by Sharp Score
    /// descending, and the full decision log.
    pub fn evaluate_event(&self, event: &EventSnapshot) -> (Vec<BetCandidate>, Vec<DecisionRecord>) {
        let mut decisions: Vec<DecisionRecord> = Vec::new();

        // Step 1 – drop quotes that cannot be priced
        let mut valid: Vec<Quote> = Vec::with_capacity(event.quotes.len());
        for quote in &event.quotes {
            let check = if quote.market_side.event_id != event.event_id {
                Err(EngineError::MalformedMarket {
                    market: quote.market_side.market().to_string(),
                    message: format!("quote does not belong to event {}", event.event_id),
                })
            } else {
                implied_probability(quote.american_odds).map(|_| ())
            };
            match check {
                Ok(()) => valid.push(quote.clone()),
                Err(error) => {
                    warn!(
                        source = %quote.source_id,
                        market_side = %quote.market_side,
                        error = %error,
                        "Skipping invalid quote"
                    );
                    decisions.push(DecisionRecord::InvalidQuote {
                        quote: quote.clone(),
                        error,
                    });
                }
            }
        }

        // Step 2 – group by market, then side
        let mut markets: BTreeMap<MarketKey, BTreeMap<String, Vec<&Quote>>> = BTreeMap::new();
        for quote in &valid {
            markets
                .entry(quote.market_side.market())
                .or_default()
                .entry(quote.market_side.side_label.clone())
                .or_default()
                .push(quote);
        }

        // Step 3 – evaluate each side, keeping the best per market
        let mut best_per_market: BTreeMap<MarketKey, BetCandidate> = BTreeMap::new();
        for sides in markets.values() {
            let market_quotes: Vec<Quote> = sides.values().flatten().map(|q| (*q).clone()).collect();
            for side_quotes in sides.values() {
                let Some(best) = best_quote(side_quotes) else {
                    continue;
                };
                self.rlm.record_open(best);

                let Some(candidate) = self.evaluate_side(event, best, &market_quotes, &mut decisions)
                else {
                    continue;
                };

                keep_best(&mut best_per_market, candidate, &mut decisions);
            }
        }

        // Step 4 – rank
        let mut candidates: Vec<BetCandidate> = best_per_market.into_values().collect();
        rank_candidates(&mut candidates);
        for candidate in &candidates {
            decisions.push(DecisionRecord::Selected {
                candidate: Box::new(candidate.clone()),
            });
        }

        info!(
            event_id = %event.event_id,
            sport = %event.sport,
            quotes_in = event.quotes.len(),
            markets = markets.len(),
            candidates = candidates.len(),
            "Event evaluated"
        );

        (candidates, decisions)
    }

    /// Evaluate several events and rank their candidates together.
    ///
    /// The one-side-per-market rule holds across the whole batch, so two
    /// snapshots of the same event never surface both sides of a market.
    pub fn evaluate_events(
        &self,
        events: &[EventSnapshot],
    ) -> (Vec<BetCandidate>, Vec<DecisionRecord>) {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut best_per_market: BTreeMap<MarketKey, BetCandidate> = BTreeMap::new();
        let mut decisions = Vec::new();
        for event in events {
            if !seen.insert(event.event_id.as_str()) {
                warn!(event_id = %event.event_id, "Event appears more than once in batch");
            }
            let (candidates, event_decisions) = self.evaluate_event(event);
            // Selections are re-issued once the whole batch is deduplicated.
            decisions.extend(
                event_decisions
                    .into_iter()
                    .filter(|d| !matches!(d, DecisionRecord::Selected { .. })),
            );
            for candidate in candidates {
                keep_best(&mut best_per_market, candidate, &mut decisions);
            }
        }

        let mut candidates: Vec<BetCandidate> = best_per_market.into_values().collect();
        rank_candidates(&mut candidates);
        for candidate in &candidates {
            decisions.push(DecisionRecord::Selected {
                candidate: Box::new(candidate.clone()),
            });
        }
        (candidates, decisions)
    }

    /// Two-leg parlays over already-surfaced candidates.
    pub fn build_parlays(&self, candidates: &[BetCandidate]) -> Vec<ParlayCombo> {
        ParlayBuilder::new(self.config.parlay.clone()).build(candidates)
    }

    /// Run one side through consensus, edge, sizing, RLM, scoring and kill
    /// switches. Negative outcomes are logged to `decisions`.
    fn evaluate_side(
        &self,
        event: &EventSnapshot,
        best: &Quote,
        market_quotes: &[Quote],
        decisions: &mut Vec<DecisionRecord>,
    ) -> Option<BetCandidate> {
        let side = &best.market_side;

        let estimate = match self.consensus.consensus_fair_probability(side, market_quotes) {
            Ok(est) => est,
            Err(error) => {
                decisions.push(DecisionRecord::NoSignal {
                    market_side: side.clone(),
                    error,
                });
                return None;
            }
        };

        let edge = match self
            .edge_detector
            .detect_edge(&estimate, best.american_odds, event.sport)
        {
            Ok(edge) => edge,
            Err(reason) => {
                decisions.push(DecisionRecord::Rejected {
                    market_side: side.clone(),
                    reason,
                });
                return None;
            }
        };

        let kelly_units = match self.kelly.fractional_kelly(edge.fair_probability, edge.best_price) {
            Ok(units) => units,
            Err(e) => {
                decisions.push(DecisionRecord::Rejected {
                    market_side: side.clone(),
                    reason: EdgeRejection::Invalid(e),
                });
                return None;
            }
        };

        let public_price = self
            .rlm
            .open_price(side)
            .map_or(edge.best_price, |open| open.american_odds);
        let public_side = self.rlm.is_public_side(side, public_price);
        let signal = self
            .rlm
            .compute_rlm(side, edge.best_price, public_side)
            .unwrap_or_else(|e| {
                warn!(market_side = %side, error = %e, "RLM check failed");
                RlmSignal::COLD
            });

        let score = calculate_sharp_score(
            edge.edge,
            signal.confirmed,
            event.efficiency_gap,
            event.situational.score(),
        );

        let ctx = MarketContext {
            market_type: side.market_type,
            side_label: side.side_label.clone(),
            point: best.point,
            price: edge.best_price,
            implied: edge.market_implied,
            rlm_drift: signal.drift,
            efficiency_gap: event.efficiency_gap,
        };
        let kill = kill_switch::evaluate(event.sport, &ctx, event.facts_for(&side.side_label))
            .unwrap_or_else(KillDecision::pass);

        if kill.is_kill() {
            let reason = kill.reason.unwrap_or_default();
            debug!(
                market_side = %side,
                sharp = %format!("{:.1}", score.total),
                reason = %reason,
                "Killed"
            );
            decisions.push(DecisionRecord::Killed {
                market_side: side.clone(),
                sharp_score: score.total,
                reason,
            });
            return None;
        }

        let kelly_units = if kill.verdict == KillVerdict::Flag {
            kelly_units * self.config.sizing.flag_stake_multiplier
        } else {
            kelly_units
        };

        Some(BetCandidate {
            market_side: side.clone(),
            sport: event.sport,
            fair_probability: estimate.fair_probability,
            dispersion: estimate.dispersion,
            n_sources: estimate.n_sources,
            best_price: edge.best_price,
            best_source: best.source_id.clone(),
            point: best.point,
            market_implied: edge.market_implied,
            edge: edge.edge,
            kelly_units,
            sharp_score: score.total,
            sharp_breakdown: score.breakdown,
            size_label: sharp_to_size(score.total),
            meets_sharp_threshold: score.total >= self.config.sharp.threshold,
            rlm_confirmed: signal.confirmed,
            rlm_drift: signal.drift,
            kill_verdict: kill.verdict,
            kill_reason: kill.reason,
            nemesis: run_nemesis(event.sport, side.market_type),
        })
    }
}

/// Keep the higher-ranked of `candidate` and the current holder of its
/// market, logging the loser as a duplicate.
fn keep_best(
    best_per_market: &mut BTreeMap<MarketKey, BetCandidate>,
    candidate: BetCandidate,
    decisions: &mut Vec<DecisionRecord>,
) {
    let market = candidate.market_side.market();
    match best_per_market.remove(&market) {
        Some(kept) if rank_order(&kept, &candidate) != Ordering::Greater => {
            decisions.push(DecisionRecord::Duplicate {
                market_side: candidate.market_side.clone(),
                kept: kept.market_side.clone(),
            });
            best_per_market.insert(market, kept);
        }
        Some(displaced) => {
            decisions.push(DecisionRecord::Duplicate {
                market_side: displaced.market_side.clone(),
                kept: candidate.market_side.clone(),
            });
            best_per_market.insert(market, candidate);
        }
        None => {
            best_per_market.insert(market, candidate);
        }
    }
}

/// Best price for the bettor across sources: highest American odds, ties
/// to the lowest source id.
fn best_quote<'a>(quotes: &[&'a Quote]) -> Option<&'a Quote> {
    quotes.iter().copied().max_by(|a, b| {
        a.american_odds
            .cmp(&b.american_odds)
            .then_with(|| b.source_id.cmp(&a.source_id))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
