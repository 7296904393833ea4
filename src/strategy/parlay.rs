//! Two-leg parlay builder.
//!
//! Pairs surfaced candidates from independent events and keeps the pairs
//! whose combined price still carries positive expected value. Legs are
//! treated as independent, so two sides of the same event never pair.
//! Same-sport pairs share market forces and take an EV haircut.
//!
//! ```text
//! joint  = p1 × p2
//! payout = decimal1 × decimal2
//! ev     = joint × payout − 1
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, info};

use crate::config::ParlayConfig;
use crate::probability::{decimal_odds, implied_probability};
use crate::types::{BetCandidate, KillVerdict};

/// Legs priced beyond this are never paired.
pub const MAX_LEG_ODDS: i32 = 10_000;

/// A qualifying two-leg parlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParlayCombo {
    pub legs: [BetCandidate; 2],
    /// Joint win probability of both legs.
    pub probability: f64,
    /// Decimal payout per unit staked.
    pub payout: f64,
    /// Expected value per unit, after any same-sport haircut.
    pub ev: f64,
    pub kelly_units: f64,
    /// 40% EV, 30% joint probability, 30% mean leg Sharp Score.
    pub score: f64,
    pub same_sport_discounted: bool,
}

impl fmt::Display for ParlayCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b] = &self.legs;
        write!(
            f,
            "{} @ {:+} + {} @ {:+} (EV {:+.1}% | hit {:.1}% | {:.3}u{})",
            a.market_side,
            a.best_price,
            b.market_side,
            b.best_price,
            self.ev * 100.0,
            self.probability * 100.0,
            self.kelly_units,
            if self.same_sport_discounted {
                " | same-sport discount"
            } else {
                ""
            }
        )
    }
}

pub struct ParlayBuilder {
    config: ParlayConfig,
}

impl ParlayBuilder {
    pub fn new(config: ParlayConfig) -> Self {
        Self { config }
    }

    /// Every qualifying pair from `candidates`, best score first, capped at
    /// `max_results`.
    pub fn build(&self, candidates: &[BetCandidate]) -> Vec<ParlayCombo> {
        let legs: Vec<&BetCandidate> = candidates.iter().filter(|c| self.qualifies(c)).collect();

        let mut combos = Vec::new();
        for (i, a) in legs.iter().enumerate() {
            for b in &legs[i + 1..] {
                if a.market_side.event_id == b.market_side.event_id {
                    debug!(
                        event_id = %a.market_side.event_id,
                        "Skipping parlay with both legs in one event"
                    );
                    continue;
                }
                if let Some(combo) = self.price_pair(a, b) {
                    combos.push(combo);
                }
            }
        }

        combos.sort_by(|x, y| {
            y.score.total_cmp(&x.score).then_with(|| {
                (&x.legs[0].market_side, &x.legs[1].market_side)
                    .cmp(&(&y.legs[0].market_side, &y.legs[1].market_side))
            })
        });
        combos.truncate(self.config.max_results);

        info!(
            legs = legs.len(),
            combos = combos.len(),
            "Parlays built"
        );
        combos
    }

    fn qualifies(&self, c: &BetCandidate) -> bool {
        c.kill_verdict != KillVerdict::Kill
            && c.sharp_score >= self.config.min_sharp_score
            && c.edge >= self.config.min_edge
            && c.best_price.abs() <= MAX_LEG_ODDS
            && implied_probability(c.best_price).is_ok()
    }

    fn price_pair(&self, a: &BetCandidate, b: &BetCandidate) -> Option<ParlayCombo> {
        let payout = decimal_odds(a.best_price).ok()? * decimal_odds(b.best_price).ok()?;
        let probability = a.fair_probability * b.fair_probability;
        let raw_ev = probability * payout - 1.0;

        let same_sport = a.sport == b.sport;
        let ev = if same_sport {
            raw_ev * (1.0 - self.config.same_sport_discount)
        } else {
            raw_ev
        };
        if ev < self.config.min_ev {
            return None;
        }

        let kelly_units = if payout > 1.0 && probability > 0.0 {
            (self.config.kelly_fraction * raw_ev / (payout - 1.0))
                .clamp(0.0, self.config.max_units)
        } else {
            0.0
        };
        let score = 0.40 * (ev * 500.0).min(100.0)
            + 0.30 * probability * 100.0
            + 0.30 * (a.sharp_score + b.sharp_score) / 2.0;

        let (first, second) = match a.market_side.cmp(&b.market_side) {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };
        Some(ParlayCombo {
            legs: [first.clone(), second.clone()],
            probability,
            payout,
            ev,
            kelly_units,
            score,
            same_sport_discounted: same_sport,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::nemesis::run_nemesis;
    use crate::types::{MarketSideId, MarketType, SharpBreakdown, Sport};

    // ---- helpers -----------------------------------------------------------

    fn leg(event_id: &str, sport: Sport, fair: f64, price: i32, sharp: f64) -> BetCandidate {
        let implied = implied_probability(price).unwrap();
        BetCandidate {
            market_side: MarketSideId::new(event_id, MarketType::Spread, "Home"),
            sport,
            fair_probability: fair,
            dispersion: 0.01,
            n_sources: 3,
            best_price: price,
            best_source: "book_a".into(),
            point: Some(-2.5),
            market_implied: implied,
            edge: fair - implied,
            kelly_units: 0.5,
            sharp_score: sharp,
            sharp_breakdown: SharpBreakdown::default(),
            size_label: None,
            meets_sharp_threshold: sharp >= 45.0,
            rlm_confirmed: false,
            rlm_drift: 0.0,
            kill_verdict: KillVerdict::Pass,
            kill_reason: None,
            nemesis: run_nemesis(sport, MarketType::Spread),
        }
    }

    fn builder() -> ParlayBuilder {
        ParlayBuilder::new(ParlayConfig::default())
    }

    // ---- tests -------------------------------------------------------------

    #[test]
    fn test_cross_sport_pair_prices_at_full_ev() {
        let combos = builder().build(&[
            leg("ev1", Sport::Nba, 0.545, 100, 60.0),
            leg("ev2", Sport::Nfl, 0.545, 100, 50.0),
        ]);
        assert_eq!(combos.len(), 1);
        let c = &combos[0];
        let joint = 0.545 * 0.545;
        assert!((c.probability - joint).abs() < 1e-12);
        assert_eq!(c.payout, 4.0);
        assert!((c.ev - (joint * 4.0 - 1.0)).abs() < 1e-12);
        assert!(!c.same_sport_discounted);
        let kelly = 0.10 * c.ev / 3.0;
        assert!((c.kelly_units - kelly).abs() < 1e-12);
        let score = 0.40 * c.ev * 500.0 + 0.30 * joint * 100.0 + 0.30 * 55.0;
        assert!((c.score - score).abs() < 1e-9);
    }

    #[test]
    fn test_same_sport_takes_haircut() {
        let cross = builder().build(&[
            leg("ev1", Sport::Nba, 0.545, 100, 60.0),
            leg("ev2", Sport::Nfl, 0.545, 100, 60.0),
        ]);
        let same = builder().build(&[
            leg("ev1", Sport::Nba, 0.545, 100, 60.0),
            leg("ev2", Sport::Nba, 0.545, 100, 60.0),
        ]);
        assert!(same[0].same_sport_discounted);
        assert!((same[0].ev - cross[0].ev * 0.95).abs() < 1e-12);
        // Sizing works from the undiscounted edge.
        assert_eq!(same[0].kelly_units, cross[0].kelly_units);
    }

    #[test]
    fn test_same_event_legs_never_pair() {
        let mut total = leg("ev1", Sport::Nba, 0.56, 100, 60.0);
        total.market_side = MarketSideId::new("ev1", MarketType::Total, "Over");
        let combos = builder().build(&[leg("ev1", Sport::Nba, 0.545, 100, 60.0), total]);
        assert!(combos.is_empty());
    }

    #[test]
    fn test_weak_or_killed_legs_are_left_out() {
        let strong = leg("ev1", Sport::Nba, 0.545, 100, 60.0);
        let low_sharp = leg("ev2", Sport::Nfl, 0.545, 100, 39.9);
        let thin_edge = leg("ev3", Sport::Nfl, 0.545, -110, 60.0);
        let mut killed = leg("ev4", Sport::Nfl, 0.545, 100, 60.0);
        killed.kill_verdict = KillVerdict::Kill;
        let mut broken = leg("ev5", Sport::Nfl, 0.545, 100, 60.0);
        broken.best_price = 0;

        let combos = builder().build(&[strong, low_sharp, thin_edge, killed, broken]);
        assert!(combos.is_empty());
    }

    #[test]
    fn test_flagged_leg_may_pair() {
        let mut flagged = leg("ev2", Sport::Nhl, 0.545, 100, 60.0);
        flagged.kill_verdict = KillVerdict::Flag;
        let combos = builder().build(&[leg("ev1", Sport::Nba, 0.545, 100, 60.0), flagged]);
        assert_eq!(combos.len(), 1);
    }

    #[test]
    fn test_pair_below_min_ev_rejected() {
        // Joint 29.7% at 4.0 is about 18.8% EV.
        let legs = [
            leg("ev1", Sport::Nba, 0.545, 100, 60.0),
            leg("ev2", Sport::Nfl, 0.545, 100, 60.0),
        ];
        let strict = ParlayConfig {
            min_ev: 0.20,
            ..ParlayConfig::default()
        };
        assert!(ParlayBuilder::new(strict).build(&legs).is_empty());
        assert_eq!(builder().build(&legs).len(), 1);
    }

    #[test]
    fn test_ordered_by_score_and_capped() {
        let cfg = ParlayConfig {
            max_results: 2,
            ..ParlayConfig::default()
        };
        let combos = ParlayBuilder::new(cfg).build(&[
            leg("ev1", Sport::Nba, 0.545, 100, 60.0),
            leg("ev2", Sport::Nfl, 0.58, 100, 70.0),
            leg("ev3", Sport::Nhl, 0.56, 100, 50.0),
        ]);
        assert_eq!(combos.len(), 2);
        assert!(combos[0].score >= combos[1].score);
        let ids: Vec<&str> = combos[0].legs.iter().map(|l| l.market_side.event_id.as_str()).collect();
        assert_eq!(ids, vec!["ev1", "ev2"]);
    }

    #[test]
    fn test_kelly_is_capped() {
        let cfg = ParlayConfig {
            kelly_fraction: 1.0,
            ..ParlayConfig::default()
        };
        let combos = ParlayBuilder::new(cfg).build(&[
            leg("ev1", Sport::Nba, 0.90, 150, 80.0),
            leg("ev2", Sport::Nfl, 0.90, 150, 80.0),
        ]);
        assert_eq!(combos[0].kelly_units, 0.5);
    }

    #[test]
    fn test_fewer_than_two_legs() {
        assert!(builder().build(&[]).is_empty());
        assert!(builder().build(&[leg("ev1", Sport::Nba, 0.545, 100, 60.0)]).is_empty());
    }
}
