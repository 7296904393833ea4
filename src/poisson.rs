//! Poisson goal model for soccer.
//!
//! Each team's goal count is an independent Poisson variable. The scoreline
//! grid up to [`MAX_GOALS`] per side gives 1X2 and over/under
//! probabilities, which the soccer rule set uses to sanity-check totals.

use serde::{Deserialize, Serialize};

/// League-average goals per game for the home and away side.
pub const LEAGUE_AVG_GOALS_HOME: f64 = 1.45;
pub const LEAGUE_AVG_GOALS_AWAY: f64 = 1.05;
/// Extra share of home goals applied on top of the league averages.
pub const HOME_GOAL_BOOST: f64 = 0.10;
pub const MAX_GOALS: u32 = 10;

/// Efficiency gap treated as an even matchup.
pub const NEUTRAL_GAP: f64 = 10.0;
/// Largest swing in attack/defence factors at a gap of 0 or 20.
pub const STRENGTH_SWING: f64 = 0.25;

const MIN_LAMBDA: f64 = 0.1;
const MAX_LAMBDA: f64 = 6.0;

/// Relative attack and defence factors; 1.0 is league average. A defence
/// factor above 1.0 concedes more than average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamStrength {
    pub home_attack: f64,
    pub away_attack: f64,
    pub home_defense: f64,
    pub away_defense: f64,
}

impl Default for TeamStrength {
    fn default() -> Self {
        Self {
            home_attack: 1.0,
            away_attack: 1.0,
            home_defense: 1.0,
            away_defense: 1.0,
        }
    }
}

impl TeamStrength {
    /// Map the 0–20 efficiency gap (home advantage above 10) onto
    /// strength factors.
    pub fn from_efficiency_gap(efficiency_gap: f64) -> Self {
        let shift = if efficiency_gap.is_nan() {
            0.0
        } else {
            ((efficiency_gap - NEUTRAL_GAP) / NEUTRAL_GAP).clamp(-1.0, 1.0) * STRENGTH_SWING
        };
        Self {
            home_attack: 1.0 + shift,
            away_attack: 1.0 - shift,
            home_defense: 1.0 - shift,
            away_defense: 1.0 + shift,
        }
    }

    /// Expected goals for each side.
    pub fn expected_goals(&self, home_advantage: bool) -> ExpectedGoals {
        let boost = if home_advantage { 1.0 + HOME_GOAL_BOOST } else { 1.0 };
        ExpectedGoals {
            home: LEAGUE_AVG_GOALS_HOME * self.home_attack * self.away_defense * boost,
            away: LEAGUE_AVG_GOALS_AWAY * self.away_attack * self.home_defense,
        }
    }
}

/// Poisson means for each side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpectedGoals {
    pub home: f64,
    pub away: f64,
}

impl ExpectedGoals {
    pub fn total(&self) -> f64 {
        self.home + self.away
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoissonResult {
    pub home_win: f64,
    pub draw: f64,
    pub away_win: f64,
    /// Probability the match total lands strictly above the line.
    pub over: f64,
    /// Probability the match total lands strictly below the line.
    pub under: f64,
    pub expected: ExpectedGoals,
}

/// `P(X = k)` for `X ~ Poisson(lambda)`.
pub fn poisson_pmf(k: u32, lambda: f64) -> f64 {
    // Iterative form avoids overflowing k! for large k.
    (1..=k).fold((-lambda).exp(), |p, i| p * lambda / f64::from(i))
}

/// Score the full grid for the given means against a total line.
///
/// Means are clamped to `[0.1, 6.0]` goals.
pub fn poisson_soccer(expected: ExpectedGoals, total_line: f64) -> PoissonResult {
    let home_lambda = expected.home.clamp(MIN_LAMBDA, MAX_LAMBDA);
    let away_lambda = expected.away.clamp(MIN_LAMBDA, MAX_LAMBDA);
    let home: Vec<f64> = (0..=MAX_GOALS).map(|k| poisson_pmf(k, home_lambda)).collect();
    let away: Vec<f64> = (0..=MAX_GOALS).map(|k| poisson_pmf(k, away_lambda)).collect();

    let mut result = PoissonResult {
        home_win: 0.0,
        draw: 0.0,
        away_win: 0.0,
        over: 0.0,
        under: 0.0,
        expected: ExpectedGoals {
            home: home_lambda,
            away: away_lambda,
        },
    };
    for (h, ph) in home.iter().enumerate() {
        for (a, pa) in away.iter().enumerate() {
            let p = ph * pa;
            match h.cmp(&a) {
                std::cmp::Ordering::Greater => result.home_win += p,
                std::cmp::Ordering::Equal => result.draw += p,
                std::cmp::Ordering::Less => result.away_win += p,
            }
            let goals = (h + a) as f64;
            if goals > total_line {
                result.over += p;
            } else if goals < total_line {
                result.under += p;
            }
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
