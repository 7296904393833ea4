//! Sharp Score: the 0–100 composite used to rank candidates.
//!
//! | component   | points | source                                   |
//! |-------------|--------|------------------------------------------|
//! | EDGE        | 0–40   | `edge / 10% × 40`                        |
//! | RLM         | 0 / 25 | reverse line movement confirmed          |
//! | EFFICIENCY  | 0–20   | caller-provided efficiency gap           |
//! | SITUATIONAL | 0–15   | rest + injury + motivation + matchup     |
//!
//! Without RLM the ceiling is 75, so STANDARD and NUCLEAR sizing both
//! require a confirmed reverse move.

use serde::{Deserialize, Serialize};

use crate::types::{SharpBreakdown, SizeLabel};

pub const EDGE_MAX_POINTS: f64 = 40.0;
/// Edge at which the EDGE component saturates.
pub const EDGE_SATURATION: f64 = 0.10;
pub const RLM_POINTS: f64 = 25.0;
pub const EFFICIENCY_MAX_POINTS: f64 = 20.0;
pub const SITUATIONAL_MAX_POINTS: f64 = 15.0;

pub const NUCLEAR_SCORE: f64 = 90.0;
pub const STANDARD_SCORE: f64 = 80.0;
pub const LEAN_SCORE: f64 = 75.0;

/// Total score plus the points each component contributed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SharpScore {
    pub total: f64,
    pub breakdown: SharpBreakdown,
}

/// Raw situational factors, each capped individually before summing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SituationalInputs {
    /// Rest advantage, up to 5 points.
    pub rest_edge: f64,
    /// Injury leverage, up to 5 points.
    pub injury_leverage: f64,
    /// Motivation, up to 3 points.
    pub motivation: f64,
    /// Stylistic matchup, up to 2 points.
    pub matchup: f64,
}

impl SituationalInputs {
    /// Situational component in `[0, 15]`.
    pub fn score(&self) -> f64 {
        let part = |v: f64, cap: f64| v.clamp(0.0, cap);
        let total = part(self.rest_edge, 5.0)
            + part(self.injury_leverage, 5.0)
            + part(self.motivation, 3.0)
            + part(self.matchup, 2.0);
        total.min(SITUATIONAL_MAX_POINTS)
    }
}

/// Composite Sharp Score.
///
/// Every component is clamped to its band, so the total always lies in
/// `[0, 100]`. NaN inputs contribute zero.
pub fn calculate_sharp_score(
    edge: f64,
    rlm_confirmed: bool,
    efficiency_gap: f64,
    situational_score: f64,
) -> SharpScore {
    let edge_pts = clamp_points(edge / EDGE_SATURATION * EDGE_MAX_POINTS, EDGE_MAX_POINTS);
    let rlm_pts = if rlm_confirmed { RLM_POINTS } else { 0.0 };
    let eff_pts = clamp_points(efficiency_gap, EFFICIENCY_MAX_POINTS);
    let sit_pts = clamp_points(situational_score, SITUATIONAL_MAX_POINTS);

    SharpScore {
        total: edge_pts + rlm_pts + eff_pts + sit_pts,
        breakdown: SharpBreakdown {
            edge: edge_pts,
            rlm: rlm_pts,
            efficiency: eff_pts,
            situational: sit_pts,
        },
    }
}

fn clamp_points(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

/// Sizing label for a score. Below 75 there is no label.
pub fn sharp_to_size(score: f64) -> Option<SizeLabel> {
    if score >= NUCLEAR_SCORE {
        Some(SizeLabel::Nuclear)
    } else if score >= STANDARD_SCORE {
        Some(SizeLabel::Standard)
    } else if score >= LEAN_SCORE {
        Some(SizeLabel::Lean)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
