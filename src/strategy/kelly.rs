//! Kelly criterion stake sizing.
//!
//! Fractional Kelly in units, clamped by a cap that depends on the win
//! probability tier.

use tracing::debug;

use crate::probability::decimal_odds;
use crate::types::Result;

/// Unit caps by win-probability tier: `(exclusive lower bound, cap)`,
/// checked top-down. Anything at or below the last bound gets [`BASE_CAP`].
pub const TIER_CAPS: &[(f64, f64)] = &[(0.60, 2.0), (0.54, 1.0)];
pub const BASE_CAP: f64 = 0.5;

/// The unit cap for a given win probability.
pub fn tier_cap(win_probability: f64) -> f64 {
    TIER_CAPS
        .iter()
        .find(|(bound, _)| win_probability > *bound)
        .map(|(_, cap)| *cap)
        .unwrap_or(BASE_CAP)
}

pub struct KellyCalculator {
    fraction: f64,
}

impl KellyCalculator {
    pub fn new(fraction: f64) -> Self {
        Self { fraction }
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Fractional Kelly stake in units.
    ///
    /// Kelly formula: f* = (b·p − q) / b
    /// where:
    ///   b = net decimal odds (profit per unit staked)
    ///   p = win probability
    ///   q = 1 − p
    ///
    /// Negative Kelly means no bet, so the result is never below zero.
    pub fn fractional_kelly(&self, win_probability: f64, odds: i32) -> Result<f64> {
        let b = decimal_odds(odds)? - 1.0;
        if b <= 0.0 {
            return Ok(0.0);
        }
        let p = win_probability;
        let q = 1.0 - p;
        let full = (b * p - q) / b;
        let cap = tier_cap(p);
        let units = (full * self.fraction).clamp(0.0, cap);

        debug!(
            odds,
            win_prob = %format!("{:.1}%", p * 100.0),
            full_kelly = %format!("{:.2}%", full * 100.0),
            units = %format!("{units:.3}"),
            cap,
            "Kelly sized"
        );
        Ok(units)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
