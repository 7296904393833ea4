//! Probability model.
//!
//! Converts American odds into implied probabilities and removes the
//! bookmaker margin (vig) across two- and three-way markets. Everything
//! here is a pure function of its arguments.

use crate::types::{EngineError, Result};

/// Convert American odds to raw (vig-inclusive) implied probability.
///
/// Favourite (negative): `|odds| / (|odds| + 100)`.
/// Underdog (non-negative): `100 / (odds + 100)`.
pub fn implied_probability(american_odds: i32) -> Result<f64> {
    if american_odds == 0 {
        return Err(EngineError::InvalidOdds("0".into()));
    }
    let odds = f64::from(american_odds);
    let p = if american_odds < 0 {
        -odds / (-odds + 100.0)
    } else {
        100.0 / (odds + 100.0)
    };
    Ok(p)
}

/// Remove vig from a two-outcome market.
///
/// Each raw probability is divided by the overround so the pair sums to 1.
pub fn no_vig_probability(odds_a: i32, odds_b: i32) -> Result<(f64, f64)> {
    let raw = normalise(&[implied_probability(odds_a)?, implied_probability(odds_b)?])?;
    Ok((raw[0], raw[1]))
}

/// Remove vig from a three-outcome market (home / away / draw).
pub fn no_vig_probability_3way(odds_a: i32, odds_b: i32, odds_c: i32) -> Result<(f64, f64, f64)> {
    let raw = normalise(&[
        implied_probability(odds_a)?,
        implied_probability(odds_b)?,
        implied_probability(odds_c)?,
    ])?;
    Ok((raw[0], raw[1], raw[2]))
}

/// De-vig an arbitrary complete market; output order matches input order.
pub fn no_vig_probabilities(odds: &[i32]) -> Result<Vec<f64>> {
    let raw = odds
        .iter()
        .map(|&o| implied_probability(o))
        .collect::<Result<Vec<_>>>()?;
    normalise(&raw)
}

fn normalise(raw: &[f64]) -> Result<Vec<f64>> {
    if let Some(&zero) = raw.iter().find(|p| **p <= 0.0 || !p.is_finite()) {
        return Err(EngineError::InvalidProbability(zero));
    }
    let overround: f64 = raw.iter().sum();
    if overround <= 0.0 {
        return Err(EngineError::InvalidProbability(overround));
    }
    Ok(raw.iter().map(|p| p / overround).collect())
}

/// Decimal odds (stake included) for an American price.
pub fn decimal_odds(american_odds: i32) -> Result<f64> {
    if american_odds == 0 {
        return Err(EngineError::InvalidOdds("0".into()));
    }
    let odds = f64::from(american_odds);
    Ok(if american_odds > 0 {
        odds / 100.0 + 1.0
    } else {
        100.0 / -odds + 1.0
    })
}

/// Profit (excluding the returned stake) on a winning bet.
pub fn calculate_profit(stake: f64, american_odds: i32) -> Result<f64> {
    Ok(stake * (decimal_odds(american_odds)? - 1.0))
}

/// Parse American odds text such as `-110`, `+150` or `150`.
pub fn parse_american_odds(text: &str) -> Result<i32> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let odds: i32 = digits
        .parse()
        .map_err(|_| EngineError::InvalidOdds(trimmed.to_string()))?;
    if odds == 0 {
        return Err(EngineError::InvalidOdds(trimmed.to_string()));
    }
    Ok(odds)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_implied_probability_standard_prices() {
        assert!((implied_probability(-110).unwrap() - 0.523_809_523_8).abs() < 1e-9);
        assert!((implied_probability(110).unwrap() - 0.476_190_476_2).abs() < 1e-9);
        assert!((implied_probability(-180).unwrap() - 0.642_857_142_9).abs() < 1e-9);
        assert!((implied_probability(100).unwrap() - 0.5).abs() < EPS);
        assert!((implied_probability(-100).unwrap() - 0.5).abs() < EPS);
    }

    #[test]
    fn test_implied_probability_zero_is_invalid() {
        assert_eq!(
            implied_probability(0),
            Err(EngineError::InvalidOdds("0".into()))
        );
    }

    #[test]
    fn test_no_vig_symmetric_market_is_even() {
        let (a, b) = no_vig_probability(-110, -110).unwrap();
        assert!((a - 0.5).abs() < EPS);
        assert!((b - 0.5).abs() < EPS);
    }

    #[test]
    fn test_no_vig_pairs_sum_to_one() {
        let prices = [-250, -180, -135, -110, -101, 100, 105, 120, 150, 300, 900];
        for &a in &prices {
            for &b in &prices {
                let (pa, pb) = no_vig_probability(a, b).unwrap();
                assert!((pa + pb - 1.0).abs() < 1e-12, "({a}, {b}) sums to {}", pa + pb);
            }
        }
    }

    #[test]
    fn test_no_vig_favourite_keeps_higher_probability() {
        let (fav, dog) = no_vig_probability(-150, 130).unwrap();
        assert!(fav > dog);
        assert!(fav < implied_probability(-150).unwrap());
    }

    #[test]
    fn test_no_vig_rejects_zero_odds() {
        assert!(no_vig_probability(0, -110).is_err());
        assert!(no_vig_probability_3way(-110, 0, 250).is_err());
    }

    #[test]
    fn test_three_way_sums_to_one() {
        let (a, b, c) = no_vig_probability_3way(-105, 290, 250).unwrap();
        assert!((a + b + c - 1.0).abs() < 1e-12);
        assert!(a > b);
        assert!(c > b);
    }

    #[test]
    fn test_no_vig_probabilities_preserves_order() {
        let probs = no_vig_probabilities(&[290, -105, 250]).unwrap();
        let (a, b, c) = no_vig_probability_3way(290, -105, 250).unwrap();
        assert_eq!(probs, vec![a, b, c]);
    }

    #[test]
    fn test_profit() {
        assert!((calculate_profit(100.0, 110).unwrap() - 110.0).abs() < EPS);
        assert!((calculate_profit(100.0, -110).unwrap() - 90.909_090_909).abs() < 1e-6);
        assert!((calculate_profit(100.0, 100).unwrap() - 100.0).abs() < EPS);
    }

    #[test]
    fn test_parse_american_odds() {
        assert_eq!(parse_american_odds("-110"), Ok(-110));
        assert_eq!(parse_american_odds("+150"), Ok(150));
        assert_eq!(parse_american_odds(" 200 "), Ok(200));
        assert!(matches!(parse_american_odds("0"), Err(EngineError::InvalidOdds(_))));
        assert!(matches!(parse_american_odds("even"), Err(EngineError::InvalidOdds(_))));
        assert!(matches!(parse_american_odds(""), Err(EngineError::InvalidOdds(_))));
    }
}
