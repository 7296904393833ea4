//! Nemesis: the standard counter-thesis for a bet.
//!
//! Every sport keeps a short table of the usual ways a market goes wrong.
//! The most likely case that applies to the bet's market is attached to
//! the candidate for display. Nothing downstream reads it.

use crate::types::{MarketType, Nemesis, Sport};

/// Counter-theses at or above this likelihood cost their full adjustment.
const FULL_ADJUSTMENT: f64 = 0.30;
/// Between this and [`FULL_ADJUSTMENT`] they cost half.
const HALF_ADJUSTMENT: f64 = 0.20;
/// Above this a counter-thesis alone argues for passing.
const REMOVE_ABOVE: f64 = 0.40;

struct Case {
    counter: &'static str,
    probability: f64,
    adjustment: i32,
    /// Empty applies to every market.
    markets: &'static [MarketFamily],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarketFamily {
    Winner,
    Spread,
    Total,
}

impl From<MarketType> for MarketFamily {
    fn from(market_type: MarketType) -> Self {
        match market_type {
            MarketType::Moneyline | MarketType::ThreeWay => MarketFamily::Winner,
            MarketType::Spread => MarketFamily::Spread,
            MarketType::Total => MarketFamily::Total,
        }
    }
}

use MarketFamily::{Spread, Total, Winner};

const ANY: &[MarketFamily] = &[];

const NBA: &[Case] = &[
    Case {
        counter: "Line movement suggests sharp money on other side",
        probability: 0.30,
        adjustment: -15,
        markets: &[Spread, Winner],
    },
    Case {
        counter: "Team relies on 3PT shooting, opponent defends arc well",
        probability: 0.25,
        adjustment: -15,
        markets: &[Spread, Winner],
    },
    Case {
        counter: "Total variance high, pace mismatch creates unpredictable scoring",
        probability: 0.25,
        adjustment: -15,
        markets: &[Total],
    },
    Case {
        counter: "B2B fatigue not fully captured in ratings",
        probability: 0.20,
        adjustment: -10,
        markets: ANY,
    },
];

const NCAAB: &[Case] = &[
    Case {
        counter: "Road favorite in hostile environment, pressure on young team",
        probability: 0.30,
        adjustment: -15,
        markets: &[Spread, Winner],
    },
    Case {
        counter: "3PT variance could eliminate efficiency edge",
        probability: 0.25,
        adjustment: -15,
        markets: &[Spread, Winner, Total],
    },
    Case {
        counter: "Underdog at home often outperforms ratings",
        probability: 0.20,
        adjustment: -10,
        markets: &[Spread, Winner],
    },
    Case {
        counter: "Tempo mismatch makes total unreliable",
        probability: 0.25,
        adjustment: -15,
        markets: &[Total],
    },
];

const FOOTBALL: &[Case] = &[
    Case {
        counter: "Line through key number (3, 7, 10), extra caution",
        probability: 0.25,
        adjustment: -15,
        markets: &[Spread],
    },
    Case {
        counter: "Weather variance not fully modeled",
        probability: 0.25,
        adjustment: -15,
        markets: &[Total],
    },
    Case {
        counter: "Injury report could change within 24 hours",
        probability: 0.20,
        adjustment: -10,
        markets: ANY,
    },
];

const NHL: &[Case] = &[
    Case {
        counter: "Goalie variance is the dominant factor",
        probability: 0.30,
        adjustment: -15,
        markets: &[Winner, Spread],
    },
    Case {
        counter: "PDO regression, hot team due for correction",
        probability: 0.25,
        adjustment: -15,
        markets: &[Winner, Spread],
    },
    Case {
        counter: "Shot quality vs quantity mismatch clouds total",
        probability: 0.25,
        adjustment: -15,
        markets: &[Total],
    },
];

const SOCCER: &[Case] = &[
    Case {
        counter: "High draw probability (~28%) not fully priced in",
        probability: 0.25,
        adjustment: -15,
        markets: &[Winner],
    },
    Case {
        counter: "Must-attack team vulnerable on counter",
        probability: 0.30,
        adjustment: -15,
        markets: &[Spread, Winner],
    },
    Case {
        counter: "Low xG variance inflates total uncertainty",
        probability: 0.25,
        adjustment: -10,
        markets: &[Total],
    },
];

fn cases_for(sport: Sport) -> &'static [Case] {
    match sport {
        Sport::Nba => NBA,
        Sport::Ncaab => NCAAB,
        Sport::Nfl | Sport::Ncaaf => FOOTBALL,
        Sport::Nhl => NHL,
        Sport::Soccer => SOCCER,
        Sport::Mlb | Sport::Tennis => &[],
    }
}

/// Most likely counter-thesis for `market_type` in `sport`. Ties go to
/// the case listed first.
pub fn run_nemesis(sport: Sport, market_type: MarketType) -> Nemesis {
    let family = MarketFamily::from(market_type);
    let best = cases_for(sport)
        .iter()
        .filter(|c| c.markets.is_empty() || c.markets.contains(&family))
        .fold(None::<&Case>, |best, c| match best {
            Some(b) if b.probability >= c.probability => Some(b),
            _ => Some(c),
        });

    let Some(case) = best else {
        return Nemesis {
            counter: "No standard nemesis for this sport".to_string(),
            probability: 0.10,
            adjustment: 0,
            remove: false,
        };
    };

    let adjustment = if case.probability >= FULL_ADJUSTMENT {
        case.adjustment
    } else if case.probability >= HALF_ADJUSTMENT {
        case.adjustment.div_euclid(2)
    } else {
        0
    };
    Nemesis {
        counter: case.counter.to_string(),
        probability: case.probability,
        adjustment,
        remove: case.probability > REMOVE_ABOVE,
    }
}
