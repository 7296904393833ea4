//! End-to-end candidate assembly scenarios.

use std::sync::Arc;
use uuid::Uuid;

use sharp_edge::kill_switch::{NflFacts, SituationalFacts};
use sharp_edge::strategy::edge::EdgeRejection;
use sharp_edge::types::{KillVerdict, MarketSideId, MarketType, Sport};
use sharp_edge::{CandidateAssembler, DecisionRecord, EngineConfig, EventSnapshot};

use crate::fixtures::{init_logging, moneyline, quote, three_book_market};

fn assembler() -> CandidateAssembler {
    init_logging();
    CandidateAssembler::in_memory(EngineConfig::default())
}

#[test]
fn test_three_source_consensus_surfaces_value_side() {
    let engine = assembler();
    let event = EventSnapshot::new("ev1", Sport::Nba, three_book_market("ev1", 120));
    let (candidates, _) = engine.evaluate_event(&event);

    assert_eq!(candidates.len(), 1);
    let c = &candidates[0];
    assert_eq!(c.market_side, MarketSideId::new("ev1", MarketType::Moneyline, "Home"));
    assert_eq!(c.n_sources, 3);
    assert!((c.fair_probability - 0.4949).abs() < 1e-3, "fair {}", c.fair_probability);
    assert!((c.edge - 0.0404).abs() < 1e-3, "edge {}", c.edge);
    assert!(c.dispersion > 0.0);
    assert!(c.sharp_score > 0.0 && c.sharp_score <= 75.0);
    assert_eq!(c.size_label, None);
    assert!(!c.meets_sharp_threshold);

    let json = serde_json::to_value(c).unwrap();
    assert_eq!(json["kill_verdict"], "PASS");
    assert_eq!(json["market_side"]["market_type"], "h2h");
}

#[test]
fn test_single_source_produces_no_candidate() {
    let engine = assembler();
    let event = EventSnapshot::new("ev1", Sport::Nba, moneyline("ev1", "book_a", 130, -150));
    let (candidates, decisions) = engine.evaluate_event(&event);
    assert!(candidates.is_empty());
    assert!(decisions
        .iter()
        .all(|d| matches!(d, DecisionRecord::NoSignal { .. })));
}

#[test]
fn test_candidates_ranked_across_events() {
    let engine = assembler();
    let events = vec![
        EventSnapshot::new("ev3", Sport::Nba, three_book_market("ev3", 120)),
        EventSnapshot::new("ev1", Sport::Nba, three_book_market("ev1", 120)),
        EventSnapshot::new("ev2", Sport::Nba, three_book_market("ev2", 125)),
    ];
    let (candidates, _) = engine.evaluate_events(&events);

    let order: Vec<&str> = candidates.iter().map(|c| c.market_side.event_id.as_str()).collect();
    assert_eq!(order, vec!["ev2", "ev1", "ev3"]);
    assert!(candidates
        .windows(2)
        .all(|w| w[0].sharp_score >= w[1].sharp_score));
}

#[test]
fn test_nfl_wind_forces_the_under() {
    let engine = assembler();
    let total = |src: &str, label: &str, odds: i32| {
        quote("ev9", src, MarketType::Total, label, odds, Some(44.5), 0)
    };
    let quotes = vec![
        total("book_a", "Over", -110),
        total("book_a", "Under", -110),
        total("book_b", "Over", -110),
        total("book_b", "Under", -110),
        total("ex_1", "Over", 120),
        total("ex_2", "Under", 120),
    ];
    let mut event = EventSnapshot::new("ev9", Sport::Nfl, quotes);
    event.event_facts = Some(SituationalFacts::Nfl(NflFacts {
        backup_qb: false,
        wind_mph: 18.0,
    }));

    let (candidates, decisions) = engine.evaluate_event(&event);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].market_side.side_label, "Under");
    assert_eq!(candidates[0].kill_verdict, KillVerdict::Flag);
    assert!(decisions.iter().any(|d| matches!(
        d,
        DecisionRecord::Killed { market_side, .. } if market_side.side_label == "Over"
    )));
}

#[test]
fn test_soccer_three_way_uses_expanded_collar() {
    let three_way = |src: &str, label: &str, odds: i32| {
        quote("ev5", src, MarketType::ThreeWay, label, odds, None, 0)
    };
    let quotes = vec![
        three_way("book_a", "Home", -105),
        three_way("book_a", "Away", 290),
        three_way("book_a", "Draw", 250),
        three_way("book_b", "Home", -110),
        three_way("book_b", "Away", 300),
        three_way("book_b", "Draw", 240),
        three_way("exchange", "Draw", 340),
    ];

    let soccer = assembler();
    let (candidates, _) = soccer.evaluate_event(&EventSnapshot::new("ev5", Sport::Soccer, quotes.clone()));
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].market_side.side_label, "Draw");
    assert_eq!(candidates[0].best_price, 340);

    // The same prices under a standard collar never surface.
    let nba = assembler();
    let (candidates, decisions) = nba.evaluate_event(&EventSnapshot::new("ev5", Sport::Nba, quotes));
    assert!(candidates.is_empty());
    assert!(decisions.iter().any(|d| matches!(
        d,
        DecisionRecord::Rejected { reason: EdgeRejection::OutsideCollar { odds: 340 }, .. }
    )));
}

#[test]
fn test_config_file_overrides_edge_floor() {
    init_logging();
    let path = std::env::temp_dir().join(format!("sharp_edge_{}.toml", Uuid::new_v4()));
    std::fs::write(&path, "[sizing]\nmin_edge = 0.05\n").unwrap();
    let config = EngineConfig::load(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.sizing.min_edge, 0.05);
    assert_eq!(config.consensus.min_books, 2);

    let engine = CandidateAssembler::in_memory(config);
    let event = EventSnapshot::new("ev1", Sport::Nba, three_book_market("ev1", 120));
    let (candidates, decisions) = engine.evaluate_event(&event);
    assert!(candidates.is_empty());
    assert!(decisions.iter().any(|d| matches!(
        d,
        DecisionRecord::Rejected { reason: EdgeRejection::BelowMinEdge { .. }, .. }
    )));
}

#[test]
fn test_sports_evaluate_in_parallel() {
    let engine = Arc::new(assembler());
    let sports = [Sport::Nba, Sport::Nhl, Sport::Mlb, Sport::Ncaab];

    let results: Vec<usize> = std::thread::scope(|s| {
        let handles: Vec<_> = sports
            .iter()
            .enumerate()
            .map(|(i, &sport)| {
                let engine = Arc::clone(&engine);
                s.spawn(move || {
                    let id = format!("par{i}");
                    let event = EventSnapshot::new(&id, sport, three_book_market(&id, 120));
                    engine.evaluate_event(&event).0.len()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results, vec![1, 1, 1, 1]);
    assert_eq!(engine.rlm().open_price_count(), 8);
}

#[test]
fn test_surfaced_candidates_pair_into_parlays() {
    let engine = assembler();
    let mut nba = EventSnapshot::new("ev1", Sport::Nba, three_book_market("ev1", 130));
    nba.efficiency_gap = 20.0;
    let mut mlb = EventSnapshot::new("ev2", Sport::Mlb, three_book_market("ev2", 130));
    mlb.efficiency_gap = 20.0;
    let (candidates, _) = engine.evaluate_events(&[nba, mlb]);
    assert_eq!(candidates.len(), 2);
    assert!(candidates.iter().all(|c| c.sharp_score >= 40.0 && c.edge >= 0.04));
    assert_eq!(candidates[1].nemesis.adjustment, 0);

    let parlays = engine.build_parlays(&candidates);
    assert_eq!(parlays.len(), 1);
    let p = &parlays[0];
    assert!(!p.same_sport_discounted);
    assert!((p.payout - 2.3 * 2.3).abs() < 1e-12);
    assert!(p.ev > 0.25);
    assert!(p.kelly_units > 0.0 && p.kelly_units <= 0.5);
    assert!(p.to_string().contains("ev1/h2h/Home @ +130"));
}
