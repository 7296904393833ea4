//! Open-price continuity across process restarts.
//!
//! A "process" here is one `CandidateAssembler`. The engine never writes
//! to disk itself; these tests play the collaborator that snapshots the
//! open-price cache, persists it and seeds the next process from it.

use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use sharp_edge::rlm::OpenPriceStore;
use sharp_edge::types::{MarketSideId, MarketType, OpenPriceRecord, Sport};
use sharp_edge::{CandidateAssembler, EngineConfig, EventSnapshot};

use crate::fixtures::{init_logging, three_book_market, SharedStore};

fn home() -> MarketSideId {
    MarketSideId::new("ev1", MarketType::Moneyline, "Home")
}

fn temp_path() -> PathBuf {
    std::env::temp_dir().join(format!("sharp_edge_opens_{}.json", Uuid::new_v4()))
}

fn persist(records: &[OpenPriceRecord]) -> PathBuf {
    let path = temp_path();
    std::fs::write(&path, serde_json::to_string_pretty(records).unwrap()).unwrap();
    path
}

fn restore(path: &PathBuf) -> Vec<OpenPriceRecord> {
    let json = std::fs::read_to_string(path).unwrap();
    std::fs::remove_file(path).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn test_seeded_process_detects_rlm_from_first_cycle() {
    init_logging();

    // Process A sees Home open at +150.
    let first = CandidateAssembler::in_memory(EngineConfig::default());
    first.evaluate_event(&EventSnapshot::new("ev1", Sport::Nba, three_book_market("ev1", 150)));
    let path = persist(&first.rlm().snapshot());
    drop(first);

    // Process B restarts, seeds, and sees Home shortened to +120.
    let second = CandidateAssembler::in_memory(EngineConfig::default());
    let seeded = second.rlm().seed_open_prices(restore(&path));
    assert_eq!(seeded, 2);

    let (candidates, _) =
        second.evaluate_event(&EventSnapshot::new("ev1", Sport::Nba, three_book_market("ev1", 120)));
    assert_eq!(candidates.len(), 1);
    assert!(candidates[0].rlm_confirmed);
    assert!(candidates[0].rlm_drift >= 0.03);
    assert_eq!(second.rlm().fire_count(), 1);
    assert_eq!(
        second.rlm().open_price(&home()).map(|r| r.american_odds),
        Some(150)
    );
}

#[test]
fn test_cold_restart_misses_the_move() {
    init_logging();
    let cold = CandidateAssembler::in_memory(EngineConfig::default());
    let (candidates, _) =
        cold.evaluate_event(&EventSnapshot::new("ev1", Sport::Nba, three_book_market("ev1", 120)));
    assert_eq!(candidates.len(), 1);
    assert!(!candidates[0].rlm_confirmed);
    assert_eq!(candidates[0].rlm_drift, 0.0);
    assert_eq!(cold.rlm().fire_count(), 0);
}

#[test]
fn test_seeding_after_first_sight_never_overwrites() {
    init_logging();
    let first = CandidateAssembler::in_memory(EngineConfig::default());
    first.evaluate_event(&EventSnapshot::new("ev1", Sport::Nba, three_book_market("ev1", 150)));
    let path = persist(&first.rlm().snapshot());

    let second = CandidateAssembler::in_memory(EngineConfig::default());
    second.evaluate_event(&EventSnapshot::new("ev1", Sport::Nba, three_book_market("ev1", 120)));
    assert_eq!(second.rlm().seed_open_prices(restore(&path)), 0);
    assert_eq!(
        second.rlm().open_price(&home()).map(|r| r.american_odds),
        Some(120)
    );
}

#[test]
fn test_snapshot_round_trips_through_json() {
    init_logging();
    let engine = CandidateAssembler::in_memory(EngineConfig::default());
    engine.evaluate_event(&EventSnapshot::new("ev1", Sport::Nba, three_book_market("ev1", 120)));
    engine.evaluate_event(&EventSnapshot::new("ev2", Sport::Nhl, three_book_market("ev2", 110)));

    let snapshot = engine.rlm().snapshot();
    assert_eq!(snapshot.len(), 4);
    let path = persist(&snapshot);
    assert_eq!(restore(&path), snapshot);
}

#[test]
fn test_injected_store_is_shared_and_insert_only() {
    init_logging();
    let store = SharedStore::new();

    let a = CandidateAssembler::new(EngineConfig::default(), Arc::new(store.clone()));
    a.evaluate_event(&EventSnapshot::new("ev1", Sport::Nba, three_book_market("ev1", 150)));
    assert_eq!(store.len(), 2);

    let b = CandidateAssembler::new(EngineConfig::default(), Arc::new(store.clone()));
    let (candidates, _) =
        b.evaluate_event(&EventSnapshot::new("ev1", Sport::Nba, three_book_market("ev1", 120)));
    assert!(candidates[0].rlm_confirmed);

    // Every side of both cycles attempted a write; only the first landed.
    assert_eq!(store.write_attempts(), 4);
    assert_eq!(store.len(), 2);
    assert_eq!(b.rlm().snapshot(), a.rlm().snapshot());
}

#[test]
fn test_gate_status_serializes_for_display() {
    init_logging();
    let engine = CandidateAssembler::in_memory(EngineConfig::default());
    engine.rlm().seed_open_prices(vec![OpenPriceRecord {
        event_id: "ev1".into(),
        market_side: home(),
        american_odds: 150,
        first_seen_at: crate::fixtures::t0(),
    }]);
    engine.evaluate_event(&EventSnapshot::new("ev1", Sport::Nba, three_book_market("ev1", 120)));

    let status = serde_json::to_value(engine.rlm().rlm_gate_status()).unwrap();
    assert_eq!(status["fire_count"], 1);
    assert_eq!(status["gate"], 20);
    assert_eq!(status["pct_to_gate"], 0.05);
    assert_eq!(status["gate_reached"], false);
}
