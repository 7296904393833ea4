//! Shared fixtures for integration testing.
//!
//! Deterministic quote builders, a logging hook and a durable-looking
//! open-price store that lives outside the crate, all in-memory.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Once};

use sharp_edge::rlm::OpenPriceStore;
use sharp_edge::types::{MarketSideId, MarketType, OpenPriceRecord, Quote};

static LOGGING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
/// `RUST_LOG=sharp_edge=debug` shows every decision.
pub fn init_logging() {
    LOGGING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("sharp_edge=warn"));
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
}

/// Fixed reference time so snapshots compare exactly.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 2, 17, 0, 0).unwrap()
}

pub fn quote(
    event_id: &str,
    source: &str,
    market_type: MarketType,
    label: &str,
    odds: i32,
    point: Option<f64>,
    minutes: i64,
) -> Quote {
    Quote {
        source_id: source.to_string(),
        market_side: MarketSideId::new(event_id, market_type, label),
        american_odds: odds,
        point,
        observed_at: t0() + Duration::minutes(minutes),
    }
}

/// Complete two-way moneyline from one book.
pub fn moneyline(event_id: &str, source: &str, home: i32, away: i32) -> Vec<Quote> {
    vec![
        quote(event_id, source, MarketType::Moneyline, "Home", home, None, 0),
        quote(event_id, source, MarketType::Moneyline, "Away", away, None, 0),
    ]
}

/// Three books around even money plus a one-sided source offering Home
/// at `home_price`.
pub fn three_book_market(event_id: &str, home_price: i32) -> Vec<Quote> {
    let mut quotes = moneyline(event_id, "book_a", -110, -110);
    quotes.extend(moneyline(event_id, "book_b", -108, -112));
    quotes.extend(moneyline(event_id, "book_c", -105, -115));
    quotes.push(quote(event_id, "exchange", MarketType::Moneyline, "Home", home_price, None, 0));
    quotes
}

/// Open-price store standing in for a caller's durable row store.
///
/// Counts write attempts so tests can assert insert-only behaviour.
#[derive(Default, Clone)]
pub struct SharedStore {
    records: Arc<Mutex<BTreeMap<MarketSideId, OpenPriceRecord>>>,
    writes: Arc<Mutex<usize>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_attempts(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl OpenPriceStore for SharedStore {
    fn get(&self, key: &MarketSideId) -> Option<OpenPriceRecord> {
        self.records.lock().unwrap().get(key).cloned()
    }

    fn insert_if_absent(&self, record: OpenPriceRecord) -> bool {
        *self.writes.lock().unwrap() += 1;
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.market_side) {
            return false;
        }
        records.insert(record.market_side.clone(), record);
        true
    }

    fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn snapshot(&self) -> Vec<OpenPriceRecord> {
        self.records.lock().unwrap().values().cloned().collect()
    }

    fn clear(&self) {
        self.records.lock().unwrap().clear();
    }
}
