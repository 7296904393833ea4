//! Open-price storage.
//!
//! The tracker only ever asks a store to insert a record if its key is
//! absent, so every implementation is write-once per market side.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::types::{MarketSideId, OpenPriceRecord};

/// Insert-only map of market side → first observed price.
#[cfg_attr(test, mockall::automock)]
pub trait OpenPriceStore: Send + Sync {
    fn get(&self, key: &MarketSideId) -> Option<OpenPriceRecord>;

    /// Store `record` unless its key already exists. Returns whether it was
    /// inserted. Existing records are never replaced.
    fn insert_if_absent(&self, record: OpenPriceRecord) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every stored record, in market side order.
    fn snapshot(&self) -> Vec<OpenPriceRecord>;

    fn clear(&self);
}

/// Process-local store guarded by a single `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryOpenPriceStore {
    records: RwLock<HashMap<MarketSideId, OpenPriceRecord>>,
}

impl InMemoryOpenPriceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OpenPriceStore for InMemoryOpenPriceStore {
    fn get(&self, key: &MarketSideId) -> Option<OpenPriceRecord> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.get(key).cloned()
    }

    fn insert_if_absent(&self, record: OpenPriceRecord) -> bool {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        if records.contains_key(&record.market_side) {
            return false;
        }
        records.insert(record.market_side.clone(), record);
        true
    }

    fn len(&self) -> usize {
        self.records.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn snapshot(&self) -> Vec<OpenPriceRecord> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        let mut out: Vec<OpenPriceRecord> = records.values().cloned().collect();
        out.sort_by(|a, b| a.market_side.cmp(&b.market_side));
        out
    }

    fn clear(&self) {
        self.records.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}
