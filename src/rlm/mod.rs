//! Reverse line movement (RLM) tracking.
//!
//! The tracker remembers the first price ever seen for each market side
//! (the "open") and compares later prices against it. When a side the
//! public is *not* backing becomes more expensive by at least the RLM
//! threshold, the book is moving against public money: sharp action.
//!
//! The open-price store is injected so a caller can seed it from durable
//! history at startup and export it again with [`RlmTracker::snapshot`].

pub mod store;

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::RlmConfig;
use crate::probability::implied_probability;
use crate::types::{MarketSideId, MarketType, OpenPriceRecord, Quote, Result};
pub use store::{InMemoryOpenPriceStore, OpenPriceStore};

/// Outcome of one RLM check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RlmSignal {
    pub confirmed: bool,
    /// Signed implied-probability move, `current − open`. Zero when no open
    /// price is known.
    pub drift: f64,
}

impl RlmSignal {
    pub const COLD: RlmSignal = RlmSignal {
        confirmed: false,
        drift: 0.0,
    };
}

/// Progress of the fire counter toward the threshold-review gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RlmGateStatus {
    pub fire_count: u64,
    pub gate: u64,
    /// `fire_count / gate`, capped at 1.
    pub pct_to_gate: f64,
    pub gate_reached: bool,
}

pub struct RlmTracker {
    config: RlmConfig,
    store: Arc<dyn OpenPriceStore>,
    fire_count: AtomicU64,
}

impl RlmTracker {
    pub fn new(config: RlmConfig, store: Arc<dyn OpenPriceStore>) -> Self {
        Self {
            config,
            store,
            fire_count: AtomicU64::new(0),
        }
    }

    /// Tracker backed by a fresh process-local store.
    pub fn in_memory(config: RlmConfig) -> Self {
        Self::new(config, Arc::new(InMemoryOpenPriceStore::new()))
    }

    pub fn config(&self) -> &RlmConfig {
        &self.config
    }

    // -- open prices ---------------------------------------------------------

    /// Record `quote` as the open for its side unless one already exists.
    pub fn record_open(&self, quote: &Quote) -> bool {
        if implied_probability(quote.american_odds).is_err() {
            return false;
        }
        let inserted = self.store.insert_if_absent(OpenPriceRecord::from_quote(quote));
        if inserted {
            debug!(
                market_side = %quote.market_side,
                odds = quote.american_odds,
                "Open price recorded"
            );
        }
        inserted
    }

    /// Bulk-load persisted open prices. Existing keys are left untouched.
    ///
    /// Returns the number of keys that were new.
    pub fn seed_open_prices<I>(&self, records: I) -> usize
    where
        I: IntoIterator<Item = OpenPriceRecord>,
    {
        let mut seeded = 0;
        let mut skipped = 0;
        for record in records {
            if implied_probability(record.american_odds).is_err() {
                warn!(
                    market_side = %record.market_side,
                    odds = record.american_odds,
                    "Skipping open price with invalid odds"
                );
                skipped += 1;
                continue;
            }
            if record.event_id != record.market_side.event_id {
                warn!(
                    market_side = %record.market_side,
                    event_id = %record.event_id,
                    "Skipping open price whose event id disagrees with its market side"
                );
                skipped += 1;
                continue;
            }
            if self.store.insert_if_absent(record) {
                seeded += 1;
            }
        }
        info!(seeded, skipped, cached = self.store.len(), "Open prices seeded");
        seeded
    }

    pub fn open_price(&self, key: &MarketSideId) -> Option<OpenPriceRecord> {
        self.store.get(key)
    }

    pub fn open_price_count(&self) -> usize {
        self.store.len()
    }

    /// Every open price currently held, for persistence by the caller.
    pub fn snapshot(&self) -> Vec<OpenPriceRecord> {
        self.store.snapshot()
    }

    /// Drop every open price. Administrative and test use only.
    pub fn clear(&self) {
        self.store.clear();
    }

    // -- detection -----------------------------------------------------------

    /// Whether public money is presumed to be on this side.
    ///
    /// The public backs favourites steeper than `public_side_price`, and on
    /// totals it backs the Over.
    pub fn is_public_side(&self, side: &MarketSideId, price: i32) -> bool {
        match side.market_type {
            MarketType::Total => side.side_label.eq_ignore_ascii_case("over"),
            _ => price < self.config.public_side_price,
        }
    }

    /// Compare `current_price` with the side's open price.
    ///
    /// Confirms when the side is not the public side and its implied
    /// probability rose by at least the threshold since the open. Each
    /// confirmation bumps the fire counter by one. A side with no open
    /// price is never confirmed and nothing is cached.
    pub fn compute_rlm(
        &self,
        side: &MarketSideId,
        current_price: i32,
        public_side: bool,
    ) -> Result<RlmSignal> {
        let current_prob = implied_probability(current_price)?;
        let Some(open) = self.store.get(side) else {
            return Ok(RlmSignal::COLD);
        };
        let open_prob = implied_probability(open.american_odds)?;
        let drift = current_prob - open_prob;

        let confirmed = !public_side && drift >= self.config.threshold;
        if confirmed {
            let fires = self.fire_count.fetch_add(1, Ordering::Relaxed) + 1;
            info!(
                market_side = %side,
                open = open.american_odds,
                current = current_price,
                drift = %format!("{:+.1}%", drift * 100.0),
                fires,
                "RLM confirmed"
            );
        }
        Ok(RlmSignal { confirmed, drift })
    }

    // -- fire counter --------------------------------------------------------

    pub fn fire_count(&self) -> u64 {
        self.fire_count.load(Ordering::Relaxed)
    }

    /// Zero the fire counter. Administrative and test use only.
    pub fn reset_fire_count(&self) {
        self.fire_count.store(0, Ordering::Relaxed);
    }

    /// Read-only progress toward the threshold-review gate.
    pub fn rlm_gate_status(&self) -> RlmGateStatus {
        let fire_count = self.fire_count();
        let gate = self.config.fire_gate;
        let pct_to_gate = if gate > 0 {
            (fire_count as f64 / gate as f64).min(1.0)
        } else {
            0.0
        };
        RlmGateStatus {
            fire_count,
            gate,
            pct_to_gate,
            gate_reached: fire_count >= gate,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
