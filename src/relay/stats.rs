//! Relay throughput counters

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lock-free counters shared across dispatcher invocations
#[derive(Debug, Default)]
pub struct RelayStats {
    received: AtomicU64,
    relayed: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

impl RelayStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_relayed(&self) {
        self.relayed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time counter values
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            timestamp: Utc::now(),
            events_received: self.received.load(Ordering::Relaxed),
            events_relayed: self.relayed.load(Ordering::Relaxed),
            events_skipped: self.skipped.load(Ordering::Relaxed),
            delivery_failures: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Serializable view of the relay counters
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub events_received: u64,
    pub events_relayed: u64,
    pub events_skipped: u64,
    pub delivery_failures: u64,
}
