//! Queue sink abstraction
//!
//! The dispatcher pushes through the `EventSink` trait so the queue
//! backend can be swapped: `RedisSink` in the daemon, `MemorySink` in
//! tests. A sink accepts entry *sequences*; entries in one sequence land
//! on the queue contiguously, so a payload and its companion signal are
//! never separated by a concurrent push.

use async_trait::async_trait;
use serde::Serialize;

/// One list push: target list plus serialized payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub list: String,
    pub payload: String,
}

impl QueueEntry {
    pub fn new(list: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            list: list.into(),
            payload: payload.into(),
        }
    }
}

/// Observable connection lifecycle of a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// A session is established
    Connected,
    /// The session was lost; the next push re-establishes it
    Reconnecting,
    /// No session
    Disconnected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Disconnected => "disconnected",
        }
    }
}

/// Destination for normalized events
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Push every entry, in order, with no interleaving from concurrent
    /// callers. On failure the error names the list that failed; entries
    /// before it have been delivered, entries after it have not.
    async fn push_sequence(&self, entries: &[QueueEntry]) -> Result<(), PushError>;

    /// Push a single entry
    async fn push(&self, list: &str, payload: &str) -> Result<(), PushError> {
        self.push_sequence(&[QueueEntry::new(list, payload)]).await
    }

    /// Current connection lifecycle state
    fn connection_state(&self) -> ConnectionState {
        ConnectionState::Connected
    }
}

/// Delivery failures reported by a sink
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("Queue unavailable: {0}")]
    Unavailable(String),

    #[error("Push to list '{list}' failed: {reason}")]
    Transport { list: String, reason: String },
}

/// In-memory sink that records every entry, for tests
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: parking_lot::Mutex<Vec<QueueEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything pushed so far, in arrival order
    pub fn entries(&self) -> Vec<QueueEntry> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn push_sequence(&self, entries: &[QueueEntry]) -> Result<(), PushError> {
        // One lock acquisition keeps the sequence contiguous
        self.entries.lock().extend_from_slice(entries);
        Ok(())
    }
}
