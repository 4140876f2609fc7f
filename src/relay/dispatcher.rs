//! Event dispatch pipeline
//!
//! One `process` call takes a raw monitoring event through the whole
//! relay: gating, normalization, schema encoding, and the queue push.
//! Exactly one outcome is produced per event, and a half-built alert is
//! never pushed.

use std::sync::Arc;

use serde::Serialize;

use crate::config::RelayConfig;
use crate::event::{normalize, RawEvent};
use crate::protocol::{encode, EncodeError};
use crate::queue::{EventSink, PushError, QueueEntry};
use crate::relay::stats::RelayStats;

/// Result reported back for one processed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub message: String,
    pub status: u8,
}

impl DispatchOutcome {
    fn info(message: &str) -> Self {
        Self {
            message: message.to_string(),
            status: 0,
        }
    }
}

/// Relays raw monitoring events onto the downstream queue
pub struct Dispatcher {
    config: Arc<RelayConfig>,
    sink: Arc<dyn EventSink>,
    stats: Arc<RelayStats>,
}

impl Dispatcher {
    pub fn new(config: Arc<RelayConfig>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config,
            sink,
            stats: Arc::new(RelayStats::new()),
        }
    }

    /// Shared handle to the relay counters
    pub fn stats(&self) -> Arc<RelayStats> {
        Arc::clone(&self.stats)
    }

    /// Process one event end to end
    pub async fn process(&self, event: &RawEvent) -> Result<DispatchOutcome, DispatchError> {
        self.stats.record_received();

        if !self.config.enabled {
            self.stats.record_skipped();
            tracing::debug!(
                client = %event.client.name,
                check = %event.check.name,
                "Relay disabled, event skipped"
            );
            return Ok(DispatchOutcome::info("flapjack relay disabled"));
        }

        // Absent means enabled; only an explicit false opts a check out
        if event.check.flapjack_enabled == Some(false) {
            self.stats.record_skipped();
            tracing::debug!(
                client = %event.client.name,
                check = %event.check.name,
                "Check opted out of relaying"
            );
            return Ok(DispatchOutcome::info("flapjack disabled for this check"));
        }

        let alert = normalize(event, &self.config);
        let encoded = match encode(&alert, self.config.flapjack_version) {
            Ok(encoded) => encoded,
            Err(e) => {
                self.stats.record_failure();
                return Err(DispatchError::Encode(e));
            }
        };

        let mut entries = vec![QueueEntry::new(self.config.channel.as_str(), encoded.payload)];
        if let Some((list, payload)) = encoded.signal {
            entries.push(QueueEntry::new(list, payload));
        }

        if let Err(e) = self.sink.push_sequence(&entries).await {
            self.stats.record_failure();
            tracing::error!(
                client = %event.client.name,
                check = %event.check.name,
                error = %e,
                "Failed to deliver event to queue"
            );
            return Err(DispatchError::Delivery(e));
        }

        self.stats.record_relayed();
        tracing::debug!(
            client = %event.client.name,
            check = %event.check.name,
            state = %alert.state.as_str(),
            "Event relayed"
        );
        Ok(DispatchOutcome::info("event forwarded to flapjack"))
    }
}

/// Failures while processing one event
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Encoding failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] PushError),
}
