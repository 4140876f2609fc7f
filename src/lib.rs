//! flapjack-bridge: monitoring-to-Flapjack event relay
//!
//! A bridge that accepts raw monitoring check results, normalizes them into
//! canonical alert records, and pushes them onto the Redis list queue that a
//! Flapjack notification processor consumes.
//!
//! # Features
//!
//! - **Event Normalization**: nagios perfdata splitting, ordered tag
//!   derivation, severity mapping, per-check delay overrides
//! - **Schema Versions**: legacy (v1) and signal-augmented (v2) downstream
//!   payloads, selected by configuration
//! - **Queue Addressing**: direct host:port or sentinel master discovery
//! - **Connection Observability**: the queue session exposes a
//!   connected/reconnecting/disconnected state instead of callbacks
//! - **Gating**: a global relay switch plus a per-check opt-out
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use flapjack_bridge::config::RelayConfig;
//! use flapjack_bridge::event::RawEvent;
//! use flapjack_bridge::queue::MemorySink;
//! use flapjack_bridge::relay::Dispatcher;
//!
//! # async fn demo() {
//! let config = Arc::new(RelayConfig::default());
//! let sink = Arc::new(MemorySink::new());
//! let dispatcher = Dispatcher::new(config, sink);
//!
//! let event: RawEvent = serde_json::from_str(
//!     r#"{
//!         "client": {"name": "web01", "address": "10.0.0.5"},
//!         "check": {"name": "ping", "status": 0, "output": "PING OK", "executed": 1700000000}
//!     }"#,
//! )
//! .unwrap();
//!
//! let outcome = dispatcher.process(&event).await.unwrap();
//! println!("{}", outcome.message);
//! # }
//! ```

pub mod api;
pub mod config;
pub mod event;
pub mod protocol;
pub mod queue;
pub mod relay;

// Re-export commonly used types
pub use config::{ConfigError, RelayConfig};
pub use event::{normalize, CanonicalAlert, RawEvent, Severity};
pub use queue::{ConnectionState, EventSink, PushError, RedisSink};
pub use relay::{DispatchError, DispatchOutcome, Dispatcher};
