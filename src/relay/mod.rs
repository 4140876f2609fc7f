//! Dispatch pipeline and relay counters

pub mod dispatcher;
pub mod stats;

pub use dispatcher::{DispatchError, DispatchOutcome, Dispatcher};
pub use stats::{RelayStats, StatsSnapshot};
