//! Inbound event model and normalization

pub mod model;
pub mod normalize;

pub use model::{CanonicalAlert, CheckResult, ClientInfo, RawEvent, Severity};
pub use normalize::normalize;
