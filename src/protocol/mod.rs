//! Downstream wire schema versions

pub mod encode;

pub use encode::{encode, EncodeError, EncodedEvent, ACTIONS_LIST, ACTIONS_SIGNAL};
