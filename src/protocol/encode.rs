//! Wire encoding for the downstream queue
//!
//! Two payload schemas exist downstream. Version 1 carries the perfdata
//! field; version 2 drops it and instead expects a one-character wake-up
//! marker on a second list so the processing worker picks the payload up
//! immediately. Unrecognized version numbers behave as version 1, which
//! keeps old configurations working against old processors.

use crate::event::CanonicalAlert;

/// List the version 2 wake-up marker is pushed to
pub const ACTIONS_LIST: &str = "events_actions";

/// The wake-up marker itself
pub const ACTIONS_SIGNAL: &str = "+";

/// A serialized alert plus the optional companion signal push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEvent {
    /// Serialized alert destined for the configured event list
    pub payload: String,
    /// Companion `(list, payload)` push, required by schema version 2
    pub signal: Option<(&'static str, String)>,
}

/// Serialize an alert for the given schema version
pub fn encode(alert: &CanonicalAlert, version: u32) -> Result<EncodedEvent, EncodeError> {
    match version {
        2 => {
            let stripped = CanonicalAlert {
                perfdata: None,
                ..alert.clone()
            };
            let payload = serde_json::to_string(&stripped)
                .map_err(|e| EncodeError::Serialize(e.to_string()))?;
            Ok(EncodedEvent {
                payload,
                signal: Some((ACTIONS_LIST, ACTIONS_SIGNAL.to_string())),
            })
        }
        _ => {
            let payload = serde_json::to_string(alert)
                .map_err(|e| EncodeError::Serialize(e.to_string()))?;
            Ok(EncodedEvent {
                payload,
                signal: None,
            })
        }
    }
}

/// Encoding failures
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Failed to serialize alert: {0}")]
    Serialize(String),
}
