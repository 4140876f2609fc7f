//! Monitoring event data model
//!
//! `RawEvent` is the inbound shape produced by the monitoring server: a
//! client record paired with one check result. `CanonicalAlert` is the
//! normalized record the downstream processor consumes.

use serde::{Deserialize, Serialize};

/// Client (host) half of an inbound event
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    /// Host identity; becomes the alert entity
    pub name: String,
    /// Network address, echoed into the alert details
    pub address: String,
    /// Host-level tags
    pub tags: Option<Vec<String>>,
    /// Subscription channels the host participates in
    #[serde(default)]
    pub subscriptions: Vec<String>,
    /// Deployment environment label
    pub environment: Option<String>,
    /// Whitespace-separated role list
    pub roles: Option<String>,
}

/// Check half of an inbound event
#[derive(Debug, Clone, Deserialize)]
pub struct CheckResult {
    /// Check identity; becomes the alert check name
    pub name: String,
    /// Numeric check status, mapped onto a severity
    pub status: i64,
    /// Check output, possibly carrying trailing perfdata
    pub output: String,
    /// Output dialect; "nagios" enables perfdata splitting
    pub output_type: Option<String>,
    /// Check-level tags
    pub tags: Option<Vec<String>>,
    /// Subscribers this check is restricted to
    pub subscribers: Option<Vec<String>>,
    /// Pre-built human summary; overrides the check output when present
    pub notification: Option<String>,
    /// Execution time, seconds since the epoch
    pub executed: i64,
    /// Per-check relay gate
    pub flapjack_enabled: Option<bool>,
    /// Per-check initial failure delay override
    pub initial_failure_delay: Option<u32>,
    /// Per-check repeat failure delay override
    pub repeat_failure_delay: Option<u32>,
}

/// One inbound monitoring event
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub client: ClientInfo,
    pub check: CheckResult,
}

/// Alert severity derived from the numeric check status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Severity {
    /// Map a numeric check status; anything outside the known range is
    /// reported as unknown rather than rejected
    pub fn from_status(status: i64) -> Self {
        match status {
            0 => Severity::Ok,
            1 => Severity::Warning,
            2 => Severity::Critical,
            _ => Severity::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "ok",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
            Severity::Unknown => "unknown",
        }
    }
}

/// Normalized alert record pushed onto the downstream queue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalAlert {
    /// Entity the alert concerns (the client name)
    pub entity: String,
    /// Check name within the entity
    pub check: String,
    /// Record type; always "service"
    #[serde(rename = "type")]
    pub kind: String,
    pub state: Severity,
    pub summary: String,
    pub details: String,
    /// Check execution time, seconds since the epoch
    pub time: i64,
    /// Routing tags in derivation order
    pub tags: Vec<String>,
    /// Trailing nagios perfdata, when the output carried any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perfdata: Option<String>,
    pub initial_failure_delay: u32,
    pub repeat_failure_delay: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_from_status() {
        assert_eq!(Severity::from_status(0), Severity::Ok);
        assert_eq!(Severity::from_status(1), Severity::Warning);
        assert_eq!(Severity::from_status(2), Severity::Critical);
        assert_eq!(Severity::from_status(3), Severity::Unknown);
        assert_eq!(Severity::from_status(-1), Severity::Unknown);
        assert_eq!(Severity::from_status(255), Severity::Unknown);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Severity::Critical).unwrap(),
            "\"critical\""
        );
        assert_eq!(Severity::Warning.as_str(), "warning");
    }

    #[test]
    fn test_raw_event_minimal_deserialization() {
        let raw = r#"{
            "client": {"name": "web01", "address": "10.0.0.5"},
            "check": {"name": "ping", "status": 0, "output": "PING OK", "executed": 1700000000}
        }"#;
        let event: RawEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.client.name, "web01");
        assert!(event.client.subscriptions.is_empty());
        assert_eq!(event.check.status, 0);
        assert!(event.check.flapjack_enabled.is_none());
    }

    #[test]
    fn test_alert_serialization_omits_absent_perfdata() {
        let alert = CanonicalAlert {
            entity: "web01".to_string(),
            check: "ping".to_string(),
            kind: "service".to_string(),
            state: Severity::Ok,
            summary: "PING OK".to_string(),
            details: "Address:10.0.0.5 Tags:".to_string(),
            time: 1700000000,
            tags: Vec::new(),
            perfdata: None,
            initial_failure_delay: 30,
            repeat_failure_delay: 60,
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&alert).unwrap()).unwrap();
        assert_eq!(json["type"], "service");
        assert_eq!(json["state"], "ok");
        assert!(json.get("perfdata").is_none());
    }
}
