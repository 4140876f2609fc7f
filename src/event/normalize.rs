//! Event normalization
//!
//! Turns a raw monitoring event into a `CanonicalAlert`. Pure functions
//! only; everything here is testable without a queue or a network.

use std::collections::HashSet;

use crate::config::RelayConfig;
use crate::event::model::{CanonicalAlert, RawEvent, Severity};

/// Build the canonical alert for one inbound event
pub fn normalize(event: &RawEvent, config: &RelayConfig) -> CanonicalAlert {
    let (output_text, perfdata) =
        split_nagios_output(event.check.output_type.as_deref(), &event.check.output);
    let tags = derive_tags(event);

    let mut details = format!("Address:{} Tags:{}", event.client.address, tags.join(","));
    if event.check.notification.is_some() {
        // The raw output keeps any perfdata that the summary dropped
        details.push_str(&format!(" Raw Output: {}", event.check.output));
    }

    let summary = match &event.check.notification {
        Some(notification) => notification.clone(),
        None => output_text,
    };

    CanonicalAlert {
        entity: event.client.name.clone(),
        check: event.check.name.clone(),
        kind: "service".to_string(),
        state: Severity::from_status(event.check.status),
        summary,
        details,
        time: event.check.executed,
        tags,
        perfdata,
        initial_failure_delay: event
            .check
            .initial_failure_delay
            .unwrap_or(config.initial_failure_delay),
        repeat_failure_delay: event
            .check
            .repeat_failure_delay
            .unwrap_or(config.repeat_failure_delay),
    }
}

/// Split nagios-style output into text and trailing perfdata. Other output
/// dialects pass through untouched even when they contain a `|`.
pub fn split_nagios_output(output_type: Option<&str>, output: &str) -> (String, Option<String>) {
    if output_type != Some("nagios") {
        return (output.to_string(), None);
    }
    match output.split_once('|') {
        Some((text, perf)) => {
            let perf = perf.trim();
            let perfdata = if perf.is_empty() {
                None
            } else {
                Some(perf.to_string())
            };
            (text.trim().to_string(), perfdata)
        }
        None => (output.to_string(), None),
    }
}

/// Derive the ordered routing tag list: client tags, check tags,
/// environment, subscriptions (restricted to the check's subscribers when
/// the check names any), whitespace-split roles, deduplicated keeping the
/// first occurrence.
pub fn derive_tags(event: &RawEvent) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();

    if let Some(client_tags) = &event.client.tags {
        tags.extend(client_tags.iter().cloned());
    }
    if let Some(check_tags) = &event.check.tags {
        tags.extend(check_tags.iter().cloned());
    }
    if let Some(environment) = &event.client.environment {
        tags.push(environment.clone());
    }

    match &event.check.subscribers {
        Some(subscribers) if !subscribers.is_empty() => {
            tags.extend(
                event
                    .client
                    .subscriptions
                    .iter()
                    .filter(|s| subscribers.contains(*s))
                    .cloned(),
            );
        }
        _ => tags.extend(event.client.subscriptions.iter().cloned()),
    }

    if let Some(roles) = &event.client.roles {
        tags.extend(roles.split_whitespace().map(|r| r.to_string()));
    }

    let mut seen = HashSet::new();
    tags.retain(|tag| seen.insert(tag.clone()));
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::model::{CheckResult, ClientInfo};

    fn make_event() -> RawEvent {
        RawEvent {
            client: ClientInfo {
                name: "web01".to_string(),
                address: "10.0.0.5".to_string(),
                tags: None,
                subscriptions: Vec::new(),
                environment: None,
                roles: None,
            },
            check: CheckResult {
                name: "disk".to_string(),
                status: 0,
                output: "DISK OK".to_string(),
                output_type: None,
                tags: None,
                subscribers: None,
                notification: None,
                executed: 1700000000,
                flapjack_enabled: None,
                initial_failure_delay: None,
                repeat_failure_delay: None,
            },
        }
    }

    #[test]
    fn test_nagios_output_split() {
        let (text, perf) =
            split_nagios_output(Some("nagios"), "CRITICAL: disk full|/=95%;80;90");
        assert_eq!(text, "CRITICAL: disk full");
        assert_eq!(perf.as_deref(), Some("/=95%;80;90"));
    }

    #[test]
    fn test_nagios_split_keeps_later_pipes_in_perfdata() {
        let (text, perf) = split_nagios_output(Some("nagios"), "OK | a=1 | b=2");
        assert_eq!(text, "OK");
        assert_eq!(perf.as_deref(), Some("a=1 | b=2"));
    }

    #[test]
    fn test_non_nagios_output_untouched() {
        let (text, perf) = split_nagios_output(None, "value|with|pipes");
        assert_eq!(text, "value|with|pipes");
        assert!(perf.is_none());

        let (text, perf) = split_nagios_output(Some("graphite"), "value|with|pipes");
        assert_eq!(text, "value|with|pipes");
        assert!(perf.is_none());
    }

    #[test]
    fn test_nagios_output_without_pipe() {
        let (text, perf) = split_nagios_output(Some("nagios"), "PING OK");
        assert_eq!(text, "PING OK");
        assert!(perf.is_none());
    }

    #[test]
    fn test_nagios_empty_perfdata_dropped() {
        let (text, perf) = split_nagios_output(Some("nagios"), "OK |   ");
        assert_eq!(text, "OK");
        assert!(perf.is_none());
    }

    #[test]
    fn test_tag_derivation_order() {
        let mut event = make_event();
        event.client.tags = Some(vec!["a".to_string(), "b".to_string()]);
        event.check.tags = Some(vec!["b".to_string(), "c".to_string()]);
        event.client.environment = Some("prod".to_string());
        event.client.subscriptions = vec!["x".to_string(), "y".to_string()];
        event.client.roles = Some("r1 r2".to_string());

        let alert = normalize(&event, &RelayConfig::default());
        assert_eq!(alert.tags, vec!["a", "b", "c", "prod", "x", "y", "r1", "r2"]);
    }

    #[test]
    fn test_tags_deduplicated_first_occurrence_wins() {
        let mut event = make_event();
        event.client.tags = Some(vec!["prod".to_string(), "db".to_string()]);
        event.check.tags = Some(vec!["db".to_string(), "disk".to_string()]);
        event.client.environment = Some("prod".to_string());

        let tags = derive_tags(&event);
        assert_eq!(tags, vec!["prod", "db", "disk"]);
    }

    #[test]
    fn test_subscriber_intersection_preserves_subscription_order() {
        let mut event = make_event();
        event.client.subscriptions = vec![
            "mail".to_string(),
            "pager".to_string(),
            "chat".to_string(),
        ];
        event.check.subscribers = Some(vec!["chat".to_string(), "mail".to_string()]);

        let tags = derive_tags(&event);
        assert_eq!(tags, vec!["mail", "chat"]);
    }

    #[test]
    fn test_empty_subscriber_set_keeps_all_subscriptions() {
        let mut event = make_event();
        event.client.subscriptions = vec!["mail".to_string(), "pager".to_string()];
        event.check.subscribers = Some(Vec::new());

        let tags = derive_tags(&event);
        assert_eq!(tags, vec!["mail", "pager"]);
    }

    #[test]
    fn test_details_composition() {
        let mut event = make_event();
        event.client.tags = Some(vec!["a".to_string(), "b".to_string()]);

        let alert = normalize(&event, &RelayConfig::default());
        assert_eq!(alert.details, "Address:10.0.0.5 Tags:a,b");
    }

    #[test]
    fn test_notification_overrides_summary_and_extends_details() {
        let mut event = make_event();
        event.check.output = "CRITICAL: disk full|/=95%;80;90".to_string();
        event.check.output_type = Some("nagios".to_string());
        event.check.notification = Some("Disk almost full on web01".to_string());

        let alert = normalize(&event, &RelayConfig::default());
        assert_eq!(alert.summary, "Disk almost full on web01");
        // Raw output in the details keeps the perfdata the split removed
        assert_eq!(
            alert.details,
            "Address:10.0.0.5 Tags: Raw Output: CRITICAL: disk full|/=95%;80;90"
        );
        assert_eq!(alert.perfdata.as_deref(), Some("/=95%;80;90"));
    }

    #[test]
    fn test_summary_uses_split_text_without_notification() {
        let mut event = make_event();
        event.check.output = "CRITICAL: disk full|/=95%;80;90".to_string();
        event.check.output_type = Some("nagios".to_string());

        let alert = normalize(&event, &RelayConfig::default());
        assert_eq!(alert.summary, "CRITICAL: disk full");
    }

    #[test]
    fn test_severity_mapping() {
        let mut event = make_event();
        event.check.status = 2;
        assert_eq!(
            normalize(&event, &RelayConfig::default()).state,
            Severity::Critical
        );

        event.check.status = 42;
        assert_eq!(
            normalize(&event, &RelayConfig::default()).state,
            Severity::Unknown
        );
    }

    #[test]
    fn test_delay_overrides() {
        let config = RelayConfig::default();

        let event = make_event();
        let alert = normalize(&event, &config);
        assert_eq!(alert.initial_failure_delay, 30);
        assert_eq!(alert.repeat_failure_delay, 60);

        let mut event = make_event();
        event.check.initial_failure_delay = Some(999);
        let alert = normalize(&event, &config);
        assert_eq!(alert.initial_failure_delay, 999);
        assert_eq!(alert.repeat_failure_delay, 60);
    }

    #[test]
    fn test_entity_and_time_passthrough() {
        let alert = normalize(&make_event(), &RelayConfig::default());
        assert_eq!(alert.entity, "web01");
        assert_eq!(alert.check, "disk");
        assert_eq!(alert.kind, "service");
        assert_eq!(alert.time, 1700000000);
    }
}
