//! Bridge configuration
//!
//! All settings are optional and defaulted. Configuration is assembled once
//! at startup (defaults, then an optional JSON settings file, then
//! environment overrides), validated, and from then on shared immutably
//! behind an `Arc`; components never consult a global.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Address of one sentinel endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentinelAddr {
    pub host: String,
    pub port: u16,
}

/// Process-wide relay settings, immutable after startup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Queue host for direct addressing
    pub host: String,
    /// Queue port for direct addressing
    pub port: u16,
    /// Queue database index
    pub db: i64,
    /// List the primary payload is pushed to
    pub channel: String,
    /// Downstream schema version; 2 selects the new schema, anything else
    /// behaves as version 1
    pub flapjack_version: u32,
    /// Global relay gate; false suppresses every event
    pub enabled: bool,
    /// Default initial failure delay, overridden per check
    pub initial_failure_delay: u32,
    /// Default repeat failure delay, overridden per check
    pub repeat_failure_delay: u32,
    /// Sentinel master name; together with `sentinels` enables master
    /// discovery instead of direct addressing
    pub master: Option<String>,
    /// Ordered sentinel endpoints, tried first to last
    pub sentinels: Vec<SentinelAddr>,
    /// Re-establish the queue session after it is lost
    pub auto_reconnect: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
            channel: "events".to_string(),
            flapjack_version: 1,
            enabled: true,
            initial_failure_delay: 30,
            repeat_failure_delay: 60,
            master: None,
            sentinels: Vec::new(),
            auto_reconnect: true,
        }
    }
}

impl RelayConfig {
    /// Load configuration for the daemon: an optional JSON file named by
    /// `FLAPJACK_BRIDGE_CONFIG`, environment overrides on top, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("FLAPJACK_BRIDGE_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON settings file; every field is optional
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
    }

    /// Apply `FLAPJACK_BRIDGE_*` environment overrides. Malformed values
    /// fail fast rather than being silently ignored.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("FLAPJACK_BRIDGE_REDIS_HOST") {
            self.host = host;
        }
        if let Ok(raw) = std::env::var("FLAPJACK_BRIDGE_REDIS_PORT") {
            self.port = parse_env("FLAPJACK_BRIDGE_REDIS_PORT", &raw)?;
        }
        if let Ok(raw) = std::env::var("FLAPJACK_BRIDGE_REDIS_DB") {
            self.db = parse_env("FLAPJACK_BRIDGE_REDIS_DB", &raw)?;
        }
        if let Ok(channel) = std::env::var("FLAPJACK_BRIDGE_CHANNEL") {
            self.channel = channel;
        }
        if let Ok(raw) = std::env::var("FLAPJACK_BRIDGE_VERSION") {
            self.flapjack_version = parse_env("FLAPJACK_BRIDGE_VERSION", &raw)?;
        }
        if let Ok(raw) = std::env::var("FLAPJACK_BRIDGE_ENABLED") {
            self.enabled = match raw.as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "FLAPJACK_BRIDGE_ENABLED".to_string(),
                        value: raw,
                    })
                }
            };
        }
        Ok(())
    }

    /// Reject malformed settings; warns (without rejecting) on schema
    /// versions outside the recognized set, which fall back to version 1
    /// at encode time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "host".to_string(),
                value: self.host.clone(),
            });
        }
        if self.channel.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "channel".to_string(),
                value: self.channel.clone(),
            });
        }
        if self.db < 0 {
            return Err(ConfigError::InvalidValue {
                key: "db".to_string(),
                value: self.db.to_string(),
            });
        }
        if self.master.is_some() != !self.sentinels.is_empty() {
            return Err(ConfigError::PartialSentinelTopology);
        }
        for sentinel in &self.sentinels {
            if sentinel.host.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "sentinels.host".to_string(),
                    value: sentinel.host.clone(),
                });
            }
        }
        if self.flapjack_version != 1 && self.flapjack_version != 2 {
            tracing::warn!(
                version = self.flapjack_version,
                "Unrecognized flapjack_version, payloads will use the version 1 schema"
            );
        }
        Ok(())
    }

    /// True when the queue master is located through sentinels
    pub fn uses_sentinel(&self) -> bool {
        self.master.is_some()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// Startup configuration failures; all of these are fatal
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(String),

    #[error("Invalid config file: {0}")]
    Parse(String),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Sentinel topology requires both 'master' and a non-empty 'sentinels' list")]
    PartialSentinelTopology,
}
