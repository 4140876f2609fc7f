//! flapjack-bridge daemon
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - FLAPJACK_BRIDGE_HOST: Bind address (default: 0.0.0.0)
//! - FLAPJACK_BRIDGE_PORT: Port number (default: 3030)
//! - FLAPJACK_BRIDGE_CONFIG: Path to a JSON settings file (optional)
//! - FLAPJACK_BRIDGE_REDIS_HOST: Queue host (default: 127.0.0.1)
//! - FLAPJACK_BRIDGE_REDIS_PORT: Queue port (default: 6379)
//! - FLAPJACK_BRIDGE_REDIS_DB: Queue database index (default: 0)
//! - FLAPJACK_BRIDGE_CHANNEL: Event list name (default: events)
//! - FLAPJACK_BRIDGE_VERSION: Downstream schema version, 1 or 2 (default: 1)
//! - FLAPJACK_BRIDGE_ENABLED: Global relay gate (default: true)
//! - RUST_LOG: Log level (default: info)
//!
//! Sentinel master discovery is configured through the settings file
//! (`master` plus a `sentinels` list); without it the bridge addresses the
//! queue directly.

use flapjack_bridge::api::{run_server, ServerConfig};
use flapjack_bridge::config::RelayConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flapjack_bridge=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse server configuration from environment
    let host = std::env::var("FLAPJACK_BRIDGE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("FLAPJACK_BRIDGE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3030);
    let server_config = ServerConfig { host, port };

    // Relay settings: optional JSON file, then env overrides, validated once
    let relay_config = RelayConfig::from_env()?;

    tracing::info!("flapjack-bridge configuration:");
    tracing::info!("  Listen: {}:{}", server_config.host, server_config.port);
    tracing::info!("  Event list: {}", relay_config.channel);
    tracing::info!("  Schema version: {}", relay_config.flapjack_version);
    tracing::info!("  Relay enabled: {}", relay_config.enabled);
    if let Some(master) = &relay_config.master {
        tracing::info!("  Queue: sentinel master '{}'", master);
        for sentinel in &relay_config.sentinels {
            tracing::info!("    - {}:{}", sentinel.host, sentinel.port);
        }
    } else {
        tracing::info!(
            "  Queue: {}:{} db {}",
            relay_config.host,
            relay_config.port,
            relay_config.db
        );
    }
    tracing::info!("  Auto reconnect: {}", relay_config.auto_reconnect);

    println!(
        r#"
  __   _                  _               _
 / _| | |                (_)             | |
| |_  | |  __ _  _ __     _   __ _   ___ | | __
|  _| | | / _` || '_ \   | | / _` | / __|| |/ /
| |   | || (_| || |_) |  | || (_| || (__ |   <
|_|   |_| \__,_|| .__/   | | \__,_| \___||_|\_\
                | |     _/ |
                |_|    |__/

 Monitoring-to-Flapjack Event Relay (bridge)
 Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );

    run_server(server_config, relay_config).await
}
