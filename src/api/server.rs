use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{health_check, relay_event, stats, AppState};
use crate::config::RelayConfig;
use crate::queue::{EventSink, RedisSink};
use crate::relay::Dispatcher;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3030,
        }
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Event ingest
        .route("/events", post(relay_event))
        // Health check
        .route("/health", get(health_check))
        // Stats
        .route("/stats", get(stats))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(
    config: ServerConfig,
    relay: RelayConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let relay = Arc::new(relay);

    // Initialize the queue sink and try to connect up front; a failure here
    // is not fatal, the sink retries on the first push
    let sink = Arc::new(RedisSink::from_config(&relay));
    match sink.connect().await {
        Ok(()) => tracing::info!("Queue connection established"),
        Err(e) => tracing::warn!(
            error = %e,
            "Initial queue connection failed, relaying starts degraded"
        ),
    }
    let sink: Arc<dyn EventSink> = sink;

    // Initialize app state
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&relay), Arc::clone(&sink)));
    let stats = dispatcher.stats();
    let state = Arc::new(AppState {
        dispatcher,
        sink,
        stats,
    });

    // Build router
    let app = build_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Starting flapjack-bridge server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("flapjack-bridge server stopped");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");

    tracing::info!("Shutdown signal received");
}
