use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::event::RawEvent;
use crate::queue::{ConnectionState, EventSink};
use crate::relay::{DispatchError, DispatchOutcome, Dispatcher, RelayStats, StatsSnapshot};

/// Application state shared across handlers
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub sink: Arc<dyn EventSink>,
    pub stats: Arc<RelayStats>,
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub queue: ConnectionState,
    pub version: &'static str,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let queue = state.sink.connection_state();
    let status = match queue {
        ConnectionState::Connected => "healthy",
        _ => "degraded",
    };

    Json(HealthResponse {
        status,
        queue,
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Event Ingest
// ============================================================================

pub async fn relay_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<RawEvent>,
) -> Result<Json<DispatchOutcome>, ApiError> {
    let outcome = state
        .dispatcher
        .process(&event)
        .await
        .map_err(|e| match e {
            DispatchError::Delivery(_) => ApiError::Unavailable(e.to_string()),
            DispatchError::Encode(_) => ApiError::Internal(e.to_string()),
        })?;

    Ok(Json(outcome))
}

// ============================================================================
// Stats
// ============================================================================

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsSnapshot> {
    Json(state.stats.snapshot())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Unavailable(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Unavailable(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
