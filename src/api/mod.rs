//! REST API over the current station snapshot.
//!
//! Routes, all under `/api/monitoring`:
//! - `GET /station`: KPIs, trend, and the zone map
//! - `GET /inverter[?zone=]`: flat inverter list
//! - `GET /module[?zone=&inverter=&status=]`: strings with their panels
//! - `GET /field`: one summary per zone
//! - `GET /sensor[?level=&status=]`: derived sensor list
//! - `POST /regenerate[?seed=]`: build and swap in a new snapshot

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::station::StationStore;

pub use types::{ApiResponse, ErrorResponse};

/// Application state shared across all request handlers.
///
/// Handlers clone the current snapshot `Arc` once per request, so every
/// response is read from a single generation.
pub struct AppState {
    pub store: StationStore,
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/monitoring/station", get(handlers::get_station))
        .route("/api/monitoring/inverter", get(handlers::get_inverters))
        .route("/api/monitoring/module", get(handlers::get_modules))
        .route("/api/monitoring/field", get(handlers::get_fields))
        .route("/api/monitoring/sensor", get(handlers::get_sensors))
        .route("/api/monitoring/regenerate", post(handlers::regenerate))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
