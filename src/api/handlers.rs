//! Request handlers for the API endpoints.
//!
//! Each handler takes one snapshot `Arc` and serializes its response before
//! returning, so borrowed views into the snapshot never outlive it.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::warn;

use crate::error::StationError;
use crate::station::StationSnapshot;
use crate::station::types::StringSummary;

use super::AppState;
use super::types::{
    ApiResponse, ErrorResponse, InverterQuery, ModuleQuery, RegenerateQuery, RegenerateSummary,
    SensorQuery,
};

fn ok<T: Serialize>(snapshot: &StationSnapshot, data: T) -> Response {
    Json(ApiResponse::new(snapshot.generation(), data)).into_response()
}

fn error(err: &StationError) -> Response {
    let status = match err {
        StationError::ZoneNotFound(_)
        | StationError::InverterNotFound(_)
        | StationError::StringNotFound(_) => StatusCode::NOT_FOUND,
        StationError::InvalidConfig(_) | StationError::EmptyZone { .. } => {
            StatusCode::BAD_REQUEST
        }
        StationError::Inconsistent(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse::new(err.to_string()))).into_response()
}

/// `GET /api/monitoring/station` → 200 + KPIs, trend, and zone map
pub async fn get_station(State(state): State<Arc<AppState>>) -> Response {
    let snap = state.store.snapshot();
    ok(&snap, snap.overview())
}

/// Returns inverters, optionally only those of one zone.
///
/// `GET /api/monitoring/inverter` → 200 + every inverter
/// `GET /api/monitoring/inverter?zone=Z-02` → inverters of Z-02
/// `GET /api/monitoring/inverter?zone=Z-99` → 404 + `ErrorResponse`
pub async fn get_inverters(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InverterQuery>,
) -> Response {
    let snap = state.store.snapshot();
    match query.zone.as_deref() {
        Some(zone) => match snap.inverters_in_zone(zone) {
            Ok(inverters) => ok(&snap, inverters),
            Err(e) => error(&e),
        },
        None => ok(&snap, snap.inverters()),
    }
}

/// Returns strings with their panels, filtered by zone, inverter, and status.
///
/// `GET /api/monitoring/module?zone=Z-01&status=fault` → faulted strings of Z-01
/// Unknown zone or inverter → 404 + `ErrorResponse`
pub async fn get_modules(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModuleQuery>,
) -> Response {
    let snap = state.store.snapshot();

    let mut strings: Vec<&StringSummary> = match query.inverter.as_deref() {
        Some(inverter) => match snap.strings_for_inverter(inverter) {
            Ok(strings) => strings,
            Err(e) => return error(&e),
        },
        None => snap.strings().iter().collect(),
    };
    if let Some(zone) = query.zone.as_deref() {
        if let Err(e) = snap.zone(zone) {
            return error(&e);
        }
        strings.retain(|s| s.zone_id == zone);
    }
    if let Some(status) = query.status {
        strings.retain(|s| s.status == status);
    }

    ok(&snap, strings)
}

/// `GET /api/monitoring/field` → 200 + one summary per zone
pub async fn get_fields(State(state): State<Arc<AppState>>) -> Response {
    let snap = state.store.snapshot();
    ok(&snap, snap.zones())
}

/// `GET /api/monitoring/sensor?level=String/DC&status=fault` → matching sensors
pub async fn get_sensors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SensorQuery>,
) -> Response {
    let snap = state.store.snapshot();
    let sensors: Vec<_> = snap
        .sensors()
        .iter()
        .filter(|s| query.level.is_none_or(|level| s.level == level))
        .filter(|s| query.status.is_none_or(|status| s.status == status))
        .collect();
    ok(&snap, sensors)
}

/// `POST /api/monitoring/regenerate[?seed=N]` → 200 + new seed and totals
///
/// Generation is CPU-bound and runs on the blocking pool.
pub async fn regenerate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RegenerateQuery>,
) -> Response {
    let seed = query.seed;
    let result = tokio::task::spawn_blocking(move || state.store.regenerate(seed)).await;
    let result = match result {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "regeneration task failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(format!("regeneration task failed: {e}"))),
            )
                .into_response();
        }
    };
    match result {
        Ok(snap) => ok(
            &snap,
            RegenerateSummary {
                seed: snap.seed(),
                panel_count: snap.panels().count(),
                total_power_kw: snap.total_power_kw(),
            },
        ),
        Err(e) => {
            warn!(error = %e, "regeneration failed");
            error(&e)
        }
    }
}
