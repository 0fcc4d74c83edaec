//! API response envelopes and query parameters.
//!
//! Successful responses wrap their payload as `{success, generation, data}`;
//! `generation` identifies the snapshot the payload was read from, so a
//! client can tell when two responses straddle a regeneration.

use serde::{Deserialize, Serialize};

use crate::station::types::{SensorLevel, Status};

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    /// Snapshot generation the data was read from.
    pub generation: u64,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(generation: u64, data: T) -> Self {
        Self {
            success: true,
            generation,
            data,
        }
    }
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable error message.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// `GET /api/monitoring/inverter` filters.
#[derive(Debug, Default, Deserialize)]
pub struct InverterQuery {
    pub zone: Option<String>,
}

/// `GET /api/monitoring/module` filters; all optional and combined with AND.
#[derive(Debug, Default, Deserialize)]
pub struct ModuleQuery {
    pub zone: Option<String>,
    pub inverter: Option<String>,
    pub status: Option<Status>,
}

/// `GET /api/monitoring/sensor` filters.
#[derive(Debug, Default, Deserialize)]
pub struct SensorQuery {
    /// Level label, e.g. `String/DC`.
    pub level: Option<SensorLevel>,
    pub status: Option<Status>,
}

/// `POST /api/monitoring/regenerate` parameters.
#[derive(Debug, Default, Deserialize)]
pub struct RegenerateQuery {
    /// Seed to regenerate from; a fresh one is drawn when absent.
    pub seed: Option<u64>,
}

/// Summary returned after a regeneration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateSummary {
    pub seed: u64,
    pub panel_count: usize,
    pub total_power_kw: f64,
}
