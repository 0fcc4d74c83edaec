//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use pv_station_sim::StationConfig;
use pv_station_sim::api::{AppState, router};
use pv_station_sim::station::StationStore;

/// Build a seeded baseline store and return the API state.
fn build_api_state() -> Arc<AppState> {
    let mut config = StationConfig::baseline();
    config.generation.seed = Some(42);
    Arc::new(AppState {
        store: StationStore::new(config).unwrap(),
    })
}

async fn send(state: &Arc<AppState>, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let resp = router(Arc::clone(state)).oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn views_agree_on_power() {
    let state = build_api_state();
    let (_, field) = send(&state, "GET", "/api/monitoring/field").await;
    let (_, station) = send(&state, "GET", "/api/monitoring/station").await;
    let (_, modules) = send(&state, "GET", "/api/monitoring/module").await;

    let zone_sum: f64 = field["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|z| z["power"].as_f64().unwrap())
        .sum();
    let string_sum: f64 = modules["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["powerKw"].as_f64().unwrap())
        .sum();
    let kpi = station["data"]["kpi"]["power"]["value"].as_f64().unwrap();

    assert!((zone_sum - kpi).abs() < 0.001);
    assert!((string_sum - kpi).abs() < 0.001);
}

#[tokio::test]
async fn module_panels_carry_readings() {
    let state = build_api_state();
    let (status, json) = send(&state, "GET", "/api/monitoring/module?inverter=INV-01-01").await;
    assert_eq!(status, StatusCode::OK);

    let strings = json["data"].as_array().unwrap();
    assert!(!strings.is_empty());
    for s in strings {
        assert_eq!(s["inverterId"], "INV-01-01");
        let panel = &s["panels"][0];
        assert!(panel["v"].is_number());
        assert!(panel["c"].is_number());
        assert!(panel["key"].as_str().unwrap().starts_with(s["id"].as_str().unwrap()));
    }
}

#[tokio::test]
async fn sensor_security_level() {
    let state = build_api_state();
    let (status, json) = send(&state, "GET", "/api/monitoring/sensor?level=Security").await;
    assert_eq!(status, StatusCode::OK);
    let values: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s["value"].as_str())
        .collect();
    assert_eq!(values, vec!["CLEAR", "SECURE"]);
}

#[tokio::test]
async fn invalid_level_is_rejected() {
    let state = build_api_state();
    let req = Request::builder()
        .uri("/api/monitoring/sensor?level=Bogus")
        .body(Body::empty())
        .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn regenerate_with_seed_is_reproducible() {
    let state = build_api_state();
    let (_, before) = send(&state, "GET", "/api/monitoring/module").await;

    let (status, json) = send(&state, "POST", "/api/monitoring/regenerate?seed=42").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["generation"], 2);
    assert_eq!(json["data"]["seed"], 42);

    let (_, after) = send(&state, "GET", "/api/monitoring/module").await;
    assert_eq!(before["data"], after["data"]);
    assert_eq!(after["generation"], 2);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let state = build_api_state();
    let req = Request::builder()
        .uri("/api/monitoring/camera")
        .body(Body::empty())
        .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
