//! Operational HTTP endpoints.
//!
//! - `/health`  : liveness
//! - `/ready`   : readiness (503 when draining)
//! - `/metrics` : Prometheus text format (path configurable)

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shopmetrics_core::exposition;

use crate::app_state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": state.cfg().gateway.service_name,
    }))
}

pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let service = &state.cfg().gateway.service_name;
    if state.is_draining() {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "draining", "service": service })),
        )
    } else {
        (
            StatusCode::OK,
            Json(json!({ "status": "ready", "service": service })),
        )
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.registry().render();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, exposition::CONTENT_TYPE)],
        body,
    )
        .into_response()
}
