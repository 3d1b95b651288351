//! Per-endpoint HTTP measurement middleware.
//!
//! Installed as a route layer so every endpoint carries its own name in the
//! `endpoint` label while `method` and `status` come from the live request
//! and response.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shopmetrics_core::{wrap_with, HttpEndpoint, SharedRegistry, Verdict};

/// Middleware state: where to record and under which endpoint name.
#[derive(Clone)]
pub struct Tracked {
    registry: SharedRegistry,
    endpoint: &'static str,
}

impl Tracked {
    pub fn new(registry: SharedRegistry, endpoint: &'static str) -> Self {
        Self { registry, endpoint }
    }
}

pub async fn track_http(State(tag): State<Tracked>, req: Request, next: Next) -> Response {
    let shape = HttpEndpoint::new(req.method().as_str(), tag.endpoint);
    tracing::debug!(endpoint = tag.endpoint, method = %req.method(), "tracking request");
    wrap_with(&tag.registry, shape, next.run(req), |res: &Response| {
        Verdict::Status(res.status().as_u16())
    })
    .await
}
