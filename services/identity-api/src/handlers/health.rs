//! Health check handlers

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::time::Instant;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const SERVICE_NAME: &str = "identity-api";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub checks: ReadyChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadyChecks {
    pub key_set: CheckResult,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: &'static str,
    pub keys: u64,
    pub latency_ms: u64,
}

/// GET /health - Liveness probe (fast, no dependencies)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
    })
}

/// GET /ready - Readiness probe (signing keys cached or fetchable)
pub async fn ready(State(state): State<AppState>) -> ApiResult<Json<ReadyResponse>> {
    let start = Instant::now();
    let resolver = state.verifier.resolver();

    // Once any key is cached the verifier can serve traffic
    let mut keys = resolver.cached_key_count().await;
    if keys == 0 {
        let learned = resolver
            .prefetch()
            .await
            .map_err(|e| ApiError::NotReady(e.to_string()))?;
        keys = learned as u64;
    }
    let latency_ms = start.elapsed().as_millis() as u64;

    if keys == 0 {
        return Err(ApiError::NotReady("key set has no usable keys".into()));
    }

    Ok(Json(ReadyResponse {
        status: "ready",
        service: SERVICE_NAME,
        checks: ReadyChecks {
            key_set: CheckResult {
                status: "ok",
                keys,
                latency_ms,
            },
        },
    }))
}
