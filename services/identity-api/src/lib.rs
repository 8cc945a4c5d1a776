//! Warden Identity API
//!
//! Resource-server front for a token issuer: publishes discovery metadata
//! and the issuer's key set, and guards API routes with bearer tokens.
//!
//! ## Public Endpoints
//!
//! - `GET /.well-known/openid-configuration` - Discovery document
//! - `GET /.well-known/jwks.json` - Mounted key-set file
//!
//! ## Protected Endpoints
//!
//! - `GET /api/v1/me` - Any valid token
//! - `GET /api/v1/admin` - Requires `ADMIN_GROUP`
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use warden_axum::WardenLayer;

use crate::handlers::{admin, health, jwks, me, openid_configuration, ready};
use crate::state::AppState;

/// Build the HTTP router
pub fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();
    let verifier = state.verifier.clone();

    // API v1 routes, each group behind its own auth policy
    let api_v1 = Router::new()
        .route("/me", get(me))
        .route_layer(WardenLayer::new(verifier.clone()))
        .merge(
            Router::new()
                .route("/admin", get(admin))
                .route_layer(
                    WardenLayer::new(verifier).require_group(state.config.admin_group.clone()),
                ),
        );

    // Public key material and discovery (no auth)
    let well_known = Router::new()
        .route("/.well-known/openid-configuration", get(openid_configuration))
        .route("/.well-known/jwks.json", get(jwks));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        // Request ID propagation (outermost)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Tracing with request details
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Request timeout (innermost - closest to handler)
        .layer(TimeoutLayer::new(request_timeout));

    // Combine all routes
    Router::new()
        .nest("/api/v1", api_v1)
        .merge(well_known)
        .layer(middleware)
        .merge(health_routes) // Health routes without timeout
        .merge(metrics_route) // Metrics route without timeout
        .with_state(state)
}
