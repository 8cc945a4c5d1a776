//! Protected account routes

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use warden_axum::RequireAuth;

use crate::state::AppState;

/// Caller identity as seen by this service
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub sub: String,
    pub iss: String,
    pub expires_at: DateTime<Utc>,
    pub groups: Vec<String>,
}

impl From<&RequireAuth> for MeResponse {
    fn from(auth: &RequireAuth) -> Self {
        Self {
            sub: auth.subject.clone(),
            iss: auth.issuer.clone(),
            expires_at: auth.expires_at,
            groups: auth
                .groups
                .as_ref()
                .map(|groups| groups.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub sub: String,
    pub group: String,
}

/// GET /api/v1/me - any valid token
pub async fn me(auth: RequireAuth) -> Json<MeResponse> {
    Json(MeResponse::from(&auth))
}

/// GET /api/v1/admin - the layer has already checked the admin group
pub async fn admin(State(state): State<AppState>, auth: RequireAuth) -> Json<AdminResponse> {
    tracing::info!(sub = %auth.subject, "Admin route accessed");

    Json(AdminResponse {
        sub: auth.subject.clone(),
        group: state.config.admin_group.clone(),
    })
}
