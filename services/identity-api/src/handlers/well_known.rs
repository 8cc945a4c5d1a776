//! Discovery and key-set endpoints

use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use warden_auth_core::{JwkSet, ACCEPTED_ALGORITHM};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Key sets change rarely; let clients and proxies cache them briefly
const JWKS_CACHE_CONTROL: &str = "public, max-age=300";

/// OpenID Provider metadata, limited to what resource servers use
#[derive(Debug, Serialize)]
pub struct DiscoveryDocument {
    pub issuer: String,
    pub jwks_uri: String,
    pub id_token_signing_alg_values_supported: Vec<&'static str>,
    pub response_types_supported: Vec<String>,
    pub subject_types_supported: Vec<&'static str>,
    pub claims_supported: Vec<String>,
}

/// GET /.well-known/openid-configuration
pub async fn openid_configuration(State(state): State<AppState>) -> Json<DiscoveryDocument> {
    let auth = state.verifier.config();

    Json(DiscoveryDocument {
        issuer: auth.issuer.clone(),
        jwks_uri: auth.jwks_url.clone(),
        id_token_signing_alg_values_supported: vec![ACCEPTED_ALGORITHM],
        response_types_supported: state.config.response_types.clone(),
        subject_types_supported: vec!["public"],
        claims_supported: vec![
            "iss".to_string(),
            "sub".to_string(),
            "exp".to_string(),
            "iat".to_string(),
            auth.groups_claim.clone(),
        ],
    })
}

/// GET /.well-known/jwks.json - serve the mounted key-set file as-is
pub async fn jwks(State(state): State<AppState>) -> ApiResult<Response> {
    let path = state.config.jwks_file.as_ref().ok_or(ApiError::NotFound)?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ApiError::KeySetUnavailable(format!("{}: {}", path.display(), e)))?;

    // Refuse to publish something clients cannot parse
    JwkSet::from_slice(&bytes)
        .map_err(|e| ApiError::KeySetUnavailable(format!("{}: {}", path.display(), e)))?;

    let mut response = bytes.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(JWKS_CACHE_CONTROL),
    );
    Ok(response)
}
