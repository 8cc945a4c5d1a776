//! Axum extractors for authenticated requests.
//!
//! These read the [`VerifiedClaims`] that [`WardenLayer`](crate::WardenLayer)
//! attaches to a request; they never verify tokens themselves.
//!
//! # Usage
//!
//! ```ignore
//! use warden_axum::{MaybeAuth, RequireAuth, RequireGroup};
//!
//! // 401 if the layer attached no claims
//! async fn me(auth: RequireAuth) -> String {
//!     format!("Hello, {}!", auth.subject)
//! }
//!
//! // Group check inside a handler
//! async fn reports(auth: RequireAuth) -> Result<&'static str, AuthRejection> {
//!     RequireGroup::check(&auth, "analysts")?;
//!     Ok("reports")
//! }
//!
//! // Optional authentication
//! async fn landing(auth: MaybeAuth) -> String {
//!     match auth.0 {
//!         Some(claims) => format!("Hello, {}!", claims.subject),
//!         None => "Hello, guest!".to_string(),
//!     }
//! }
//! ```

use std::ops::Deref;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use warden_auth_core::TokenClaims;

use crate::error::AuthRejection;

/// Claims of the request's verified bearer token, stored in request extensions.
#[derive(Debug, Clone)]
pub struct VerifiedClaims(pub Arc<TokenClaims>);

impl Deref for VerifiedClaims {
    type Target = TokenClaims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively. Any other scheme, a missing
/// header or a non-ASCII value yields `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim().to_string())
}

/// Extractor that requires verified claims.
///
/// Returns 401 Unauthorized if the request carries none.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub VerifiedClaims);

impl Deref for RequireAuth {
    type Target = TokenClaims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerifiedClaims>()
            .cloned()
            .map(Self)
            .ok_or_else(AuthRejection::missing)
    }
}

/// Extractor for optional authentication.
///
/// `None` when the request carries no claims, rather than failing.
#[derive(Debug, Clone)]
pub struct MaybeAuth(pub Option<VerifiedClaims>);

impl Deref for MaybeAuth {
    type Target = Option<VerifiedClaims>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for MaybeAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<VerifiedClaims>().cloned()))
    }
}

/// Group check for handlers that decide the group at runtime.
pub struct RequireGroup;

impl RequireGroup {
    /// Exact, case-sensitive membership check; 403 if `group` is missing.
    pub fn check(claims: &TokenClaims, group: &str) -> Result<(), AuthRejection> {
        if claims.has_group(group) {
            Ok(())
        } else {
            tracing::debug!(sub = %claims.subject, group, "Caller lacks required group");
            Err(AuthRejection::forbidden(group))
        }
    }
}
