//! HTTP rendering of authentication failures.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use warden_auth_core::{AuthError, FailureKind};

/// An authentication or authorization failure, ready to send.
///
/// The body never names the sub-reason:
///
/// ```json
/// { "error": { "code": "AUTHENTICATION_FAILED", "message": "authentication failed" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(transparent)]
pub struct AuthRejection(#[from] pub AuthError);

impl AuthRejection {
    /// Rejection for a request that reached a protected handler without claims.
    #[must_use]
    pub fn missing() -> Self {
        Self(AuthError::MissingToken)
    }

    /// Rejection for a caller outside `group`.
    #[must_use]
    pub fn forbidden(group: impl Into<String>) -> Self {
        Self(AuthError::Forbidden {
            group: group.into(),
        })
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::UNAUTHORIZED)
    }

    /// `WWW-Authenticate` challenge (RFC 6750 §3)
    fn challenge(&self) -> Option<&'static str> {
        match (&self.0, self.0.kind()) {
            (AuthError::MissingToken, _) => Some("Bearer"),
            (_, FailureKind::Unauthenticated) => Some(r#"Bearer error="invalid_token""#),
            (_, FailureKind::Forbidden) => Some(r#"Bearer error="insufficient_scope""#),
            (_, FailureKind::Unavailable) => None,
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        if self.0.kind() == FailureKind::Unavailable {
            tracing::warn!(reason = %self.0, "Rejecting request: auth unavailable");
        }

        let body = serde_json::json!({
            "error": {
                "code": self.0.error_code(),
                "message": self.0.public_message(),
            }
        });

        let mut response = (self.status(), Json(body)).into_response();
        if let Some(challenge) = self.challenge() {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(challenge));
        }
        response
    }
}
