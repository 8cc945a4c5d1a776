//! Tower middleware layer for bearer-token authentication.
//!
//! The [`WardenLayer`] verifies each request's bearer token before the inner
//! service sees it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};
use warden_auth_core::{AuthDecision, TokenVerifier};

use crate::error::AuthRejection;
use crate::extractors::{bearer_token, VerifiedClaims};

/// Per-route policy for the middleware layer.
#[derive(Debug, Clone, Default)]
struct Policy {
    /// Group the caller must belong to.
    required_group: Option<Arc<str>>,
    /// Let requests without a bearer token through unauthenticated.
    optional: bool,
}

/// Tower layer that authenticates requests with a [`TokenVerifier`].
///
/// On success the request gets [`VerifiedClaims`] in its extensions. On
/// failure the layer answers itself and the inner service is not called.
#[derive(Clone)]
pub struct WardenLayer {
    verifier: Arc<TokenVerifier>,
    policy: Policy,
}

impl WardenLayer {
    /// Require a valid token on every request.
    #[must_use]
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self {
            verifier,
            policy: Policy::default(),
        }
    }

    /// Also require membership of `group` (403 otherwise).
    #[must_use]
    pub fn require_group(mut self, group: impl Into<String>) -> Self {
        self.policy.required_group = Some(Arc::from(group.into()));
        self
    }

    /// Let requests without a bearer token through without claims.
    ///
    /// A token that is present but fails verification is still rejected.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.policy.optional = true;
        self
    }
}

impl<S> Layer<S> for WardenLayer {
    type Service = WardenService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        WardenService {
            inner,
            verifier: self.verifier.clone(),
            policy: self.policy.clone(),
        }
    }
}

/// The authentication service produced by [`WardenLayer`].
#[derive(Clone)]
pub struct WardenService<S> {
    inner: S,
    verifier: Arc<TokenVerifier>,
    policy: Policy,
}

impl<S> Service<Request<Body>> for WardenService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        // The clone may not be ready; keep the one poll_ready was called on
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let verifier = self.verifier.clone();
        let policy = self.policy.clone();

        Box::pin(async move {
            let token = bearer_token(req.headers());
            if token.is_none() && policy.optional {
                return inner.call(req).await;
            }

            let decision = verifier
                .verify(token.as_deref(), policy.required_group.as_deref())
                .await;

            match decision {
                AuthDecision::Allowed(claims) => {
                    req.extensions_mut().insert(VerifiedClaims(Arc::new(claims)));
                    inner.call(req).await
                }
                AuthDecision::Denied(err) => {
                    tracing::debug!(
                        method = %req.method(),
                        path = %req.uri().path(),
                        reason = %err,
                        "Request rejected by auth layer"
                    );
                    Ok(AuthRejection(err).into_response())
                }
            }
        })
    }
}
