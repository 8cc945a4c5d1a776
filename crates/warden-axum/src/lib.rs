//! Warden Axum Integration
//!
//! Axum middleware and extractors for bearer-token authentication with
//! [`warden_auth_core::TokenVerifier`].
//!
//! # Overview
//!
//! - **Middleware**: [`WardenLayer`] verifies `Authorization: Bearer` tokens and
//!   attaches [`VerifiedClaims`] to the request, or answers 401/403/503 itself
//! - **Extractors**: [`RequireAuth`], [`MaybeAuth`], plus the [`RequireGroup`] check
//! - **Errors**: [`AuthRejection`] renders verifier errors as JSON responses
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use axum::{routing::get, Router};
//! use warden_axum::{RequireAuth, WardenLayer};
//!
//! async fn me(auth: RequireAuth) -> String {
//!     format!("Hello, {}!", auth.subject)
//! }
//!
//! let app = Router::new()
//!     .route("/api/v1/me", get(me))
//!     .layer(WardenLayer::new(Arc::new(verifier)));
//! ```

pub mod error;
pub mod extractors;
pub mod layer;

pub use error::AuthRejection;
pub use extractors::{bearer_token, MaybeAuth, RequireAuth, RequireGroup, VerifiedClaims};
pub use layer::{WardenLayer, WardenService};
