//! Warden Auth Core - bearer token verification
//!
//! Verifies RS256 tokens issued by an external identity provider against its
//! published key set, and enforces group-based access on the decoded claims.
//!
//! Two components run per request:
//! - [`KeyResolver`] maps a key ID to a [`SigningKey`], serving from an
//!   append-only cache and fetching the provider's key set on a miss.
//! - [`TokenVerifier`] decodes the header, resolves the key, checks the
//!   signature and claims, and evaluates the required group.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use warden_auth_core::{AuthConfig, AuthDecision, TokenVerifier};
//!
//! # async fn example(token: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig::cognito("us-east-1", "us-east-1_Example");
//! let verifier = TokenVerifier::from_config(config)?;
//!
//! match verifier.verify(Some(token), Some("admins")).await {
//!     AuthDecision::Allowed(claims) => println!("hello {}", claims.subject),
//!     AuthDecision::Denied(reason) => println!("denied: {}", reason.public_message()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod jwks;
pub mod metrics;
pub mod resolver;
pub mod source;
pub mod token;

pub use config::{AuthConfig, ConfigError, ACCEPTED_ALGORITHM, DEFAULT_GROUPS_CLAIM};
pub use error::{AuthError, FailureKind, KeyError};
pub use jwks::{Jwk, JwkSet, KeyAlgorithm, SigningKey};
pub use resolver::KeyResolver;
pub use source::{FileKeySource, HttpKeySource, KeySource};
pub use token::{AuthDecision, TokenClaims, TokenHeader, TokenVerifier};
