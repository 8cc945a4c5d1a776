//! Application state

use std::sync::Arc;

use warden_auth_core::TokenVerifier;

use crate::config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Token verifier, shared with the auth layers
    pub verifier: Arc<TokenVerifier>,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state, building the verifier from `config`
    pub fn new(config: Config) -> Result<Self, warden_auth_core::ConfigError> {
        let verifier = match (&config.jwks_file, config.keys_from_file) {
            (Some(path), true) => TokenVerifier::from_key_file(config.auth.clone(), path.clone())?,
            _ => TokenVerifier::from_config(config.auth.clone())?,
        };

        Ok(Self::with_verifier(Arc::new(verifier), config))
    }

    /// Create state around an existing verifier
    pub fn with_verifier(verifier: Arc<TokenVerifier>, config: Config) -> Self {
        Self {
            verifier,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}
