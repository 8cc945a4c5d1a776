//! Configuration for the Identity API service.

use std::path::PathBuf;
use std::time::Duration;

use warden_auth_core::AuthConfig;

const DEFAULT_RESPONSE_TYPES: &str = "code,token";

/// Identity API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Token verification configuration
    pub auth: AuthConfig,

    /// Key-set file served at `/.well-known/jwks.json`
    pub jwks_file: Option<PathBuf>,

    /// Whether the verifier reads keys from `jwks_file` instead of `auth.jwks_url`
    pub keys_from_file: bool,

    /// Group guarding the admin routes
    pub admin_group: String,

    /// `response_types_supported` advertised by the discovery document
    pub response_types: Vec<String>,

    /// Request timeout for API routes
    pub request_timeout: Duration,

    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        // Server
        let http_port = parse_or(&var, "HTTP_PORT", 8080)?;
        let request_timeout_secs: u64 = parse_or(&var, "REQUEST_TIMEOUT_SECS", 30)?;

        // Issuer: explicit, or derived from a Cognito user pool
        let auth = match var("AUTH_ISSUER") {
            Some(issuer) => AuthConfig::new(issuer),
            None => {
                let pool_id = var("COGNITO_USER_POOL_ID")
                    .ok_or(ConfigError::Missing("AUTH_ISSUER or COGNITO_USER_POOL_ID"))?;
                let region = var("COGNITO_REGION")
                    .or_else(|| var("AWS_REGION"))
                    .unwrap_or_else(|| "us-east-1".to_string());
                AuthConfig::cognito(&region, &pool_id)
            }
        };

        // Key material
        let jwks_url = var("JWKS_URL");
        let jwks_file = var("JWKS_FILE").map(PathBuf::from);
        let keys_from_file = jwks_url.is_none() && jwks_file.is_some();

        let mut auth = match jwks_url {
            Some(url) => auth.with_jwks_url(url),
            None => auth,
        };

        // Verification
        let clock_skew_secs: u64 = parse_or(&var, "CLOCK_SKEW_SECS", 0)?;
        let fetch_timeout_secs: u64 = parse_or(&var, "JWKS_FETCH_TIMEOUT_SECS", 5)?;
        auth = auth
            .with_clock_skew(Duration::from_secs(clock_skew_secs))
            .with_fetch_timeout(Duration::from_secs(fetch_timeout_secs));
        if let Some(audience) = var("AUTH_AUDIENCE") {
            auth = auth.with_audience(audience);
        }
        if let Some(claim) = var("GROUPS_CLAIM") {
            auth = auth.with_groups_claim(claim);
        }
        auth.validate()
            .map_err(|e| ConfigError::AuthConfig(e.to_string()))?;

        let admin_group = var("ADMIN_GROUP").unwrap_or_else(|| "admins".to_string());

        // Discovery
        let response_types: Vec<String> = var("RESPONSE_TYPES")
            .unwrap_or_else(|| DEFAULT_RESPONSE_TYPES.to_string())
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if response_types.is_empty() {
            return Err(ConfigError::Invalid("RESPONSE_TYPES"));
        }

        // Metrics
        let metrics_enabled = var("METRICS_ENABLED")
            .map(|v| v.parse().unwrap_or(true))
            .unwrap_or(true);

        Ok(Self {
            http_port,
            auth,
            jwks_file,
            keys_from_file,
            admin_group,
            response_types,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
        })
    }
}

fn parse_or<F, T>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match var(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        None => Ok(default),
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Auth config error: {0}")]
    AuthConfig(String),
}
