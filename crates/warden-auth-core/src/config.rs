//! Configuration types for token verification

use std::time::Duration;

/// The only signing algorithm accepted in token headers and key sets.
pub const ACCEPTED_ALGORITHM: &str = "RS256";

/// Claim carrying group membership in Cognito-issued tokens.
pub const DEFAULT_GROUPS_CLAIM: &str = "cognito:groups";

/// Auth verification configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Expected `iss` claim, compared exactly
    pub issuer: String,
    /// Key-set endpoint of the identity provider
    pub jwks_url: String,
    /// Allowance subtracted from "now" when checking `exp`
    pub clock_skew: Duration,
    /// Upper bound on a single key-set fetch
    pub fetch_timeout: Duration,
    /// Expected audience (`aud` or `client_id`), unchecked when `None`
    pub audience: Option<String>,
    /// Name of the claim holding the subject's groups
    pub groups_claim: String,
}

impl AuthConfig {
    /// Create a config for an issuer publishing its keys at the
    /// conventional `/.well-known/jwks.json` location
    pub fn new(issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();
        let jwks_url = format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'));

        Self {
            issuer,
            jwks_url,
            clock_skew: Duration::ZERO,
            fetch_timeout: Duration::from_secs(5),
            audience: None,
            groups_claim: DEFAULT_GROUPS_CLAIM.to_string(),
        }
    }

    /// Create a config for a Cognito user pool
    pub fn cognito(region: &str, pool_id: &str) -> Self {
        Self::new(format!(
            "https://cognito-idp.{}.amazonaws.com/{}",
            region, pool_id
        ))
    }

    /// Override the key-set endpoint
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    /// Set the expiry clock-skew allowance
    pub fn with_clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }

    /// Set the key-set fetch timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Require a specific audience
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Read groups from a different claim
    pub fn with_groups_claim(mut self, claim: impl Into<String>) -> Self {
        self.groups_claim = claim.into();
        self
    }

    /// Check the config is usable before building a verifier from it
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::EmptyIssuer);
        }
        reqwest::Url::parse(&self.jwks_url)
            .map_err(|e| ConfigError::InvalidJwksUrl(format!("{}: {}", self.jwks_url, e)))?;
        if self.groups_claim.is_empty() {
            return Err(ConfigError::EmptyGroupsClaim);
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroFetchTimeout);
        }
        Ok(())
    }
}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("issuer must not be empty")]
    EmptyIssuer,

    #[error("invalid JWKS URL: {0}")]
    InvalidJwksUrl(String),

    #[error("groups claim name must not be empty")]
    EmptyGroupsClaim,

    #[error("fetch timeout must be greater than zero")]
    ZeroFetchTimeout,
}
