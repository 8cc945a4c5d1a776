//! Bearer token verification
//!
//! Verification runs as a fixed sequence of stages. Each stage either
//! advances or ends the call with a denial; nothing is retried.
//!
//! ```text
//! Start → HeaderDecoded → KeyResolved → SignatureVerified
//!       → ClaimsValidated → (group check) → Allowed
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{Algorithm, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use subtle::ConstantTimeEq;

use crate::config::ACCEPTED_ALGORITHM;
use crate::metrics;
use crate::source::{FileKeySource, HttpKeySource, KeySource};
use crate::{AuthConfig, AuthError, ConfigError, KeyResolver, SigningKey};

/// Longest key ID accepted from a token header
const MAX_KID_LEN: usize = 256;

/// Untrusted token header, used only to pick the verification key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHeader {
    /// `kid`; `None` when absent or empty
    pub key_id: Option<String>,
    pub algorithm: String,
}

#[derive(Deserialize)]
struct RawHeader {
    alg: Option<String>,
    kid: Option<String>,
}

impl TokenHeader {
    /// Decode the header of a compact JWS without verifying anything.
    ///
    /// The token must have exactly three non-empty segments and a JSON header
    /// carrying `alg`. A missing `kid` is left to the caller, so an unsupported
    /// algorithm can be reported first.
    pub fn decode(token: &str) -> Result<Self, AuthError> {
        let mut segments = token.split('.');
        let header = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(h), Some(p), Some(s), None) if !h.is_empty() && !p.is_empty() && !s.is_empty() => h,
            _ => {
                return Err(AuthError::MalformedToken(
                    "expected three dot-separated segments".into(),
                ))
            }
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|e| AuthError::MalformedToken(format!("header is not base64url: {}", e)))?;
        let raw: RawHeader = serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::MalformedToken(format!("header is not JSON: {}", e)))?;

        let algorithm = raw
            .alg
            .ok_or_else(|| AuthError::MalformedToken("header has no alg".into()))?;
        let key_id = raw.kid.filter(|kid| !kid.is_empty());
        if key_id.as_ref().is_some_and(|kid| kid.len() > MAX_KID_LEN) {
            return Err(AuthError::MalformedToken("kid too long".into()));
        }

        Ok(Self { key_id, algorithm })
    }
}

/// Claims of a verified token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenClaims {
    /// `iss`
    pub issuer: String,
    /// `sub`
    pub subject: String,
    /// `exp`
    pub expires_at: DateTime<Utc>,
    /// `iat`, when present
    pub issued_at: Option<DateTime<Utc>>,
    /// Group membership; `None` when the token carries no groups claim
    pub groups: Option<BTreeSet<String>>,
    /// The full decoded claim set
    pub claims: Map<String, Value>,
}

impl TokenClaims {
    /// Build claims from a decoded claim set.
    ///
    /// `iss`, `sub` and `exp` are required. A groups claim that is not an
    /// array of strings counts as absent.
    pub fn from_claim_set(claims: Map<String, Value>, groups_claim: &str) -> Result<Self, AuthError> {
        let issuer = string_claim(&claims, "iss")?;
        let subject = string_claim(&claims, "sub")?;
        let expires_at = claims
            .get("exp")
            .and_then(numeric_date)
            .ok_or_else(|| AuthError::MalformedToken("missing or invalid exp claim".into()))?;
        let issued_at = claims.get("iat").and_then(numeric_date);
        let groups = claims.get(groups_claim).and_then(|value| {
            value.as_array().map(|items| {
                items
                    .iter()
                    .filter_map(|g| g.as_str().map(str::to_string))
                    .collect()
            })
        });

        Ok(Self {
            issuer,
            subject,
            expires_at,
            issued_at,
            groups,
            claims,
        })
    }

    /// Exact, case-sensitive group membership
    pub fn has_group(&self, group: &str) -> bool {
        self.groups.as_ref().is_some_and(|groups| groups.contains(group))
    }

    /// Raw claim value by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Check whether the token has expired at `now`, allowing `skew_secs`
    pub fn is_expired_at(&self, now: DateTime<Utc>, skew_secs: i64) -> bool {
        self.expires_at.timestamp() <= now.timestamp() - skew_secs
    }

    fn audiences(&self) -> Vec<&str> {
        let mut audiences = Vec::new();
        match self.claims.get("aud") {
            Some(Value::String(aud)) => audiences.push(aud.as_str()),
            Some(Value::Array(items)) => audiences.extend(items.iter().filter_map(Value::as_str)),
            _ => {}
        }
        if let Some(client_id) = self.claims.get("client_id").and_then(Value::as_str) {
            audiences.push(client_id);
        }
        audiences
    }
}

fn string_claim(claims: &Map<String, Value>, name: &str) -> Result<String, AuthError> {
    claims
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| AuthError::MalformedToken(format!("missing or invalid {} claim", name)))
}

fn numeric_date(value: &Value) -> Option<DateTime<Utc>> {
    let secs = value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))?;
    Utc.timestamp_opt(secs, 0).single()
}

/// Outcome of a verification call
#[derive(Debug, Clone, PartialEq)]
pub enum AuthDecision {
    Allowed(TokenClaims),
    Denied(AuthError),
}

impl AuthDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    /// Convert into a `Result` for `?` propagation
    pub fn into_result(self) -> Result<TokenClaims, AuthError> {
        match self {
            Self::Allowed(claims) => Ok(claims),
            Self::Denied(err) => Err(err),
        }
    }
}

impl From<Result<TokenClaims, AuthError>> for AuthDecision {
    fn from(result: Result<TokenClaims, AuthError>) -> Self {
        match result {
            Ok(claims) => Self::Allowed(claims),
            Err(err) => Self::Denied(err),
        }
    }
}

/// Stages of a verification call, for logging where a token was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    HeaderDecoded,
    KeyResolved,
    SignatureVerified,
    ClaimsValidated,
}

/// Token verifier backed by a [`KeyResolver`]
///
/// Security features:
/// - Only RS256 is accepted; the header algorithm is checked before any key lookup
/// - Key lookup failures surface only as "invalid token" or "unavailable"
/// - Issuer comparison is constant-time
#[derive(Clone)]
pub struct TokenVerifier {
    config: Arc<AuthConfig>,
    resolver: Arc<KeyResolver>,
}

impl TokenVerifier {
    /// Create a verifier sharing an existing resolver
    pub fn new(config: AuthConfig, resolver: Arc<KeyResolver>) -> Self {
        Self {
            config: Arc::new(config),
            resolver,
        }
    }

    /// Create a verifier fetching keys from `config.jwks_url`
    pub fn from_config(config: AuthConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let source = HttpKeySource::new(config.jwks_url.clone(), config.fetch_timeout);
        Ok(Self::with_source(config, Arc::new(source)))
    }

    /// Create a verifier reading keys from a key-set file
    pub fn from_key_file(
        config: AuthConfig,
        path: impl Into<std::path::PathBuf>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_source(config, Arc::new(FileKeySource::new(path))))
    }

    /// Create a verifier with a custom key source
    pub fn with_source(config: AuthConfig, source: Arc<dyn KeySource>) -> Self {
        let resolver = Arc::new(KeyResolver::new(source, config.fetch_timeout));
        Self::new(config, resolver)
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn resolver(&self) -> &Arc<KeyResolver> {
        &self.resolver
    }

    /// Verify a token and, if given, the required group
    pub async fn verify(&self, token: Option<&str>, required_group: Option<&str>) -> AuthDecision {
        self.verify_at(token, required_group, Utc::now()).await
    }

    /// Verify as of an explicit time
    pub async fn verify_at(
        &self,
        token: Option<&str>,
        required_group: Option<&str>,
        now: DateTime<Utc>,
    ) -> AuthDecision {
        let mut stage = Stage::Start;
        let result = self.run(token, required_group, now, &mut stage).await;

        match &result {
            Ok(claims) => {
                tracing::debug!(sub = %claims.subject, "Token verified");
            }
            Err(err) => {
                tracing::debug!(stage = ?stage, reason = %err, "Token denied");
            }
        }
        metrics::record_verification(result.as_ref().err().map(AuthError::kind));

        result.into()
    }

    /// Verify and return the claims, for callers that propagate with `?`
    pub async fn authenticate(
        &self,
        token: Option<&str>,
        required_group: Option<&str>,
    ) -> Result<TokenClaims, AuthError> {
        self.verify(token, required_group).await.into_result()
    }

    async fn run(
        &self,
        token: Option<&str>,
        required_group: Option<&str>,
        now: DateTime<Utc>,
        stage: &mut Stage,
    ) -> Result<TokenClaims, AuthError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let header = TokenHeader::decode(token)?;
        if header.algorithm != ACCEPTED_ALGORITHM {
            return Err(AuthError::UnsupportedAlgorithm(header.algorithm));
        }
        let kid = header
            .key_id
            .ok_or_else(|| AuthError::MalformedToken("header has no kid".into()))?;
        *stage = Stage::HeaderDecoded;

        let key = self.resolver.resolve(&kid).await.map_err(|e| {
            tracing::debug!(kid = %kid, error = %e, "Key resolution failed");
            AuthError::from(e)
        })?;
        *stage = Stage::KeyResolved;

        let claim_set = verify_signature(token, &key)?;
        *stage = Stage::SignatureVerified;

        let claims = TokenClaims::from_claim_set(claim_set, &self.config.groups_claim)?;
        self.validate_claims(&claims, now)?;
        *stage = Stage::ClaimsValidated;

        if let Some(group) = required_group {
            if !claims.has_group(group) {
                return Err(AuthError::Forbidden {
                    group: group.to_string(),
                });
            }
        }

        Ok(claims)
    }

    fn validate_claims(&self, claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), AuthError> {
        let skew = i64::try_from(self.config.clock_skew.as_secs()).unwrap_or(i64::MAX);
        if claims.is_expired_at(now, skew) {
            return Err(AuthError::ExpiredToken);
        }

        let issuer_matches: bool = claims
            .issuer
            .as_bytes()
            .ct_eq(self.config.issuer.as_bytes())
            .into();
        if !issuer_matches {
            return Err(AuthError::IssuerMismatch);
        }

        if let Some(expected) = &self.config.audience {
            let audience_matches = claims.audiences().iter().any(|aud| {
                let eq: bool = aud.as_bytes().ct_eq(expected.as_bytes()).into();
                eq
            });
            if !audience_matches {
                return Err(AuthError::AudienceMismatch);
            }
        }

        Ok(())
    }
}

/// Check the RS256 signature and decode the payload.
///
/// Claim validation is disabled in the library; it is done explicitly
/// afterwards so each failure maps to its own error.
fn verify_signature(token: &str, key: &SigningKey) -> Result<Map<String, Value>, AuthError> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<Map<String, Value>>(token, key.decoding_key(), &validation)?;
    Ok(data.claims)
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
