//! Auth errors

use thiserror::Error;

/// Key resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Key ID absent from the provider's key set, even after a fresh fetch
    #[error("signing key not found: {kid}")]
    KeyNotFound { kid: String },

    /// The provider could not be reached or returned an unusable response
    #[error("key provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A published key is not a usable RS256 verification key
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}

/// Coarse category of a verification failure, used for the response a
/// caller sends back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The credential is missing or not trustworthy
    Unauthenticated,
    /// The identity is established but lacks the required group
    Forbidden,
    /// The identity provider could not be reached
    Unavailable,
}

impl FailureKind {
    /// Label for metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Token verification errors
///
/// The variant is for logs and tests. Anything user-facing should go through
/// [`AuthError::public_message`] so the sub-reason is not disclosed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No token was presented
    #[error("missing token")]
    MissingToken,

    /// Not a well-formed three-part signed token
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Header declares an algorithm other than RS256
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The key ID is unknown to the provider
    #[error("invalid token")]
    InvalidToken,

    /// Key lookup failed because the provider is unreachable
    #[error("auth unavailable: {0}")]
    AuthUnavailable(String),

    /// Signature does not match the token contents
    #[error("invalid signature")]
    InvalidSignature,

    /// Token has expired
    #[error("token expired")]
    ExpiredToken,

    /// Issuer differs from the configured issuer
    #[error("issuer mismatch")]
    IssuerMismatch,

    /// Audience differs from the configured audience
    #[error("audience mismatch")]
    AudienceMismatch,

    /// Valid token, but the subject is not in the required group
    #[error("forbidden: requires group {group}")]
    Forbidden { group: String },
}

impl AuthError {
    /// Failure category of this error
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Forbidden { .. } => FailureKind::Forbidden,
            Self::AuthUnavailable(_) => FailureKind::Unavailable,
            Self::MissingToken
            | Self::MalformedToken(_)
            | Self::UnsupportedAlgorithm(_)
            | Self::InvalidToken
            | Self::InvalidSignature
            | Self::ExpiredToken
            | Self::IssuerMismatch
            | Self::AudienceMismatch => FailureKind::Unauthenticated,
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            FailureKind::Unauthenticated => 401,
            FailureKind::Forbidden => 403,
            FailureKind::Unavailable => 503,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            FailureKind::Unauthenticated => "AUTHENTICATION_FAILED",
            FailureKind::Forbidden => "INSUFFICIENT_PERMISSION",
            FailureKind::Unavailable => "AUTH_UNAVAILABLE",
        }
    }

    /// Message safe to return to the client
    pub fn public_message(&self) -> &'static str {
        match self.kind() {
            FailureKind::Unauthenticated => "authentication failed",
            FailureKind::Forbidden => "insufficient permission",
            FailureKind::Unavailable => "authentication temporarily unavailable",
        }
    }
}

impl From<KeyError> for AuthError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::ProviderUnavailable(reason) => Self::AuthUnavailable(reason),
            KeyError::KeyNotFound { .. } | KeyError::InvalidKey(_) => Self::InvalidToken,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::ExpiredToken,
            ErrorKind::InvalidIssuer => Self::IssuerMismatch,
            ErrorKind::InvalidAudience => Self::AudienceMismatch,
            ErrorKind::InvalidAlgorithm => Self::UnsupportedAlgorithm("algorithm mismatch".into()),
            ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => Self::InvalidToken,
            _ => Self::MalformedToken(err.to_string()),
        }
    }
}
