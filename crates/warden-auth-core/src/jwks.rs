//! JWKS (JSON Web Key Set) model and signing keys built from it

use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};

use crate::config::ACCEPTED_ALGORITHM;
use crate::KeyError;

/// JWKS (JSON Web Key Set) structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JwkSet {
    #[serde(default)]
    pub keys: Vec<Jwk>,
}

/// Individual JWK (JSON Web Key)
///
/// Every field is optional so that one unusable key (an EC key, say) does not
/// make the whole set fail to parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

impl JwkSet {
    /// Parse a key-set document
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        serde_json::from_slice(bytes)
            .map_err(|e| KeyError::ProviderUnavailable(format!("malformed key set: {}", e)))
    }

    /// Build every structurally valid signing key in the set.
    ///
    /// Invalid entries are skipped and logged.
    pub fn signing_keys(&self) -> Vec<SigningKey> {
        self.keys
            .iter()
            .filter_map(|jwk| match SigningKey::from_jwk(jwk) {
                Ok(key) => Some(key),
                Err(e) => {
                    tracing::warn!(kid = ?jwk.kid, error = %e, "Skipping unusable JWK");
                    None
                }
            })
            .collect()
    }
}

/// Signature algorithm of a signing key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Rs256,
}

impl KeyAlgorithm {
    /// JOSE name of the algorithm
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rs256 => ACCEPTED_ALGORITHM,
        }
    }
}

/// A verified-usable public signing key, immutable once built
#[derive(Clone)]
pub struct SigningKey {
    key_id: String,
    algorithm: KeyAlgorithm,
    modulus: String,
    exponent: String,
    decoding_key: DecodingKey,
}

impl SigningKey {
    /// Build a signing key from a JWK.
    ///
    /// The JWK must be an RSA signature key usable with RS256 and carry a
    /// non-empty key ID, modulus and exponent.
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, KeyError> {
        let key_id = non_empty(jwk.kid.as_deref())
            .ok_or_else(|| KeyError::InvalidKey("missing kid".into()))?;

        if jwk.kty.as_deref() != Some("RSA") {
            return Err(KeyError::InvalidKey(format!(
                "{}: key type {:?} is not RSA",
                key_id, jwk.kty
            )));
        }
        if let Some(alg) = jwk.alg.as_deref() {
            if alg != ACCEPTED_ALGORITHM {
                return Err(KeyError::InvalidKey(format!(
                    "{}: algorithm {} is not accepted",
                    key_id, alg
                )));
            }
        }
        if let Some(key_use) = jwk.key_use.as_deref() {
            if key_use != "sig" {
                return Err(KeyError::InvalidKey(format!(
                    "{}: key use {} is not sig",
                    key_id, key_use
                )));
            }
        }

        let modulus = non_empty(jwk.n.as_deref())
            .ok_or_else(|| KeyError::InvalidKey(format!("{}: missing modulus", key_id)))?;
        let exponent = non_empty(jwk.e.as_deref())
            .ok_or_else(|| KeyError::InvalidKey(format!("{}: missing exponent", key_id)))?;

        let decoding_key = DecodingKey::from_rsa_components(modulus, exponent)
            .map_err(|e| KeyError::InvalidKey(format!("{}: {}", key_id, e)))?;

        Ok(Self {
            key_id: key_id.to_string(),
            algorithm: KeyAlgorithm::Rs256,
            modulus: modulus.to_string(),
            exponent: exponent.to_string(),
            decoding_key,
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Base64url-encoded RSA modulus
    pub fn modulus(&self) -> &str {
        &self.modulus
    }

    /// Base64url-encoded RSA public exponent
    pub fn exponent(&self) -> &str {
        &self.exponent
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
