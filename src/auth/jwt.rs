use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppError;

/// Identity asserted by a token. Anything beyond `email` and `role` that the
/// client posts is carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    pub fn for_email(email: impl Into<String>) -> Self {
        Self { email: email.into(), role: None, extra: Map::new() }
    }
}

#[derive(Serialize, Deserialize)]
struct SignedClaims {
    #[serde(flatten)]
    claims: Claims,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, claims: Claims) -> Result<String, AppError> {
        self.issue_at(claims, Utc::now())
    }

    pub(crate) fn issue_at(&self, mut claims: Claims, now: DateTime<Utc>) -> Result<String, AppError> {
        // registered time claims are ours to set
        claims.extra.remove("iat");
        claims.extra.remove("exp");
        let signed = SignedClaims {
            claims,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &signed, &self.encoding)
            .map_err(|e| AppError::internal(format!("Token signing failed: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<SignedClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|d| d.claims.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                AppError::unauthenticated("Access Forbidden")
            })
    }
}
