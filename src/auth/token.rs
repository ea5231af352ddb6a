use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::{ttl_from_hours, validate_secret, Config, ConfigError};

const SIGNING_ALGORITHM: &str = "HS256";

/// Claims carried by a bearer token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject: the user's normalized email.
    pub sub: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch. The token is dead from this second on.
    pub exp: i64,
}

impl Claims {
    /// True while `now` is strictly before the expiry.
    pub fn is_live_at(&self, now: i64) -> bool {
        now < self.exp
    }
}

/// Why a token was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("unsupported token algorithm")]
    Unsupported,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => TokenError::Unsupported,
            _ => TokenError::Malformed,
        }
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Issues and verifies HS256-signed bearer tokens.
///
/// Built once at startup from the configured secret and shared read-only.
/// Verification is a pure function of the token, the key and the clock.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &SIGNING_ALGORITHM)
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish()
    }
}

impl TokenCodec {
    /// Builds a codec from a raw secret. Weak secrets are refused.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, ConfigError> {
        validate_secret(secret)?;
        if ttl <= Duration::zero() {
            return Err(ConfigError::Invalid("TOKEN_TTL_HOURS"));
        }

        // Expiry is enforced in `verify_at` against an explicit clock, with no leeway.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let ttl = Some(config.token_ttl_hours)
            .filter(|hours| *hours > 0)
            .and_then(ttl_from_hours)
            .ok_or(ConfigError::Invalid("TOKEN_TTL_HOURS"))?;
        Self::new(config.jwt_secret.as_bytes(), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `subject`, valid from now for the configured lifetime.
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now().timestamp())
    }

    pub fn issue_at(&self, subject: &str, now: i64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now + self.ttl.num_seconds(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Decodes `token` and checks its algorithm, signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::Malformed);
        }
        check_algorithm(token)?;

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;
        if !claims.is_live_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// True iff the token verifies and its expiry is still in the future.
    pub fn is_valid(&self, token: &str) -> bool {
        self.is_valid_at(token, Utc::now().timestamp())
    }

    pub fn is_valid_at(&self, token: &str, now: i64) -> bool {
        match self.verify_at(token, now) {
            // Expiry is re-checked on the decoded claims as well.
            Ok(claims) => claims.is_live_at(now),
            Err(e) => {
                debug!("token failed validation: {}", e);
                false
            }
        }
    }

    /// Subject of a verified token, or `None` for any failure. The failure
    /// kind is logged, never returned.
    pub fn extract_subject(&self, token: &str) -> Option<String> {
        self.extract_subject_at(token, Utc::now().timestamp())
    }

    pub fn extract_subject_at(&self, token: &str, now: i64) -> Option<String> {
        match self.verify_at(token, now) {
            Ok(claims) => {
                debug!("extracted token subject: {}", claims.sub);
                Some(claims.sub)
            }
            Err(e) => {
                warn!("rejected bearer token ({} chars): {}", token.len(), e);
                None
            }
        }
    }
}

/// Reads the `alg` field of the token header without trusting anything else.
fn check_algorithm(token: &str) -> Result<(), TokenError> {
    let mut segments = token.split('.');
    let (Some(header), Some(_), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Malformed);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| TokenError::Malformed)?;
    let header: RawHeader = serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)?;

    if header.alg != SIGNING_ALGORITHM {
        return Err(TokenError::Unsupported);
    }
    Ok(())
}
