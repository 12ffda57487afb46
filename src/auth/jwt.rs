/// JWT Token Generation and Validation
///
/// `TokenCodec` owns the signing keys. It is built once from `JwtSettings`
/// at startup and shared read-only by every request afterwards.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::fmt;

use crate::auth::claims::{Claims, Identity};
use crate::auth::Role;
use crate::configuration::JwtSettings;
use crate::error::{AppError, ConfigError};

/// Why a token failed verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    BadSignature,
    /// Issuer mismatch or other claim-level rejection
    InvalidClaims,
    Malformed,
}

impl TokenError {
    /// Short label used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::Expired => "expired",
            TokenError::BadSignature => "bad_signature",
            TokenError::InvalidClaims => "invalid_claims",
            TokenError::Malformed => "malformed",
        }
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenError::Expired => write!(f, "token has expired"),
            TokenError::BadSignature => write!(f, "token signature does not match"),
            TokenError::InvalidClaims => write!(f, "token claims rejected"),
            TokenError::Malformed => write!(f, "token is malformed"),
        }
    }
}

impl std::error::Error for TokenError {}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::InvalidIssuer
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::InvalidAlgorithm => TokenError::InvalidClaims,
            _ => TokenError::Malformed,
        }
    }
}

/// Longest configurable session lifetime (one year)
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Issues and verifies signed session tokens
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    default_ttl_hours: i64,
}

impl TokenCodec {
    /// Build the codec from settings
    ///
    /// # Errors
    /// Returns a config error if the secret is empty or the TTL is outside
    /// `0..=MAX_TOKEN_TTL_HOURS`
    pub fn new(config: &JwtSettings) -> Result<Self, ConfigError> {
        if config.secret.is_empty() {
            return Err(ConfigError::MissingRequired("jwt.secret".to_string()));
        }
        if !(0..=MAX_TOKEN_TTL_HOURS).contains(&config.token_ttl_hours) {
            return Err(ConfigError::InvalidValue(format!(
                "jwt.token_ttl_hours must be between 0 and {} (got {})",
                MAX_TOKEN_TTL_HOURS, config.token_ttl_hours
            )));
        }
        if config.secret.len() < 32 {
            tracing::warn!("JWT secret is shorter than 32 bytes");
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            default_ttl_hours: config.token_ttl_hours,
        })
    }

    /// Issue a token with the configured lifetime
    pub fn issue(&self, user_id: i64, role: Role) -> Result<String, AppError> {
        self.issue_with_ttl(user_id, role, self.default_ttl_hours)
    }

    /// Issue a token expiring `ttl_hours` from now
    ///
    /// # Errors
    /// Returns an internal error if the expiry overflows or encoding fails
    pub fn issue_with_ttl(&self, user_id: i64, role: Role, ttl_hours: i64) -> Result<String, AppError> {
        let claims = Claims::new(user_id, role, ttl_hours, self.issuer.clone())?;

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Verify signature, issuer and expiry, returning the bearer's identity
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;

        // jsonwebtoken accepts `exp == now`; a token is only valid strictly before expiry.
        if claims.is_expired() {
            return Err(TokenError::Expired);
        }

        Ok(claims.identity())
    }
}
