/// Password Hashing and Verification
///
/// bcrypt with a fresh random salt per hash. The salt and cost are embedded
/// in the digest, so verification needs nothing but the stored string.

use crate::error::{AppError, ValidationError};

/// bcrypt only reads this many bytes of input; longer passwords would be
/// silently truncated, so they are refused instead.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salted one-way hasher for stored passwords
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password
    ///
    /// # Errors
    /// - `ValidationError::TooLong` if the password exceeds 72 bytes
    /// - Internal error if bcrypt rejects the configured cost
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(
                ValidationError::TooLong("password".to_string(), MAX_PASSWORD_BYTES).into(),
            );
        }
        bcrypt::hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Check a password against a stored digest
    ///
    /// A malformed digest never matches, and neither does a password longer
    /// than 72 bytes.
    pub fn verify(&self, digest: &str, password: &str) -> bool {
        if password.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        match bcrypt::verify(password, digest) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password digest could not be parsed");
                false
            }
        }
    }

    /// `hash` on the blocking pool, for use from async handlers
    pub async fn hash_blocking(&self, password: String) -> Result<String, AppError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
    }

    /// `verify` on the blocking pool, for use from async handlers
    pub async fn verify_blocking(&self, digest: String, password: String) -> Result<bool, AppError> {
        let hasher = *self;
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&digest, &password)).await?)
    }
}
