/// JWT Claims structure
///
/// Represents the payload of a session token: who the bearer is, which role
/// they held when the token was issued, and when the token stops being valid.

use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::error::AppError;

/// JWT Claims for session tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Account id of the bearer
    pub user_id: i64,
    /// Role copied from the account at issuance
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Create new claims expiring `ttl_hours` from now
    ///
    /// # Errors
    /// Returns an internal error if the expiry is not a representable time
    pub fn new(user_id: i64, role: Role, ttl_hours: i64, issuer: String) -> Result<Self, AppError> {
        let now = chrono::Utc::now();
        let expires_at = chrono::Duration::try_hours(ttl_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::Internal(format!("Token lifetime of {} hours is out of range", ttl_hours))
            })?;

        Ok(Self {
            user_id,
            role,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            iss: issuer,
        })
    }

    /// A token is valid strictly before `exp`.
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp() >= self.exp
    }

    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id,
            role: self.role,
        }
    }
}

/// Identity of the caller, attached to a request once its token verifies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
}
