/// Input validators for account requests
///
/// Usernames are compared byte-for-byte, so they are checked but never
/// trimmed or case-folded.

use crate::auth::MAX_PASSWORD_BYTES;
use crate::error::ValidationError;

const MAX_USERNAME_LENGTH: usize = 255; // accounts.username column width

/// Treats an absent or empty value as a missing field
pub fn require_field(value: Option<&str>) -> Result<&str, ValidationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingFields),
    }
}

/// Validates a username
/// - Must not be empty
/// - At most 255 characters
/// - No control characters
pub fn is_valid_username(username: &str) -> Result<&str, ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::MissingFields);
    }

    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong("username".to_string(), MAX_USERNAME_LENGTH));
    }

    if username.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidFormat("username".to_string()));
    }

    Ok(username)
}

/// Validates a password before hashing
pub fn is_valid_password(password: &str) -> Result<&str, ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingFields);
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::TooLong("password".to_string(), MAX_PASSWORD_BYTES));
    }

    Ok(password)
}
