/// Account registration and login
///
/// Owns every write to the account store. Handlers validate presence of
/// fields through this service rather than talking to the store directly.

use std::sync::Arc;

use crate::auth::{PasswordHasher, Role, TokenCodec};
use crate::error::{AppError, AuthError, DatabaseError, ValidationError};
use crate::store::{Account, AccountStore, NewAccount};
use crate::validators::{is_valid_password, is_valid_username};

/// Plaintext behind `AccountService::dummy_digest`; never a real password.
const DUMMY_PASSWORD: &str = "clinic-auth-unknown-user";

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    hasher: PasswordHasher,
    codec: Arc<TokenCodec>,
    /// Digest at the configured cost, verified against on unknown usernames
    /// so both login failures spend the same bcrypt time.
    dummy_digest: String,
}

impl AccountService {
    /// # Errors
    /// Returns an internal error if bcrypt rejects the hasher's cost
    pub fn new(
        store: Arc<dyn AccountStore>,
        hasher: PasswordHasher,
        codec: Arc<TokenCodec>,
    ) -> Result<Self, AppError> {
        let dummy_digest = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            store,
            hasher,
            codec,
            dummy_digest,
        })
    }

    /// Create an account with a hashed password
    ///
    /// # Errors
    /// - `ValidationError` if a field is empty or the username is unusable
    /// - `DatabaseError::UniqueConstraintViolation` if the username is taken
    pub async fn register(&self, username: &str, password: &str, role: Role) -> Result<Account, AppError> {
        if username.is_empty() || password.is_empty() {
            return Err(ValidationError::MissingFields.into());
        }
        let username = is_valid_username(username)?;
        let password = is_valid_password(password)?;

        let password_hash = self.hasher.hash_blocking(password.to_string()).await?;

        // No existence pre-check: the store rejects duplicates atomically.
        let account = self
            .store
            .insert(NewAccount {
                username: username.to_string(),
                password_hash,
                role,
            })
            .await?;

        tracing::info!(user_id = account.id, role = %account.role, "Account registered");
        Ok(account)
    }

    /// Check credentials and issue a session token
    ///
    /// Unknown usernames and wrong passwords yield the same
    /// `AuthError::InvalidCredentials`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, AppError> {
        if username.is_empty() || password.is_empty() {
            return Err(ValidationError::MissingFields.into());
        }

        let account = match self.store.find_by_username(username).await? {
            Some(account) => account,
            None => {
                self.hasher
                    .verify_blocking(self.dummy_digest.clone(), password.to_string())
                    .await?;
                tracing::debug!("Login for unknown username");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let matches = self
            .hasher
            .verify_blocking(account.password_hash.clone(), password.to_string())
            .await?;
        if !matches {
            tracing::debug!(user_id = account.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.codec.issue(account.id, account.role)?;
        tracing::info!(user_id = account.id, "Account authenticated");
        Ok(token)
    }

    /// Look up the account behind a verified identity
    ///
    /// Tokens outlive accounts, so a missing row is a normal 404.
    pub async fn find_account(&self, user_id: i64) -> Result<Account, AppError> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()).into())
    }
}
