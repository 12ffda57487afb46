/// Account persistence
///
/// `AccountStore` is the only seam between the account service and storage.
/// Implementations must enforce username uniqueness atomically on `insert`
/// and report a duplicate as `DatabaseError::UniqueConstraintViolation`.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::auth::Role;
use crate::error::AppError;

pub use memory::InMemoryAccountStore;
pub use postgres::PgAccountStore;

/// A stored account
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Account data prior to insertion; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account, failing on a duplicate username
    async fn insert(&self, account: NewAccount) -> Result<Account, AppError>;

    /// Exact, case-sensitive lookup
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AppError>;
}
