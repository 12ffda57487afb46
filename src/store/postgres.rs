use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{Account, AccountStore, NewAccount};
use crate::auth::Role;
use crate::error::AppError;

/// Postgres-backed account store
///
/// Uniqueness comes from the `UNIQUE` constraint on `accounts.username`; the
/// insert is attempted directly and a violation surfaces through
/// `From<sqlx::Error> for AppError`.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

type AccountRow = (i64, String, String, String, DateTime<Utc>);

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn from_row(row: AccountRow) -> Result<Account, AppError> {
        let (id, username, password_hash, role, created_at) = row;
        let role = role.parse::<Role>().map_err(|_| {
            AppError::Internal(format!("Account {} has unknown role '{}'", id, role))
        })?;

        Ok(Account {
            id,
            username,
            password_hash,
            role,
            created_at,
        })
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (username, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, role, created_at
            "#,
        )
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Self::from_row(row)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, username, password_hash, role, created_at FROM accounts WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::from_row).transpose()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, username, password_hash, role, created_at FROM accounts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::from_row).transpose()
    }
}
