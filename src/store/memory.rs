use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{Account, AccountStore, NewAccount};
use crate::error::{AppError, DatabaseError};

#[derive(Debug, Default)]
struct Accounts {
    next_id: i64,
    by_id: HashMap<i64, Account>,
    id_by_username: HashMap<String, i64>,
}

/// Process-local account store for development and tests
///
/// The duplicate check and the insert happen under a single write lock, so
/// concurrent registrations of one username produce exactly one account.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    inner: Arc<RwLock<Accounts>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> AppError {
        AppError::Internal("Account store lock poisoned".to_string())
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert(&self, account: NewAccount) -> Result<Account, AppError> {
        let mut accounts = self.inner.write().map_err(|_| Self::poisoned())?;

        if accounts.id_by_username.contains_key(&account.username) {
            return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                "Username already exists".to_string(),
            )));
        }

        accounts.next_id += 1;
        let stored = Account {
            id: accounts.next_id,
            username: account.username,
            password_hash: account.password_hash,
            role: account.role,
            created_at: Utc::now(),
        };

        accounts.id_by_username.insert(stored.username.clone(), stored.id);
        accounts.by_id.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AppError> {
        let accounts = self.inner.read().map_err(|_| Self::poisoned())?;

        Ok(accounts
            .id_by_username
            .get(username)
            .and_then(|id| accounts.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AppError> {
        let accounts = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(accounts.by_id.get(&id).cloned())
    }
}
