// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential store: user records and password verification.
//!
//! Handlers only see the [`CredentialStore`] trait. The crate ships
//! [`InMemoryStore`]; a relational backend plugs in behind the same trait.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{UserId, UserRecord};
use crate::password;

/// Error type for credential store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Input rejected before reaching storage
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unique constraint on username violated
    #[error("{0} must be unique")]
    DuplicateUsername(String),

    /// Password hashing failed
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Backend could not serve the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence abstraction for user records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// All users, ordered by id.
    async fn list_users(&self) -> StoreResult<Vec<UserRecord>>;

    /// Create a user, hashing `password` on the way in.
    async fn create_user(&self, username: &str, password: &str) -> StoreResult<UserRecord>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>>;

    /// Check `password` against the user's stored hash.
    async fn verify_password(&self, user: &UserRecord, password: &str) -> StoreResult<bool> {
        Ok(password::verify(password, &user.password_hash))
    }
}

fn validate_credentials(username: &str, password: &str) -> StoreResult<()> {
    if username.trim().is_empty() {
        return Err(StoreError::Validation("username cannot be empty".to_string()));
    }
    if password.is_empty() {
        return Err(StoreError::Validation("password cannot be empty".to_string()));
    }
    Ok(())
}

#[derive(Default)]
struct Users {
    by_id: BTreeMap<UserId, UserRecord>,
    last_id: i64,
}

/// In-memory credential store.
///
/// Username uniqueness is checked and the record inserted under one write
/// lock, so concurrent registrations of the same name cannot both succeed.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<Users>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a user. Issued tokens for the id stop resolving to a user.
    pub async fn delete_user(&self, id: UserId) -> Option<UserRecord> {
        self.users.write().await.by_id.remove(&id)
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.by_id.values().cloned().collect())
    }

    async fn create_user(&self, username: &str, password: &str) -> StoreResult<UserRecord> {
        validate_credentials(username, password)?;

        // Hash before taking the lock; Argon2 is deliberately slow.
        let password_hash =
            password::hash(password).map_err(|e| StoreError::Hashing(e.to_string()))?;

        let mut users = self.users.write().await;
        if users.by_id.values().any(|u| u.username == username) {
            return Err(StoreError::DuplicateUsername("username".to_string()));
        }

        users.last_id += 1;
        let now = Utc::now();
        let record = UserRecord {
            id: UserId(users.last_id),
            username: username.to_string(),
            password_hash,
            created_at: now,
            updated_at: now,
        };
        users.by_id.insert(record.id, record.clone());

        Ok(record)
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users
            .by_id
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}
