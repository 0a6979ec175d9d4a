use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{User, parse_object_id};

/// Message used when the path id and the payload id differ
pub(crate) const ID_MISMATCH: &str = "id and payload don't match";

/// Repository trait for User persistence.
///
/// Implementations own the mapping between [`User`] and the stored
/// record, and are the only place that parses identifiers. A malformed id
/// is always reported as [`UserError::InvalidId`], never as
/// [`UserError::NotFound`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; the returned user carries the assigned id
    async fn create_user(&self, user: User) -> UserResult<User>;

    /// Replace all non-id fields of an existing user.
    ///
    /// Checks run in this order: `id` equals `user.id` (`Validation`), the
    /// user exists (`InvalidId`/`NotFound`), then the replace must modify
    /// a record (`UpdateFailed`).
    async fn update_user(&self, id: &str, user: User) -> UserResult<User>;

    async fn delete_user(&self, id: &str) -> UserResult<()>;

    async fn get_user(&self, id: &str) -> UserResult<User>;

    /// All users; empty when the store is empty
    async fn list_users(&self) -> UserResult<Vec<User>>;
}

/// In-memory implementation of UserRepository (for development/testing)
///
/// Assigns real `ObjectId`s and reproduces the MongoDB repository's
/// error behaviour, including `UpdateFailed` when a replace would leave
/// the record unchanged.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<BTreeMap<ObjectId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, user: User) -> UserResult<User> {
        let oid = ObjectId::new();
        let user = user.with_id(oid.to_hex());

        self.users.write().await.insert(oid, user.clone());

        tracing::debug!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn update_user(&self, id: &str, user: User) -> UserResult<User> {
        if id != user.id {
            return Err(UserError::Validation(ID_MISMATCH.to_string()));
        }

        let existing = self.get_user(id).await?;
        let oid = parse_object_id(id)?;

        if existing == user {
            return Err(UserError::UpdateFailed(id.to_string()));
        }

        let mut users = self.users.write().await;
        match users.get_mut(&oid) {
            Some(stored) => *stored = user.clone(),
            None => return Err(UserError::NotFound(id.to_string())),
        }

        tracing::debug!(user_id = %id, "Updated user");
        Ok(user)
    }

    async fn delete_user(&self, id: &str) -> UserResult<()> {
        let oid = parse_object_id(id)?;

        if self.users.write().await.remove(&oid).is_none() {
            return Err(UserError::NotFound(id.to_string()));
        }

        tracing::debug!(user_id = %id, "Deleted user");
        Ok(())
    }

    async fn get_user(&self, id: &str) -> UserResult<User> {
        let oid = parse_object_id(id)?;

        self.users
            .read()
            .await
            .get(&oid)
            .cloned()
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }

    async fn list_users(&self) -> UserResult<Vec<User>> {
        Ok(self.users.read().await.values().cloned().collect())
    }
}
