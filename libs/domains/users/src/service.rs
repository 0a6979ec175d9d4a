//! User Service - the seam between transport and storage
//!
//! Today every operation forwards to the repository unchanged. Business
//! rules belong here so handlers and repositories stay untouched.

use std::sync::Arc;
use tracing::instrument;

use crate::error::UserResult;
use crate::models::User;
use crate::repository::UserRepository;

/// Service layer for User operations
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, user))]
    pub async fn create_user(&self, user: User) -> UserResult<User> {
        self.repository.create_user(user).await
    }

    #[instrument(skip(self, user))]
    pub async fn update_user(&self, id: &str, user: User) -> UserResult<User> {
        self.repository.update_user(id, user).await
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> UserResult<()> {
        self.repository.delete_user(id).await
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: &str) -> UserResult<User> {
        self.repository.get_user(id).await
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> UserResult<Vec<User>> {
        self.repository.list_users().await
    }
}
