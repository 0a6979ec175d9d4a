//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{doc, oid::ObjectId},
};
use serde::{Deserialize, Serialize};
use std::future::IntoFuture;
use std::time::Duration;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{User, parse_object_id};
use crate::repository::{ID_MISMATCH, UserRepository};

/// Collection the users live in
pub const COLLECTION: &str = "users";

const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Stored shape of a user: `{_id, age?, name?}`.
///
/// `_id` is left out on insert and replace so that the server assigns
/// and keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: None,
            age: user.age.map(i32::from),
            name: user.name.clone(),
        }
    }
}

impl TryFrom<UserDocument> for User {
    type Error = UserError;

    fn try_from(doc: UserDocument) -> Result<Self, Self::Error> {
        let id = doc.id.map(|oid| oid.to_hex()).unwrap_or_default();
        let age = doc
            .age
            .map(i8::try_from)
            .transpose()
            .map_err(|_| UserError::Store(format!("stored age of user {id} is out of range")))?;

        Ok(User {
            id,
            age,
            name: doc.name,
        })
    }
}

/// MongoDB implementation of the UserRepository
///
/// Every store call is bounded by the operation timeout; running out of
/// time is reported as [`UserError::Store`].
#[derive(Debug, Clone)]
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
    operation_timeout: Duration,
}

impl MongoUserRepository {
    /// # Example
    /// ```ignore
    /// let client = connect_from_config(&config).await?;
    /// let repo = MongoUserRepository::new(client.database("app"))
    ///     .with_operation_timeout(config.operation_timeout());
    /// ```
    pub fn new(db: Database) -> Self {
        Self::with_collection(db, COLLECTION)
    }

    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<UserDocument>(collection_name),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    async fn bounded<T, F>(&self, op: F) -> UserResult<T>
    where
        F: IntoFuture<Output = mongodb::error::Result<T>>,
    {
        Ok(tokio::time::timeout(self.operation_timeout, op).await??)
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: User) -> UserResult<User> {
        let document = UserDocument::from(&user);
        let result = self.bounded(self.collection.insert_one(&document)).await?;

        let oid = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| UserError::Store("inserted id is not an ObjectId".to_string()))?;

        tracing::debug!(user_id = %oid, "User created");
        Ok(user.with_id(oid.to_hex()))
    }

    #[instrument(skip(self, user))]
    async fn update_user(&self, id: &str, user: User) -> UserResult<User> {
        if id != user.id {
            tracing::debug!(path_id = %id, body_id = %user.id, "{ID_MISMATCH}");
            return Err(UserError::Validation(ID_MISMATCH.to_string()));
        }

        self.get_user(id).await?;
        let oid = parse_object_id(id)?;

        let result = self
            .bounded(
                self.collection
                    .replace_one(doc! { "_id": oid }, UserDocument::from(&user)),
            )
            .await?;

        if result.modified_count == 0 {
            return Err(UserError::UpdateFailed(id.to_string()));
        }

        tracing::debug!(user_id = %id, "User updated");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: &str) -> UserResult<()> {
        let oid = parse_object_id(id)?;

        let result = self
            .bounded(self.collection.delete_one(doc! { "_id": oid }))
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "delete failed");
                UserError::DeleteFailed(id.to_string())
            })?;

        if result.deleted_count == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        tracing::debug!(user_id = %id, "User deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id: &str) -> UserResult<User> {
        let oid = parse_object_id(id)?;

        let document = self
            .bounded(self.collection.find_one(doc! { "_id": oid }))
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        User::try_from(document)
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> UserResult<Vec<User>> {
        let documents = self
            .bounded(async {
                let cursor = self.collection.find(doc! {}).await?;
                cursor.try_collect::<Vec<UserDocument>>().await
            })
            .await?;

        let users = documents
            .into_iter()
            .map(User::try_from)
            .collect::<UserResult<Vec<_>>>()?;

        tracing::debug!(count = users.len(), "Users listed");
        Ok(users)
    }
}
