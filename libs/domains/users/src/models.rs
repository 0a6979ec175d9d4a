use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{UserError, UserResult};

/// User entity as exchanged over HTTP.
///
/// `id` is the store-assigned object id rendered as 24 lowercase hex
/// characters. It is empty on creation requests and omitted from JSON
/// while empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Store-assigned identifier (hex)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    #[schema(example = "65f1c0ffee0000000000abcd")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 30)]
    pub age: Option<i8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "Ann")]
    pub name: Option<String>,
}

impl User {
    /// A user without an id, as sent on creation
    pub fn new(name: impl Into<String>, age: i8) -> Self {
        Self {
            id: String::new(),
            age: Some(age),
            name: Some(name.into()),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// Confirmation body for mutating operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "User created successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parse a hex identifier into a MongoDB `ObjectId`.
///
/// Anything other than exactly 24 hex characters is rejected with
/// [`UserError::InvalidId`].
pub fn parse_object_id(id: &str) -> UserResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| UserError::InvalidId(id.to_string()))
}
