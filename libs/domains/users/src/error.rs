use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    /// Request is inconsistent, e.g. path and body ids differ
    #[error("{0}")]
    Validation(String),

    /// Identifier is not a valid object id
    #[error("invalid object id: {0}")]
    InvalidId(String),

    #[error("user {0} not found")]
    NotFound(String),

    /// The store accepted the update but changed nothing
    #[error("failed to update user {0}")]
    UpdateFailed(String),

    #[error("failed to delete user {0}")]
    DeleteFailed(String),

    #[error("store error: {0}")]
    Store(String),
}

pub type UserResult<T> = Result<T, UserError>;

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        let message = err.to_string();
        match err {
            UserError::Validation(_) => AppError::BadRequest(message),
            UserError::InvalidId(_) => AppError::InvalidIdentifier(message),
            UserError::NotFound(_) => AppError::NotFound(message),
            UserError::UpdateFailed(_) | UserError::DeleteFailed(_) => {
                AppError::InternalServerError(message)
            }
            UserError::Store(_) => AppError::Database(message),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Store(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for UserError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        UserError::Store("operation timed out".to_string())
    }
}
