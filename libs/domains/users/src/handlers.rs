use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AppError,
    errors::responses::{
        BadRequestInvalidIdResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, UnprocessableEntityResponse,
    },
};
use core_config::TelemetryConfig;
use std::sync::Arc;
use tracing::{Span, instrument};
use utoipa::OpenApi;

use crate::models::{MessageResponse, User};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_users,
        create_user,
        get_user,
        update_user,
        delete_user,
        patch_user,
        options_user,
        head_user,
    ),
    components(
        schemas(User, MessageResponse),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestInvalidIdResponse,
            UnprocessableEntityResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Users", description = "User management endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

/// State shared by the user handlers
pub struct UsersState<R: UserRepository> {
    pub service: UserService<R>,
    /// Resolved once at start-up; gates span enrichment in `get_user`
    pub telemetry: TelemetryConfig,
}

type SharedState<R> = Arc<UsersState<R>>;

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(
    service: UserService<R>,
    telemetry: TelemetryConfig,
) -> Router {
    let state = Arc::new(UsersState { service, telemetry });

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{id}",
            get(get_user)
                .put(update_user)
                .delete(delete_user)
                .patch(patch_user)
                .options(options_user)
                .head(head_user),
        )
        .with_state(state)
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = User,
    responses(
        (status = 201, description = "User created", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(state): State<SharedState<R>>,
    payload: Result<Json<User>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(user) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    state.service.create_user(user).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

/// Replace a user
///
/// The `id` in the body must equal the path id.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID (24 hex characters)")
    ),
    request_body = User,
    responses(
        (status = 200, description = "User updated", body = MessageResponse),
        (status = 400, response = BadRequestInvalidIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = UnprocessableEntityResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(state): State<SharedState<R>>,
    Path(id): Path<String>,
    payload: Result<Json<User>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(user) = payload.map_err(|e| AppError::UnprocessableEntity(e.body_text()))?;

    state.service.update_user(&id, user).await?;

    Ok(Json(MessageResponse::new("User updated successfully")))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID (24 hex characters)")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, response = BadRequestInvalidIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
#[instrument(name = "get_user", skip_all, fields(user.id = tracing::field::Empty))]
async fn get_user<R: UserRepository>(
    State(state): State<SharedState<R>>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    let user = state.service.get_user(&id).await?;

    if state.telemetry.is_enabled() {
        Span::current().record("user.id", user.id.as_str());
    }

    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = String, Path, description = "User ID (24 hex characters)")
    ),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, response = BadRequestInvalidIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(state): State<SharedState<R>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.service.delete_user(&id).await?;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// List all users
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(state): State<SharedState<R>>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = state.service.list_users().await?;
    Ok(Json(users))
}

/// Placeholder, no effect on stored data
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ID")),
    responses((status = 200, description = "Placeholder", body = MessageResponse))
)]
async fn patch_user() -> Json<MessageResponse> {
    Json(MessageResponse::new("PATCH"))
}

/// Placeholder, no effect on stored data
#[utoipa::path(
    options,
    path = "/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ID")),
    responses((status = 200, description = "Placeholder", body = MessageResponse))
)]
async fn options_user() -> Json<MessageResponse> {
    Json(MessageResponse::new("OPTIONS"))
}

/// Placeholder, no effect on stored data
#[utoipa::path(
    head,
    path = "/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "User ID")),
    responses((status = 200, description = "Placeholder"))
)]
async fn head_user() -> Json<MessageResponse> {
    Json(MessageResponse::new("HEAD"))
}
