//! Users API routes
//!
//! Wires the users domain to HTTP routes.

use axum::Router;
use domain_users::{MongoUserRepository, UserService, handlers};

use crate::state::AppState;

/// Create users router
pub fn router(state: &AppState) -> Router {
    let repository = MongoUserRepository::new(state.db.clone())
        .with_operation_timeout(state.config.mongodb.operation_timeout());

    let service = UserService::new(repository);

    handlers::router(service, state.config.telemetry.clone())
}
