//! API routes module

pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
/// Note: These are nested under /api by axum_helpers::create_router
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .nest("/users", users::router(state))
        .merge(health::router(state.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use crate::openapi::ApiDoc;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum_helpers::{create_router, health_router};
    use core_config::{AppInfo, ServerConfig, TelemetryConfig};
    use database::mongodb::MongoConfig;
    use http_body_util::BodyExt;
    use mongodb::Client;
    use serde_json::Value;
    use tower::ServiceExt;

    /// Full application over a client whose server is unreachable
    async fn offline_app() -> Router {
        let url = "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200&connectTimeoutMS=200";
        let mongo_client = Client::with_uri_str(url).await.unwrap();
        let config = Config {
            app: AppInfo {
                name: "users_api",
                version: "0.0.0",
            },
            mongodb: MongoConfig::with_database(url, "test"),
            server: ServerConfig::default(),
            telemetry: TelemetryConfig::disabled(),
            environment: Environment::Development,
        };
        let state = AppState {
            db: mongo_client.database("test"),
            mongo_client,
            config,
        };

        create_router::<ApiDoc>(routes(&state)).merge(health_router(state.config.app))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health_is_always_ok() {
        let (status, body) = get(offline_app().await, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_is_503_without_mongodb() {
        let (status, body) = get(offline_app().await, "/api/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["mongodb"], "disconnected");
    }

    #[tokio::test]
    async fn test_users_routes_are_mounted() {
        let (status, body) = get(offline_app().await, "/api/users/not-an-id").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ID");

        let (status, _) = get(offline_app().await, "/api/users").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (status, body) = get(offline_app().await, "/api/nothing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_openapi_lists_user_paths() {
        let (status, body) = get(offline_app().await, "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/users/{id}"].is_object());
    }
}
