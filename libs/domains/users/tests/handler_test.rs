//! Handler tests for the Users domain
//!
//! These run the real router over an in-memory repository and check:
//! - request decoding and body rejections
//! - status codes per error kind
//! - response bodies
//! - span enrichment on GET

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use core_config::TelemetryConfig;
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use test_utils::TestDataBuilder;
use tower::ServiceExt; // For oneshot()
use tracing::Subscriber;
use tracing::field::{Field, Visit};
use tracing::span::{Id, Record};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::{LookupSpan, Registry};

const MISSING: &str = "65f1c0ffee0000000000abcd";

fn app_with(repo: InMemoryUserRepository) -> Router {
    handlers::router(UserService::new(repo), TelemetryConfig::disabled())
}

fn app() -> Router {
    app_with(InMemoryUserRepository::new())
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// Helper to parse JSON response body
async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_user_lifecycle() {
    let repo = InMemoryUserRepository::new();
    let app = app_with(repo.clone());

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/", json!({"name": "Ann", "age": 30})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        json_body(response.into_body()).await,
        json!({"message": "User created successfully"})
    );

    // The create response carries no id; find it through the listing
    let users = repo.list_users().await.unwrap();
    assert_eq!(users.len(), 1);
    let id = users[0].id.clone();

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, &format!("/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response.into_body()).await,
        json!({"id": id, "name": "Ann", "age": 30})
    );

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/{id}"),
            json!({"id": id, "name": "Ann", "age": 31}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response.into_body()).await,
        json!({"message": "User updated successfully"})
    );

    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, &format!("/{id}")))
        .await
        .unwrap();
    assert_eq!(json_body(response.into_body()).await["age"], 31);

    let response = app
        .clone()
        .oneshot(empty_request(Method::DELETE, &format!("/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response.into_body()).await,
        json!({"message": "User deleted successfully"})
    );

    let response = app
        .oneshot(empty_request(Method::GET, &format!("/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response.into_body()).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_users_empty_is_array() {
    let response = app()
        .oneshot(empty_request(Method::GET, "/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response.into_body()).await, json!([]));
}

#[tokio::test]
async fn test_create_with_malformed_body_is_400() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response.into_body()).await["error"].is_string());
}

#[tokio::test]
async fn test_create_with_out_of_range_age_is_400() {
    let response = app()
        .oneshot(json_request(Method::POST, "/", json!({"name": "Ann", "age": 300})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_with_malformed_body_is_422() {
    let response = app()
        .oneshot(json_request(
            Method::PUT,
            &format!("/{MISSING}"),
            json!({"id": MISSING, "age": "old"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        json_body(response.into_body()).await["code"],
        "UNPROCESSABLE_ENTITY"
    );
}

#[tokio::test]
async fn test_update_id_mismatch_is_400() {
    let repo = InMemoryUserRepository::new();
    let created = repo.create_user(User::new("Ann", 30)).await.unwrap();

    let response = app_with(repo.clone())
        .oneshot(json_request(
            Method::PUT,
            &format!("/{}", created.id),
            json!({"id": MISSING, "name": "Eve", "age": 20}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response.into_body()).await["code"],
        "VALIDATION_ERROR"
    );

    // Nothing was persisted
    assert_eq!(repo.get_user(&created.id).await.unwrap(), created);
}

#[tokio::test]
async fn test_update_missing_user_is_404() {
    let builder = TestDataBuilder::from_test_name("handler_update_missing");
    let id = builder.object_id_hex();

    let response = app()
        .oneshot(json_request(
            Method::PUT,
            &format!("/{id}"),
            json!({"id": id, "name": builder.name("user", "ghost"), "age": builder.age()}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_malformed_id_is_400() {
    let response = app()
        .oneshot(json_request(
            Method::PUT,
            "/not-an-id",
            json!({"id": "not-an-id", "name": "Ann"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response.into_body()).await["code"], "INVALID_ID");
}

#[tokio::test]
async fn test_update_without_changes_is_500() {
    let repo = InMemoryUserRepository::new();
    let created = repo.create_user(User::new("Ann", 30)).await.unwrap();

    let response = app_with(repo)
        .oneshot(json_request(
            Method::PUT,
            &format!("/{}", created.id),
            json!({"id": created.id, "name": "Ann", "age": 30}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_get_and_delete_malformed_id_is_400() {
    for method in [Method::GET, Method::DELETE] {
        let response = app()
            .oneshot(empty_request(method.clone(), "/xyz"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method}");
        assert_eq!(json_body(response.into_body()).await["code"], "INVALID_ID");
    }
}

#[tokio::test]
async fn test_delete_missing_user_is_404() {
    let id = TestDataBuilder::from_test_name("handler_delete_missing").object_id_hex();

    let response = app()
        .oneshot(empty_request(Method::DELETE, &format!("/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_placeholder_methods() {
    for (method, message) in [(Method::PATCH, "PATCH"), (Method::OPTIONS, "OPTIONS")] {
        let response = app()
            .oneshot(empty_request(method, &format!("/{MISSING}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response.into_body()).await,
            json!({"message": message})
        );
    }

    let response = app()
        .oneshot(empty_request(Method::HEAD, &format!("/{MISSING}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Records every `Span::record` call as `(span name, field, value)`
#[derive(Clone, Default)]
struct RecordedFields(Arc<Mutex<Vec<(String, String, String)>>>);

impl RecordedFields {
    fn values_of(&self, span: &str, field: &str) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, f, _)| s == span && f == field)
            .map(|(_, _, v)| v.clone())
            .collect()
    }
}

struct FieldVisitor<'a> {
    span: &'a str,
    out: &'a mut Vec<(String, String, String)>,
}

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.out
            .push((self.span.to_string(), field.name().to_string(), value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.out.push((
            self.span.to_string(),
            field.name().to_string(),
            format!("{value:?}"),
        ));
    }
}

impl<S> Layer<S> for RecordedFields
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut out = self.0.lock().unwrap();
        values.record(&mut FieldVisitor {
            span: span.name(),
            out: &mut out,
        });
    }
}

/// GETs a stored user with the given telemetry settings and returns what
/// was recorded on the `get_user` span
async fn recorded_user_ids(telemetry: TelemetryConfig) -> (String, Vec<String>) {
    let recorded = RecordedFields::default();
    let _guard = tracing::subscriber::set_default(Registry::default().with(recorded.clone()));

    let repo = InMemoryUserRepository::new();
    let created = repo.create_user(User::new("Ann", 30)).await.unwrap();
    let app = handlers::router(UserService::new(repo), telemetry);

    let response = app
        .oneshot(empty_request(Method::GET, &format!("/{}", created.id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response.into_body()).await["id"], created.id);

    (created.id, recorded.values_of("get_user", "user.id"))
}

#[tokio::test]
async fn test_get_records_user_id_on_span_when_telemetry_enabled() {
    let (id, recorded) =
        recorded_user_ids(TelemetryConfig::new("users-api", "http://localhost:4317")).await;
    assert_eq!(recorded, vec![id]);
}

#[tokio::test]
async fn test_get_leaves_span_untouched_when_telemetry_disabled() {
    let (_, recorded) = recorded_user_ids(TelemetryConfig::disabled()).await;
    assert!(recorded.is_empty());

    // A service name alone is not enough
    let (_, recorded) = recorded_user_ids(TelemetryConfig {
        service_name: Some("users-api".to_string()),
        collector_endpoint: None,
    })
    .await;
    assert!(recorded.is_empty());
}
