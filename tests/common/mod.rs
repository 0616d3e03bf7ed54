#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use shopwarden::auth::password;
use shopwarden::auth::StaffRole;
use shopwarden::db::Database;
use shopwarden::jwt::{ExpiryPolicy, TokenCodec};
use shopwarden::{ServerConfig, create_app};
use tower::ServiceExt;

/// Signing secret shared by every test app (32 bytes).
pub const TEST_SECRET: &[u8] = b"test-jwt-secret-0123456789abcdef";

/// Create a test app backed by an in-memory database.
pub async fn create_test_app() -> (Router, Database) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: TEST_SECRET.to_vec(),
        expiry: ExpiryPolicy::default(),
    };
    let app = create_app(&config).expect("Invalid test configuration");
    (app, db)
}

/// Codec with the same secret and policy as the test app, for inspecting
/// or crafting tokens.
pub fn test_codec() -> TokenCodec {
    TokenCodec::new(TEST_SECRET, ExpiryPolicy::default()).unwrap()
}

/// Create an active staff member and return its principal id.
pub async fn create_staff(db: &Database, email: &str, pw: &str, role: StaffRole) -> String {
    let uuid = uuid::Uuid::new_v4().to_string();
    let hash = password::hash_password(pw).unwrap();
    db.staff().create(&uuid, email, &hash, role).await.unwrap();
    uuid
}

/// Create an active customer and return its principal id.
pub async fn create_customer(db: &Database, phone: &str, pw: &str) -> String {
    let uuid = uuid::Uuid::new_v4().to_string();
    let hash = password::hash_password(pw).unwrap();
    db.customers().create(&uuid, phone, &hash).await.unwrap();
    uuid
}

pub async fn post_json(app: &Router, path: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get_auth(app: &Router, path: &str, token: &str) -> Response {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_auth(app: &Router, path: &str, token: &str) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: &Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn put_json_auth(
    app: &Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    let request = Request::builder()
        .method("PUT")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn delete_auth(app: &Router, path: &str, token: &str) -> Response {
    let request = Request::builder()
        .method("DELETE")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log in a staff member, asserting success. Returns (access, refresh).
pub async fn login_staff(app: &Router, email: &str, pw: &str) -> (String, String) {
    let response = post_json(
        app,
        "/api/auth/staff/login",
        serde_json::json!({"email": email, "password": pw}),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let body = body_json(response).await;
    (
        body["access_token"]["token"].as_str().unwrap().to_string(),
        body["refresh_token"]["token"].as_str().unwrap().to_string(),
    )
}

/// Log in a customer, asserting success. Returns (access, refresh).
pub async fn login_customer(app: &Router, phone: &str, pw: &str) -> (String, String) {
    let response = post_json(
        app,
        "/api/auth/customer/login",
        serde_json::json!({"phone": phone, "password": pw}),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let body = body_json(response).await;
    (
        body["access_token"]["token"].as_str().unwrap().to_string(),
        body["refresh_token"]["token"].as_str().unwrap().to_string(),
    )
}
