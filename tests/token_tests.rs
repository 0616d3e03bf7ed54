//! Tests for bearer-token presentation and the stateless token lifecycle.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::*;
use jsonwebtoken::{EncodingKey, Header};
use serde_json::json;
use shopwarden::auth::{PrincipalClass, StaffRole};
use shopwarden::jwt::{Claims, TokenPurpose};
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

#[tokio::test]
async fn test_me_returns_current_principal() {
    let (app, db) = create_test_app().await;
    let uuid = create_staff(&db, "alice@shop.example", "correct horse", StaffRole::Admin).await;
    let (access, _) = login_staff(&app, "alice@shop.example", "correct horse").await;

    let response = get_auth(&app, "/api/auth/me", &access).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], uuid.as_str());
    assert_eq!(body["class"], "staff");
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn test_refresh_token_rejected_as_bearer() {
    let (app, db) = create_test_app().await;
    create_staff(&db, "alice@shop.example", "correct horse", StaffRole::Admin).await;
    let (_access, refresh) = login_staff(&app, "alice@shop.example", "correct horse").await;

    let response = get_auth(&app, "/api/auth/me", &refresh).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_expired_token_prompts_refresh() {
    let (app, _db) = create_test_app().await;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();

    // Craft an access token that expired 50 seconds ago, signed with the
    // app's own secret.
    let claims = Claims {
        sub: "staff-1".to_string(),
        purpose: TokenPurpose::Access,
        class: PrincipalClass::Staff,
        role: Some(StaffRole::Admin),
        iat: now - 100,
        exp: now - 50,
    };
    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET),
    )
    .unwrap();

    let response = get_auth(&app, "/api/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The expired case gets its own message so clients know to refresh.
    let body = body_json(response).await;
    assert_eq!(body["error"], "Token expired");
}

#[tokio::test]
async fn test_logout_is_stateless() {
    let (app, db) = create_test_app().await;
    create_staff(&db, "alice@shop.example", "correct horse", StaffRole::Admin).await;
    let (access, _) = login_staff(&app, "alice@shop.example", "correct horse").await;

    let response = post_auth(&app, "/api/auth/logout", &access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // No revocation list: the token stays valid until natural expiry.
    let me = get_auth(&app, "/api/auth/me", &access).await;
    assert_eq!(me.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_requires_authentication() {
    let (app, _db) = create_test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_scheme_rejected() {
    let (app, db) = create_test_app().await;
    create_staff(&db, "alice@shop.example", "correct horse", StaffRole::Admin).await;
    let (access, _) = login_staff(&app, "alice@shop.example", "correct horse").await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Basic {}", access))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Not authenticated");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_rejected() {
    let (app, _db) = create_test_app().await;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs();

    let claims = Claims {
        sub: "staff-1".to_string(),
        purpose: TokenPurpose::Access,
        class: PrincipalClass::Staff,
        role: Some(StaffRole::Admin),
        iat: now,
        exp: now + 300,
    };
    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"a-different-secret-32-bytes-long"),
    )
    .unwrap();

    let response = get_auth(&app, "/api/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid token");
}
