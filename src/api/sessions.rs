//! Session API endpoints.
//!
//! - POST `/staff/login` - Staff login by email
//! - POST `/customer/login` - Customer login by phone
//! - POST `/customer/register` - Storefront signup
//! - POST `/refresh` - Exchange a refresh token for a new pair
//! - POST `/logout` - Stateless logout acknowledgement
//! - GET  `/me` - Current principal

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use super::error::ApiError;
use crate::auth::{
    Auth, AuthRejection, Authenticator, Principal, PrincipalClass, Session, password,
};
use crate::db::Database;
use crate::impl_has_auth_state;
use crate::jwt::IssuedToken;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Clone)]
pub struct SessionsState {
    pub db: Database,
    pub auth: Arc<Authenticator<Database>>,
}

impl_has_auth_state!(SessionsState);

pub fn router(state: SessionsState) -> Router {
    Router::new()
        .route("/staff/login", post(staff_login))
        .route("/customer/login", post(customer_login))
        .route("/customer/register", post(customer_register))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .with_state(state)
}

#[derive(Deserialize)]
struct StaffLoginRequest {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct CustomerLoginRequest {
    phone: String,
    password: String,
}

#[derive(Deserialize)]
struct CustomerRegisterRequest {
    phone: String,
    password: String,
}

#[derive(Deserialize)]
struct RefreshRequest {
    refresh_token: String,
}

#[derive(Serialize)]
struct TokenPayload {
    token: String,
    issued_at: u64,
    expires_at: u64,
}

impl From<IssuedToken> for TokenPayload {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            issued_at: issued.issued_at,
            expires_at: issued.expires_at,
        }
    }
}

#[derive(Serialize)]
struct SessionResponse {
    principal: Principal,
    access_token: TokenPayload,
    refresh_token: TokenPayload,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            principal: session.principal,
            access_token: session.access.into(),
            refresh_token: session.refresh.into(),
        }
    }
}

async fn staff_login(
    State(state): State<SessionsState>,
    Json(req): Json<StaffLoginRequest>,
) -> Result<Json<SessionResponse>, AuthRejection> {
    let session = state
        .auth
        .login(&req.email, &req.password, PrincipalClass::Staff)
        .await?;
    Ok(Json(session.into()))
}

async fn customer_login(
    State(state): State<SessionsState>,
    Json(req): Json<CustomerLoginRequest>,
) -> Result<Json<SessionResponse>, AuthRejection> {
    let session = state
        .auth
        .login(&req.phone, &req.password, PrincipalClass::Customer)
        .await?;
    Ok(Json(session.into()))
}

/// Storefront signup. Creates an active customer and logs it in.
async fn customer_register(
    State(state): State<SessionsState>,
    Json(req): Json<CustomerRegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_phone(&req.phone)?;
    validate_password(&req.password)?;

    let hash = password::hash_password(&req.password)
        .map_err(|_| ApiError::internal("Failed to hash password"))?;
    let uuid = uuid::Uuid::new_v4().to_string();

    state
        .db
        .customers()
        .create(&uuid, &req.phone, &hash)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|d| d.is_unique_violation())
            {
                ApiError::conflict("Phone number already registered")
            } else {
                ApiError::db_error("Failed to create customer", e)
            }
        })?;

    let session = state
        .auth
        .login(&req.phone, &req.password, PrincipalClass::Customer)
        .await
        .map_err(|e| {
            error!(error = %e, "login immediately after registration failed");
            ApiError::internal("Registration failed")
        })?;

    Ok((StatusCode::CREATED, Json(SessionResponse::from(session))))
}

/// The refresh endpoint is class-agnostic: the principal class travels
/// inside the signed token.
async fn refresh(
    State(state): State<SessionsState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<SessionResponse>, AuthRejection> {
    let session = state.auth.refresh(&req.refresh_token).await?;
    Ok(Json(session.into()))
}

/// Logout is stateless: the client discards its tokens, outstanding ones
/// remain valid until natural expiry.
async fn logout(State(state): State<SessionsState>, _auth: Auth) -> StatusCode {
    state.auth.logout();
    StatusCode::NO_CONTENT
}

async fn me(auth: Auth) -> Json<Principal> {
    Json(auth.into_principal())
}

fn validate_phone(phone: &str) -> Result<(), ApiError> {
    if phone.is_empty() {
        return Err(ApiError::bad_request("Phone number cannot be empty"));
    }
    if phone.len() > 32 {
        return Err(ApiError::bad_request("Phone number is too long"));
    }
    if !phone.chars().all(|c| c.is_ascii_digit() || c == '+') {
        return Err(ApiError::bad_request("Invalid phone number format"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}
