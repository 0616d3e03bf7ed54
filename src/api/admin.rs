//! Admin API endpoints.
//!
//! Listing requires the admin role; staff management requires super_admin.
//! Mutating routes use fresh authentication so a suspended or demoted
//! admin cannot keep acting on an outstanding access token.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::auth::{
    AccountStatus, AdminOnly, Auth, Authenticator, FreshAuth, StaffRole, SuperAdminOnly, password,
};
use crate::db::Database;
use crate::impl_has_auth_state;

#[derive(Clone)]
pub struct AdminState {
    pub db: Database,
    pub auth: Arc<Authenticator<Database>>,
}

impl_has_auth_state!(AdminState);

pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/staff", get(list_staff).post(create_staff))
        .route("/staff/{uuid}", axum::routing::delete(delete_staff))
        .route("/staff/{uuid}/role", put(set_staff_role))
        .route("/staff/{uuid}/status", put(set_staff_status))
        .route("/customers", get(list_customers))
        .route("/customers/{uuid}/status", put(set_customer_status))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreateStaffRequest {
    email: String,
    password: String,
    role: StaffRole,
}

#[derive(Deserialize)]
struct SetRoleRequest {
    role: StaffRole,
}

#[derive(Deserialize)]
struct SetStatusRequest {
    status: AccountStatus,
}

/// List all staff members.
async fn list_staff(
    State(state): State<AdminState>,
    _auth: Auth<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let staff = state.db.staff().list().await.db_err("Failed to list staff")?;
    Ok(Json(staff))
}

/// Create a staff member with the given role.
async fn create_staff(
    State(state): State<AdminState>,
    _auth: FreshAuth<SuperAdminOnly>,
    Json(req): Json<CreateStaffRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_email(&req.email)?;
    if req.password.len() < 8 {
        return Err(ApiError::bad_request("Password must be at least 8 characters"));
    }

    let hash = password::hash_password(&req.password)
        .map_err(|_| ApiError::internal("Failed to hash password"))?;
    let uuid = uuid::Uuid::new_v4().to_string();

    state
        .db
        .staff()
        .create(&uuid, &req.email, &hash, req.role)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|d| d.is_unique_violation())
            {
                ApiError::conflict("Email already in use")
            } else {
                ApiError::db_error("Failed to create staff member", e)
            }
        })?;

    let staff = state
        .db
        .staff()
        .get_by_uuid(&uuid)
        .await
        .db_err("Failed to load staff member")?
        .ok_or_else(|| ApiError::internal("Staff member vanished after creation"))?;

    Ok((StatusCode::CREATED, Json(staff)))
}

/// Delete a staff member. Self-deletion is rejected.
async fn delete_staff(
    State(state): State<AdminState>,
    auth: FreshAuth<SuperAdminOnly>,
    Path(uuid): Path<String>,
) -> Result<StatusCode, ApiError> {
    if auth.principal().id == uuid {
        return Err(ApiError::bad_request("Cannot delete your own account"));
    }

    let deleted = state
        .db
        .staff()
        .delete(&uuid)
        .await
        .db_err("Failed to delete staff member")?;
    if !deleted {
        return Err(ApiError::not_found("Staff member not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Change a staff member's role. Takes effect on outstanding access
/// tokens only at their next refresh.
async fn set_staff_role(
    State(state): State<AdminState>,
    _auth: FreshAuth<SuperAdminOnly>,
    Path(uuid): Path<String>,
    Json(req): Json<SetRoleRequest>,
) -> Result<StatusCode, ApiError> {
    let updated = state
        .db
        .staff()
        .set_role(&uuid, req.role)
        .await
        .db_err("Failed to update role")?;
    if !updated {
        return Err(ApiError::not_found("Staff member not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn set_staff_status(
    State(state): State<AdminState>,
    _auth: FreshAuth<SuperAdminOnly>,
    Path(uuid): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> Result<StatusCode, ApiError> {
    let updated = state
        .db
        .staff()
        .set_status(&uuid, req.status)
        .await
        .db_err("Failed to update status")?;
    if !updated {
        return Err(ApiError::not_found("Staff member not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// List all customers.
async fn list_customers(
    State(state): State<AdminState>,
    _auth: Auth<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let customers = state
        .db
        .customers()
        .list()
        .await
        .db_err("Failed to list customers")?;
    Ok(Json(customers))
}

async fn set_customer_status(
    State(state): State<AdminState>,
    _auth: FreshAuth<AdminOnly>,
    Path(uuid): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> Result<StatusCode, ApiError> {
    let updated = state
        .db
        .customers()
        .set_status(&uuid, req.status)
        .await
        .db_err("Failed to update status")?;
    if !updated {
        return Err(ApiError::not_found("Customer not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::bad_request("Email cannot be empty"));
    }
    if email.len() > 254 {
        return Err(ApiError::bad_request("Email is too long"));
    }
    if !email.contains('@') || email.contains(char::is_whitespace) {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    Ok(())
}
