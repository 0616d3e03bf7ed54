//! Authentication and authorization error types, and their HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::store::StoreError;
use crate::jwt::TokenError;

/// Authentication failures. Every variant is a typed result the caller
/// must handle; nothing here is caught-and-continued.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown identifier or wrong secret. The two cases are deliberately
    /// indistinguishable to callers.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Principal exists but its status is not active.
    #[error("account not active")]
    AccountNotActive,
    /// Principal deleted between token issuance and use. Surfaced to
    /// clients exactly like `AccountNotActive`.
    #[error("principal not found")]
    PrincipalNotFound,
    /// Access token failed verification.
    #[error("authentication failed")]
    AuthenticationFailed(#[source] TokenError),
    /// Refresh token failed verification.
    #[error("invalid refresh token")]
    InvalidRefreshToken(#[source] TokenError),
    /// Token issuance failed after successful authentication.
    #[error("token issuance failed")]
    IssueFailed(#[source] TokenError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Authorization failures, distinct from authentication failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("insufficient role")]
    InsufficientRole,
}

/// Rejection returned by the auth extractors. Maps the error taxonomy to
/// status codes and generic JSON bodies.
#[derive(Debug)]
pub enum AuthRejection {
    /// No bearer token on the request.
    MissingToken,
    Auth(AuthError),
    Authz(AuthzError),
}

impl From<AuthError> for AuthRejection {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

impl From<AuthzError> for AuthRejection {
    fn from(e: AuthzError) -> Self {
        Self::Authz(e)
    }
}

impl AuthRejection {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::Auth(AuthError::Store(_)) | Self::Auth(AuthError::IssueFailed(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Authz(_) => StatusCode::FORBIDDEN,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::MissingToken => "Not authenticated",
            Self::Auth(AuthError::InvalidCredentials) => "Invalid credentials",
            // Not-found is reported as not-active so token holders learn
            // nothing about account deletion.
            Self::Auth(AuthError::AccountNotActive)
            | Self::Auth(AuthError::PrincipalNotFound) => "Account not active",
            // Expired gets its own message so clients know to refresh.
            Self::Auth(AuthError::AuthenticationFailed(TokenError::Expired)) => "Token expired",
            Self::Auth(AuthError::AuthenticationFailed(_)) => "Invalid token",
            Self::Auth(AuthError::InvalidRefreshToken(_)) => "Invalid refresh token",
            Self::Auth(AuthError::IssueFailed(_)) => "Token error",
            Self::Auth(AuthError::Store(_)) => "Database error",
            Self::Authz(AuthzError::Unauthenticated) => "Authentication required",
            Self::Authz(AuthzError::InsufficientRole) => "Insufficient permissions",
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        use serde::Serialize;

        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        if let Self::Auth(AuthError::Store(ref e)) = self {
            tracing::error!(error = %e.0, "credential store failure during authentication");
        }

        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}
