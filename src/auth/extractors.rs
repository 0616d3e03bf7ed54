//! Axum extractors for bearer-token authentication.

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use super::authorize::{RoleRequirement, require_role};
use super::errors::AuthRejection;
use super::principal::Principal;
use super::state::HasAuthState;

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Role requirement attached to an extractor at the type level.
pub trait RoleConstraint {
    const REQUIRED: RoleRequirement;
}

/// Any authenticated principal.
pub struct AnyPrincipal;

impl RoleConstraint for AnyPrincipal {
    const REQUIRED: RoleRequirement = RoleRequirement::Authenticated;
}

/// Staff with role admin or super_admin.
pub struct AdminOnly;

impl RoleConstraint for AdminOnly {
    const REQUIRED: RoleRequirement = RoleRequirement::Admin;
}

/// Staff with role super_admin.
pub struct SuperAdminOnly;

impl RoleConstraint for SuperAdminOnly {
    const REQUIRED: RoleRequirement = RoleRequirement::SuperAdmin;
}

/// Extractor for endpoints that require authentication.
///
/// Stateless: the principal comes from the signed access token, with no
/// credential store round trip. The role seen here is the role at
/// issuance time.
pub struct Auth<C: RoleConstraint = AnyPrincipal>(pub Principal, PhantomData<C>);

impl<C: RoleConstraint> Auth<C> {
    pub fn principal(&self) -> &Principal {
        &self.0
    }

    pub fn into_principal(self) -> Principal {
        self.0
    }
}

impl<S, C> FromRequestParts<S> for Auth<C>
where
    S: HasAuthState + Send + Sync,
    C: RoleConstraint,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AuthRejection::MissingToken)?;
        let principal = state.authenticator().verify(token).await?;
        require_role(Some(&principal), C::REQUIRED)?;
        Ok(Auth(principal, PhantomData))
    }
}

/// Like [`Auth`], but re-reads the principal's current status and role
/// from the credential store. Used on mutating routes where a suspended
/// account or a stale role must not slip through on an old token.
pub struct FreshAuth<C: RoleConstraint = AnyPrincipal>(pub Principal, PhantomData<C>);

impl<C: RoleConstraint> FreshAuth<C> {
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

impl<S, C> FromRequestParts<S> for FreshAuth<C>
where
    S: HasAuthState + Send + Sync,
    C: RoleConstraint,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AuthRejection::MissingToken)?;
        let principal = state.authenticator().verify_fresh(token).await?;
        require_role(Some(&principal), C::REQUIRED)?;
        Ok(FreshAuth(principal, PhantomData))
    }
}

/// Optional authentication extractor. Never fails; endpoints that work
/// both authenticated and anonymous get `None` on any auth failure.
pub struct MaybeAuth(pub Option<Principal>);

impl<S> FromRequestParts<S> for MaybeAuth
where
    S: HasAuthState + Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = match bearer_token(&parts.headers) {
            Some(token) => state.authenticator().verify(token).await.ok(),
            None => None,
        };
        Ok(MaybeAuth(principal))
    }
}
