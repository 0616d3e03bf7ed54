//! Credential store seam between the authenticator and persistence.
//!
//! The authenticator only ever sees this trait; SQL lives behind it.

use std::future::Future;

use thiserror::Error;

use super::principal::{PrincipalClass, PrincipalRecord};

/// Failure talking to the backing credential store. The source is kept
/// for server logs; the display message stays generic so nothing about
/// accounts or infrastructure leaks to callers.
#[derive(Debug, Error)]
#[error("credential store unavailable")]
pub struct StoreError(#[source] pub Box<dyn std::error::Error + Send + Sync + 'static>);

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self(Box::new(e))
    }
}

/// Lookup and bookkeeping operations the authenticator needs.
///
/// The lookup key is a property of the principal class: email for staff,
/// phone number for customers. Implementations decide the mapping.
pub trait CredentialStore: Send + Sync {
    /// Look up a principal by its login identifier.
    fn find_by_identifier(
        &self,
        identifier: &str,
        class: PrincipalClass,
    ) -> impl Future<Output = Result<Option<PrincipalRecord>, StoreError>> + Send;

    /// Look up a principal by its stable id.
    fn find_by_id(
        &self,
        id: &str,
        class: PrincipalClass,
    ) -> impl Future<Output = Result<Option<PrincipalRecord>, StoreError>> + Send;

    /// Record a successful authentication. Callers treat this as
    /// fire-and-forget: a failure is logged, never surfaced.
    fn record_authentication(
        &self,
        id: &str,
        class: PrincipalClass,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
