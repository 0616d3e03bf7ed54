//! Session authenticator: the only component that mints tokens or
//! resolves a token into a live principal.
//!
//! Verification of an access token is stateless. Refresh always goes back
//! to the credential store so status and role changes take effect on the
//! next rotation, never later.

use tracing::{debug, warn};

use super::errors::AuthError;
use super::password;
use super::principal::{Principal, PrincipalClass};
use super::store::CredentialStore;
use crate::jwt::{IssuedToken, TokenCodec, TokenPurpose};

/// An authenticated principal with a fresh access/refresh token pair.
#[derive(Debug, Clone)]
pub struct Session {
    pub principal: Principal,
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

pub struct Authenticator<S> {
    codec: TokenCodec,
    store: S,
}

impl<S: CredentialStore> Authenticator<S> {
    pub fn new(codec: TokenCodec, store: S) -> Self {
        Self { codec, store }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Verify credentials and issue a token pair.
    ///
    /// Unknown identifier and wrong secret both return
    /// `InvalidCredentials`; the cases are only told apart in debug logs.
    /// The last-login write is best effort: its failure never fails a
    /// login that already succeeded.
    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
        class: PrincipalClass,
    ) -> Result<Session, AuthError> {
        let Some(record) = self.store.find_by_identifier(identifier, class).await? else {
            debug!(class = class.as_str(), "login rejected: unknown identifier");
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify_password(record.secret_hash(), secret) {
            debug!(class = class.as_str(), "login rejected: secret mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let principal = record.into_principal();
        if !principal.status.is_active() {
            return Err(AuthError::AccountNotActive);
        }

        if let Err(e) = self.store.record_authentication(&principal.id, class).await {
            warn!(error = %e.0, "failed to record authentication event");
        }

        self.issue_session(principal)
    }

    /// Resolve an access token into a principal. No store round trip: the
    /// role and status are the ones signed at issuance.
    pub async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self
            .codec
            .verify(token, TokenPurpose::Access)
            .map_err(AuthError::AuthenticationFailed)?;
        Ok(claims.principal())
    }

    /// Resolve an access token, then re-read the principal's current
    /// state from the store. Used where staleness matters.
    pub async fn verify_fresh(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self
            .codec
            .verify(token, TokenPurpose::Access)
            .map_err(AuthError::AuthenticationFailed)?;

        let record = self
            .store
            .find_by_id(&claims.sub, claims.class)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        let principal = record.into_principal();
        if !principal.status.is_active() {
            return Err(AuthError::AccountNotActive);
        }
        Ok(principal)
    }

    /// Exchange a refresh token for a brand-new token pair.
    ///
    /// The stale claims are never trusted for this path: the principal is
    /// re-fetched, its status re-checked, and the new access token carries
    /// the store's current role.
    pub async fn refresh(&self, token: &str) -> Result<Session, AuthError> {
        let claims = self
            .codec
            .verify(token, TokenPurpose::Refresh)
            .map_err(AuthError::InvalidRefreshToken)?;

        let record = self
            .store
            .find_by_id(&claims.sub, claims.class)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        let principal = record.into_principal();
        if !principal.status.is_active() {
            return Err(AuthError::AccountNotActive);
        }

        self.issue_session(principal)
    }

    /// Stateless logout. Outstanding tokens stay valid until natural
    /// expiry; there is no server-side revocation list. The request-scoped
    /// principal dies with the request that carried it.
    pub fn logout(&self) {}

    fn issue_session(&self, principal: Principal) -> Result<Session, AuthError> {
        let access = self
            .codec
            .issue(&principal, TokenPurpose::Access)
            .map_err(AuthError::IssueFailed)?;
        let refresh = self
            .codec
            .issue(&principal, TokenPurpose::Refresh)
            .map_err(AuthError::IssueFailed)?;
        Ok(Session {
            principal,
            access,
            refresh,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccountStatus, PrincipalRecord, StaffRole, StoreError};
    use crate::jwt::ExpiryPolicy;
    use std::sync::Mutex;

    struct StoredRecord {
        identifier: String,
        record: PrincipalRecord,
    }

    /// In-memory credential store for authenticator tests.
    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<Vec<StoredRecord>>,
        fail_record_authentication: bool,
    }

    impl MemoryStore {
        fn insert(&self, identifier: &str, principal: Principal, secret: &str) {
            let hash = password::hash_password(secret).unwrap();
            self.records.lock().unwrap().push(StoredRecord {
                identifier: identifier.to_string(),
                record: PrincipalRecord::new(principal, hash),
            });
        }

        fn set_status(&self, id: &str, status: AccountStatus) {
            for stored in self.records.lock().unwrap().iter_mut() {
                if stored.record.principal().id == id {
                    let mut principal = stored.record.principal().clone();
                    principal.status = status;
                    stored.record =
                        PrincipalRecord::new(principal, stored.record.secret_hash().to_string());
                }
            }
        }

        fn set_role(&self, id: &str, role: StaffRole) {
            for stored in self.records.lock().unwrap().iter_mut() {
                if stored.record.principal().id == id {
                    let mut principal = stored.record.principal().clone();
                    principal.role = Some(role);
                    stored.record =
                        PrincipalRecord::new(principal, stored.record.secret_hash().to_string());
                }
            }
        }

        fn remove(&self, id: &str) {
            self.records
                .lock()
                .unwrap()
                .retain(|s| s.record.principal().id != id);
        }
    }

    impl CredentialStore for MemoryStore {
        async fn find_by_identifier(
            &self,
            identifier: &str,
            class: PrincipalClass,
        ) -> Result<Option<PrincipalRecord>, StoreError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.identifier == identifier && s.record.principal().class == class)
                .map(|s| s.record.clone()))
        }

        async fn find_by_id(
            &self,
            id: &str,
            class: PrincipalClass,
        ) -> Result<Option<PrincipalRecord>, StoreError> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.record.principal().id == id && s.record.principal().class == class)
                .map(|s| s.record.clone()))
        }

        async fn record_authentication(
            &self,
            _id: &str,
            _class: PrincipalClass,
        ) -> Result<(), StoreError> {
            if self.fail_record_authentication {
                return Err(StoreError(Box::new(std::io::Error::other("write failed"))));
            }
            Ok(())
        }
    }

    fn authenticator(store: MemoryStore) -> Authenticator<MemoryStore> {
        let codec = TokenCodec::new(b"test-secret-key-for-testing-1234", ExpiryPolicy::default())
            .unwrap();
        Authenticator::new(codec, store)
    }

    fn store_with_admin() -> MemoryStore {
        let store = MemoryStore::default();
        store.insert(
            "alice@shop.example",
            Principal::staff("staff-1", StaffRole::Admin, AccountStatus::Active),
            "correct horse",
        );
        store
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_pair() {
        let auth = authenticator(store_with_admin());

        let session = auth
            .login("alice@shop.example", "correct horse", PrincipalClass::Staff)
            .await
            .unwrap();

        assert_eq!(session.principal.id, "staff-1");
        assert_eq!(session.principal.role, Some(StaffRole::Admin));

        let principal = auth.verify(&session.access.token).await.unwrap();
        assert_eq!(principal.id, "staff-1");

        // The refresh token is not an access token.
        assert!(matches!(
            auth.verify(&session.refresh.token).await,
            Err(AuthError::AuthenticationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_identifier_and_wrong_secret_are_identical() {
        let auth = authenticator(store_with_admin());

        let unknown = auth
            .login("nobody@shop.example", "correct horse", PrincipalClass::Staff)
            .await;
        let mismatch = auth
            .login("alice@shop.example", "wrong", PrincipalClass::Staff)
            .await;

        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
        assert!(matches!(mismatch, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_rejected_for_non_active_status() {
        let store = store_with_admin();
        store.set_status("staff-1", AccountStatus::Suspended);
        let auth = authenticator(store);

        assert!(matches!(
            auth.login("alice@shop.example", "correct horse", PrincipalClass::Staff)
                .await,
            Err(AuthError::AccountNotActive)
        ));
    }

    #[tokio::test]
    async fn test_classes_do_not_share_identifiers() {
        let auth = authenticator(store_with_admin());

        assert!(matches!(
            auth.login(
                "alice@shop.example",
                "correct horse",
                PrincipalClass::Customer
            )
            .await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_failed_last_login_write_does_not_fail_login() {
        let mut store = store_with_admin();
        store.fail_record_authentication = true;
        let auth = authenticator(store);

        assert!(
            auth.login("alice@shop.example", "correct horse", PrincipalClass::Staff)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_refresh_rotates_pair() {
        let auth = authenticator(store_with_admin());
        let session = auth
            .login("alice@shop.example", "correct horse", PrincipalClass::Staff)
            .await
            .unwrap();

        let rotated = auth.refresh(&session.refresh.token).await.unwrap();
        assert_eq!(rotated.principal.id, "staff-1");
        assert!(auth.verify(&rotated.access.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_rechecks_status_from_store() {
        let auth = authenticator(store_with_admin());
        let session = auth
            .login("alice@shop.example", "correct horse", PrincipalClass::Staff)
            .await
            .unwrap();

        // Deactivated after issuance: the stale claims still say active,
        // the store does not.
        auth.store.set_status("staff-1", AccountStatus::Inactive);

        assert!(matches!(
            auth.refresh(&session.refresh.token).await,
            Err(AuthError::AccountNotActive)
        ));
    }

    #[tokio::test]
    async fn test_refresh_of_deleted_principal() {
        let auth = authenticator(store_with_admin());
        let session = auth
            .login("alice@shop.example", "correct horse", PrincipalClass::Staff)
            .await
            .unwrap();

        auth.store.remove("staff-1");

        assert!(matches!(
            auth.refresh(&session.refresh.token).await,
            Err(AuthError::PrincipalNotFound)
        ));
    }

    #[tokio::test]
    async fn test_role_is_stale_until_refresh() {
        let auth = authenticator(store_with_admin());
        let session = auth
            .login("alice@shop.example", "correct horse", PrincipalClass::Staff)
            .await
            .unwrap();

        auth.store.set_role("staff-1", StaffRole::SuperAdmin);

        // The outstanding access token keeps the role it was signed with.
        let stale = auth.verify(&session.access.token).await.unwrap();
        assert_eq!(stale.role, Some(StaffRole::Admin));

        // A fresh verify and a refreshed pair see the new role.
        let fresh = auth.verify_fresh(&session.access.token).await.unwrap();
        assert_eq!(fresh.role, Some(StaffRole::SuperAdmin));

        let rotated = auth.refresh(&session.refresh.token).await.unwrap();
        let current = auth.verify(&rotated.access.token).await.unwrap();
        assert_eq!(current.role, Some(StaffRole::SuperAdmin));
    }

    #[tokio::test]
    async fn test_access_token_rejected_by_refresh() {
        let auth = authenticator(store_with_admin());
        let session = auth
            .login("alice@shop.example", "correct horse", PrincipalClass::Staff)
            .await
            .unwrap();

        assert!(matches!(
            auth.refresh(&session.access.token).await,
            Err(AuthError::InvalidRefreshToken(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_fresh_rejects_suspended() {
        let auth = authenticator(store_with_admin());
        let session = auth
            .login("alice@shop.example", "correct horse", PrincipalClass::Staff)
            .await
            .unwrap();

        auth.store.set_status("staff-1", AccountStatus::Suspended);

        // Stateless verify still passes; the fresh check does not.
        assert!(auth.verify(&session.access.token).await.is_ok());
        assert!(matches!(
            auth.verify_fresh(&session.access.token).await,
            Err(AuthError::AccountNotActive)
        ));
    }
}
