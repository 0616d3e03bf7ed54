//! Authentication and authorization core.
//!
//! Dual-token system over two principal classes: staff (email login,
//! role-tiered) and customers (phone login). Access tokens are short-lived
//! and verified statelessly; refresh tokens always go back to the
//! credential store so status and role changes take effect on rotation.

mod authenticator;
mod authorize;
mod errors;
mod extractors;
pub mod password;
mod principal;
mod state;
mod store;

pub use authenticator::{Authenticator, Session};
pub use authorize::{RoleRequirement, require_role};
pub use errors::{AuthError, AuthRejection, AuthzError};
pub use extractors::{
    AdminOnly, AnyPrincipal, Auth, FreshAuth, MaybeAuth, RoleConstraint, SuperAdminOnly,
    bearer_token,
};
pub use principal::{AccountStatus, Principal, PrincipalClass, PrincipalRecord, StaffRole};
pub use state::HasAuthState;
pub use store::{CredentialStore, StoreError};
