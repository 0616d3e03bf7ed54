//! Authentication state trait and macro.

use super::authenticator::Authenticator;
use crate::db::Database;

/// Trait for router state types that provide the session authenticator.
pub trait HasAuthState {
    fn authenticator(&self) -> &Authenticator<Database>;
}

/// Implement [`HasAuthState`] for a state struct with an
/// `auth: Arc<Authenticator<Database>>` field.
#[macro_export]
macro_rules! impl_has_auth_state {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthState for $state_type {
            fn authenticator(
                &self,
            ) -> &$crate::auth::Authenticator<$crate::db::Database> {
                &self.auth
            }
        }
    };
}
