//! Role evaluation: a pure function of (principal, requirement).

use super::errors::AuthzError;
use super::principal::{Principal, PrincipalClass, StaffRole};

/// Access requirement a route declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Any authenticated principal, staff or customer.
    Authenticated,
    /// Staff with role admin or super_admin.
    Admin,
    /// Staff with role super_admin.
    SuperAdmin,
}

/// Decide whether a principal satisfies a requirement.
///
/// `super_admin` satisfies both staff requirements, `admin` satisfies only
/// `Admin`, and customers never satisfy a staff requirement. No I/O, no
/// caching: deterministic over its inputs.
pub fn require_role(
    principal: Option<&Principal>,
    required: RoleRequirement,
) -> Result<(), AuthzError> {
    let principal = principal.ok_or(AuthzError::Unauthenticated)?;

    let staff_role = match (principal.class, principal.role) {
        (PrincipalClass::Staff, Some(role)) => Some(role),
        _ => None,
    };

    let satisfied = match required {
        RoleRequirement::Authenticated => true,
        RoleRequirement::Admin => staff_role.is_some(),
        RoleRequirement::SuperAdmin => staff_role == Some(StaffRole::SuperAdmin),
    };

    if satisfied {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole)
    }
}
