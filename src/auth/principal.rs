//! Principal types shared by the token codec, authenticator, and stores.

use serde::{Deserialize, Serialize};

/// Principal class for separating the two credential namespaces.
///
/// Staff authenticate by email and carry a role; customers authenticate by
/// phone number. Each class has its own token expiry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalClass {
    Staff,
    Customer,
}

impl PrincipalClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalClass::Staff => "staff",
            PrincipalClass::Customer => "customer",
        }
    }
}

/// Staff permission tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Admin,
    SuperAdmin,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::SuperAdmin => "super_admin",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "super_admin" => StaffRole::SuperAdmin,
            _ => StaffRole::Admin,
        }
    }
}

/// Account status. Only `Active` principals may authenticate or refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Inactive,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
            AccountStatus::Suspended => "suspended",
        }
    }

    /// Unknown values parse as `Inactive` so a corrupt row can never authenticate.
    pub fn from_str(s: &str) -> Self {
        match s {
            "active" => AccountStatus::Active,
            "suspended" => AccountStatus::Suspended,
            _ => AccountStatus::Inactive,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, AccountStatus::Active)
    }
}

/// An authenticated actor. Never carries its secret hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    /// Stable identifier, unique within the principal class namespace.
    pub id: String,
    pub class: PrincipalClass,
    /// Present for staff, always `None` for customers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<StaffRole>,
    pub status: AccountStatus,
}

impl Principal {
    pub fn staff(id: impl Into<String>, role: StaffRole, status: AccountStatus) -> Self {
        Self {
            id: id.into(),
            class: PrincipalClass::Staff,
            role: Some(role),
            status,
        }
    }

    pub fn customer(id: impl Into<String>, status: AccountStatus) -> Self {
        Self {
            id: id.into(),
            class: PrincipalClass::Customer,
            role: None,
            status,
        }
    }
}

/// A principal together with its secret hash, as loaded from the credential
/// store. The hash is consumed during credential verification and dropped;
/// it is never serialized into a token or a response.
#[derive(Clone)]
pub struct PrincipalRecord {
    principal: Principal,
    secret_hash: String,
}

impl PrincipalRecord {
    pub fn new(principal: Principal, secret_hash: String) -> Self {
        Self {
            principal,
            secret_hash,
        }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn secret_hash(&self) -> &str {
        &self.secret_hash
    }

    /// Strip the secret, leaving only what business code may see.
    pub fn into_principal(self) -> Principal {
        self.principal
    }
}

// Hand-written so the hash can never end up in logs.
impl std::fmt::Debug for PrincipalRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrincipalRecord")
            .field("principal", &self.principal)
            .field("secret_hash", &"<redacted>")
            .finish()
    }
}
