//! JWT token generation and validation.
//!
//! Tokens are compact HS256 JWS strings. The purpose (access vs refresh)
//! is embedded in the signed payload, so a refresh token presented to an
//! access-token check fails inside the codec rather than at the endpoint.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::auth::{AccountStatus, Principal, PrincipalClass, StaffRole};

/// Minimum signing secret length in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Token purpose. An access token authorizes API calls; a refresh token
/// authorizes minting a new pair. The two are never interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    Refresh,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Access => "access",
            TokenPurpose::Refresh => "refresh",
        }
    }
}

/// Signed claim set carried by every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal id)
    pub sub: String,
    /// Token purpose
    pub purpose: TokenPurpose,
    /// Principal class, so verification can apply class-specific rules
    /// without a store round trip
    pub class: PrincipalClass,
    /// Staff role, present only on staff access tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<StaffRole>,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl Claims {
    /// Rebuild a principal from verified claims. The status reflects
    /// issuance time: tokens are only ever minted for active principals.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.sub.clone(),
            class: self.class,
            role: self.role,
            status: AccountStatus::Active,
        }
    }
}

/// Token lifetimes per `(principal class, purpose)`.
///
/// All four entries are mandatory; zero values are rejected when the codec
/// is constructed, never silently defaulted at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryPolicy {
    pub staff_access_secs: u64,
    pub staff_refresh_secs: u64,
    pub customer_access_secs: u64,
    pub customer_refresh_secs: u64,
}

impl ExpiryPolicy {
    /// Staff access token default: 15 minutes
    pub const DEFAULT_STAFF_ACCESS_SECS: u64 = 15 * 60;
    /// Staff refresh token default: 7 days
    pub const DEFAULT_STAFF_REFRESH_SECS: u64 = 7 * 24 * 60 * 60;
    /// Customer access token default: 1 hour
    pub const DEFAULT_CUSTOMER_ACCESS_SECS: u64 = 60 * 60;
    /// Customer refresh token default: 30 days
    pub const DEFAULT_CUSTOMER_REFRESH_SECS: u64 = 30 * 24 * 60 * 60;

    pub fn lifetime(&self, class: PrincipalClass, purpose: TokenPurpose) -> u64 {
        match (class, purpose) {
            (PrincipalClass::Staff, TokenPurpose::Access) => self.staff_access_secs,
            (PrincipalClass::Staff, TokenPurpose::Refresh) => self.staff_refresh_secs,
            (PrincipalClass::Customer, TokenPurpose::Access) => self.customer_access_secs,
            (PrincipalClass::Customer, TokenPurpose::Refresh) => self.customer_refresh_secs,
        }
    }

    fn entries(&self) -> [(&'static str, u64); 4] {
        [
            ("staff access", self.staff_access_secs),
            ("staff refresh", self.staff_refresh_secs),
            ("customer access", self.customer_access_secs),
            ("customer refresh", self.customer_refresh_secs),
        ]
    }
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            staff_access_secs: Self::DEFAULT_STAFF_ACCESS_SECS,
            staff_refresh_secs: Self::DEFAULT_STAFF_REFRESH_SECS,
            customer_access_secs: Self::DEFAULT_CUSTOMER_ACCESS_SECS,
            customer_refresh_secs: Self::DEFAULT_CUSTOMER_REFRESH_SECS,
        }
    }
}

/// Startup-time configuration errors. Fatal; never a per-request condition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("signing secret must be at least {MIN_SECRET_LENGTH} bytes")]
    SecretTooShort,
    #[error("{0} token lifetime must be non-zero")]
    ZeroLifetime(&'static str),
}

/// Errors from token issuance or verification. The kinds are distinct
/// because callers respond differently: expired prompts a refresh, the
/// rest are rejected outright.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token purpose mismatch")]
    PurposeMismatch,
    #[error("malformed token")]
    Malformed,
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("system clock is before the Unix epoch")]
    Time,
}

/// A freshly issued token with its validity window.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The compact JWS string
    pub token: String,
    /// Issued at (Unix seconds)
    pub issued_at: u64,
    /// Expiration (Unix seconds)
    pub expires_at: u64,
}

/// Codec for issuing and verifying signed tokens.
///
/// Secret and expiry policy are validated once at construction; `issue`
/// and `verify` never re-check configuration.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    policy: ExpiryPolicy,
}

impl TokenCodec {
    pub fn new(secret: &[u8], policy: ExpiryPolicy) -> Result<Self, ConfigError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort);
        }
        for (name, secs) in policy.entries() {
            if secs == 0 {
                return Err(ConfigError::ZeroLifetime(name));
            }
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            policy,
        })
    }

    pub fn policy(&self) -> &ExpiryPolicy {
        &self.policy
    }

    /// Issue a signed token for a principal. The lifetime comes from the
    /// expiry policy entry for `(principal.class, purpose)`; the role is
    /// embedded only on staff access tokens.
    pub fn issue(
        &self,
        principal: &Principal,
        purpose: TokenPurpose,
    ) -> Result<IssuedToken, TokenError> {
        let now = unix_now()?;
        let exp = now + self.policy.lifetime(principal.class, purpose);

        let role = match (principal.class, purpose) {
            (PrincipalClass::Staff, TokenPurpose::Access) => principal.role,
            _ => None,
        };

        let claims = Claims {
            sub: principal.id.clone(),
            purpose,
            class: principal.class,
            role,
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)?;

        Ok(IssuedToken {
            token,
            issued_at: now,
            expires_at: exp,
        })
    }

    /// Verify signature and expiry, then check the embedded purpose.
    pub fn verify(&self, token: &str, expected: TokenPurpose) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        let claims = token_data.claims;

        if claims.purpose != expected {
            return Err(TokenError::PurposeMismatch);
        }

        // A staff access token without a role claim was not minted by us.
        if claims.class == PrincipalClass::Staff
            && claims.purpose == TokenPurpose::Access
            && claims.role.is_none()
        {
            return Err(TokenError::Malformed);
        }

        Ok(claims)
    }
}

fn unix_now() -> Result<u64, TokenError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| TokenError::Time)
}
