pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;

use api::create_api_router;
use auth::Authenticator;
use axum::Router;
use db::Database;
use jwt::{ConfigError, ExpiryPolicy, TokenCodec};
use std::sync::Arc;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing tokens, at least 32 bytes
    pub jwt_secret: Vec<u8>,
    /// Token lifetimes per (principal class, purpose)
    pub expiry: ExpiryPolicy,
}

/// Create the application router with the given configuration.
///
/// Configuration problems (undersized secret, zero token lifetime) fail
/// here, before the server ever binds a listener.
pub fn create_app(config: &ServerConfig) -> Result<Router, ConfigError> {
    let codec = TokenCodec::new(&config.jwt_secret, config.expiry.clone())?;
    let auth = Arc::new(Authenticator::new(codec, config.db.clone()));

    Ok(Router::new().nest("/api", create_api_router(config.db.clone(), auth)))
}
