//! CLI argument parsing, validation, and startup helpers.

use clap::Parser;
use rand::{Rng, distr::Alphanumeric};
use tracing::{error, info};

use crate::auth::{StaffRole, password};
use crate::db::Database;
use crate::jwt::{ExpiryPolicy, MIN_SECRET_LENGTH};

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "Shopwarden", about = "Storefront authentication service")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "7310")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "shopwarden.db")]
    pub database: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Create a super admin with this email on startup and print a one-time password
    #[arg(long)]
    pub bootstrap_super_admin: Option<String>,

    /// Staff access token lifetime in seconds
    #[arg(long, default_value_t = ExpiryPolicy::DEFAULT_STAFF_ACCESS_SECS)]
    pub staff_access_ttl: u64,

    /// Staff refresh token lifetime in seconds
    #[arg(long, default_value_t = ExpiryPolicy::DEFAULT_STAFF_REFRESH_SECS)]
    pub staff_refresh_ttl: u64,

    /// Customer access token lifetime in seconds
    #[arg(long, default_value_t = ExpiryPolicy::DEFAULT_CUSTOMER_ACCESS_SECS)]
    pub customer_access_ttl: u64,

    /// Customer refresh token lifetime in seconds
    #[arg(long, default_value_t = ExpiryPolicy::DEFAULT_CUSTOMER_REFRESH_SECS)]
    pub customer_refresh_ttl: u64,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<Vec<u8>> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        secret.into_bytes()
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!("No JWT secret provided. Set JWT_SECRET env var or use --jwt-secret-file");
        return None;
    };

    // Strip a trailing newline that most secret files carry.
    let secret = match secret.last() {
        Some(b'\n') => &secret[..secret.len() - 1],
        _ => &secret[..],
    };

    if secret.len() < MIN_SECRET_LENGTH {
        error!(
            "JWT secret must be at least {} bytes, got {}",
            MIN_SECRET_LENGTH,
            secret.len()
        );
        return None;
    }

    Some(secret.to_vec())
}

/// Open the database, logging an error on failure.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => Some(db),
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

/// Build the expiry policy from CLI arguments. Zero values are caught
/// later by `TokenCodec::new`.
pub fn expiry_policy(args: &Args) -> ExpiryPolicy {
    ExpiryPolicy {
        staff_access_secs: args.staff_access_ttl,
        staff_refresh_secs: args.staff_refresh_ttl,
        customer_access_secs: args.customer_access_ttl,
        customer_refresh_secs: args.customer_refresh_ttl,
    }
}

/// Create a super admin account with a generated password and print the
/// password once. Skipped if the email is already taken.
pub async fn handle_bootstrap_super_admin(db: &Database, email: &str) {
    match db.staff().find_credentials_by_email(email).await {
        Ok(Some(_)) => {
            info!(email = %email, "Super admin already exists, skipping bootstrap");
            return;
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "Failed to check for existing super admin");
            return;
        }
    }

    let one_time_password: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect();

    let Ok(hash) = password::hash_password(&one_time_password) else {
        error!("Failed to hash bootstrap password");
        return;
    };

    let uuid = uuid::Uuid::new_v4().to_string();
    match db
        .staff()
        .create(&uuid, email, &hash, StaffRole::SuperAdmin)
        .await
    {
        Ok(_) => {
            info!(email = %email, "Created bootstrap super admin");
            println!("Super admin created: {}", email);
            println!("One-time password: {}", one_time_password);
            println!("Log in and change it immediately.");
        }
        Err(e) => {
            error!(error = %e, "Failed to create bootstrap super admin");
        }
    }
}
