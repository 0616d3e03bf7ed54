use clap::Parser;
use shopwarden::cli::{
    Args, expiry_policy, handle_bootstrap_super_admin, init_logging, load_jwt_secret,
    open_database,
};
use shopwarden::{ServerConfig, create_app};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(jwt_secret) = load_jwt_secret(args.jwt_secret_file.as_deref()) else {
        std::process::exit(1);
    };

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    if let Some(email) = args.bootstrap_super_admin.as_deref() {
        handle_bootstrap_super_admin(&db, email).await;
    }

    let config = ServerConfig {
        db,
        jwt_secret,
        expiry: expiry_policy(&args),
    };

    let app = match create_app(&config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    info!(address = %listener.local_addr().unwrap(), "Listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
