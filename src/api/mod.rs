mod admin;
mod error;
mod sessions;

use axum::Router;
use std::sync::Arc;

use crate::auth::Authenticator;
use crate::db::Database;

/// Create the API router.
pub fn create_api_router(db: Database, auth: Arc<Authenticator<Database>>) -> Router {
    let sessions_state = sessions::SessionsState {
        db: db.clone(),
        auth: auth.clone(),
    };

    let admin_state = admin::AdminState { db, auth };

    Router::new()
        .nest("/auth", sessions::router(sessions_state))
        .nest("/admin", admin::router(admin_state))
}
