use axum::{
    routing::{get, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/users/profile", get(handlers::user::get_profile))
        .route("/api/users/profile", put(handlers::user::update_profile))
        .route(
            "/api/users/password",
            put(handlers::user::change_password),
        )
}
