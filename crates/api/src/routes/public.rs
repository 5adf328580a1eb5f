use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/public/events/:unique_url",
            get(handlers::public::get_public_event),
        )
        .route(
            "/api/public/events/:unique_url/slots",
            get(handlers::public::get_public_event_slots),
        )
}
