use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/events", post(handlers::event::create_event))
        .route("/api/events", get(handlers::event::list_events))
        // Static segment registered alongside :id; axum matches it first.
        .route(
            "/api/events/bookings",
            get(handlers::event::admin_bookings),
        )
        .route("/api/events/:id", get(handlers::event::get_event))
        .route("/api/events/:id", put(handlers::event::update_event))
        .route("/api/events/:id", delete(handlers::event::delete_event))
        .route(
            "/api/events/:id/publish",
            post(handlers::event::publish_event),
        )
        .route(
            "/api/events/:id/bookings",
            get(handlers::event::event_bookings),
        )
}
