//! # Bookline API
//!
//! The API crate provides the web server implementation for the Bookline
//! appointment-booking service. It defines RESTful endpoints for accounts,
//! events, public event pages and slot reservations.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Provide cross-cutting concerns like authentication,
//!   rate limiting and error handling
//! - **Notifier**: Best-effort transactional email
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database interactions.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for authentication, rate limiting, and error handling
pub mod middleware;
/// Best-effort transactional email
pub mod notifier;
/// Route definitions and API endpoint structure
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use eyre::Result;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::middleware::rate_limit::{InMemoryRateLimiter, RateLimiter};
use crate::notifier::{NoopNotifier, Notifier, SmtpNotifier};

/// Shared application state that is accessible to all request handlers.
///
/// Besides the connection pool this carries the injected capabilities:
/// the rate limiter and the notifier are trait objects so deployments can
/// swap implementations without touching call sites.
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Per-client request throttling (best-effort, per-process)
    pub rate_limiter: Arc<dyn RateLimiter>,
    /// Outgoing transactional email (fire-and-forget)
    pub notifier: Arc<dyn Notifier>,
    /// Server configuration
    pub config: config::ApiConfig,
}

/// Starts the API server with the provided configuration and database
/// connection: initializes logging, wires up state and routes, and serves
/// until shutdown.
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpNotifier::new(smtp.clone())),
        None => {
            info!("SMTP not configured; email notifications are disabled");
            Arc::new(NoopNotifier)
        }
    };

    // Create shared state with dependencies
    let state = Arc::new(ApiState {
        db_pool,
        rate_limiter: Arc::new(InMemoryRateLimiter::new()),
        notifier,
        config: config.clone(),
    });

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Registration, login and session management
        .merge(routes::auth::routes())
        // Profile management
        .merge(routes::user::routes())
        // Admin event management
        .merge(routes::event::routes())
        // Fan slot reservations
        .merge(routes::booking::routes())
        // Public event pages
        .merge(routes::public::routes())
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(
                origins
                    .iter()
                    .filter_map(|origin| origin.parse().ok())
                    .collect::<Vec<_>>(),
            )
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(tower_http::timeout::TimeoutLayer::new(
        std::time::Duration::from_secs(config.request_timeout),
    ));

    // Start the HTTP server. Client addresses feed the rate limiter keys.
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
