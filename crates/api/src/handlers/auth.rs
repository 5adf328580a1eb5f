//! Registration, login and session lifecycle.

use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use std::net::SocketAddr;
use std::sync::Arc;

use bookline_core::{
    errors::BookingError,
    models::user::{
        AuthResponse, LoginRequest, MessageResponse, RegisterRequest, Role, SessionResponse,
        UserResponse,
    },
    validate,
};

use crate::{
    middleware::{
        auth::{self, BearerToken},
        error_handling::AppError,
        rate_limit::{self, Quota},
    },
    notifier::Notification,
    ApiState,
};

const REGISTER_QUOTA: Quota = Quota::per_minutes(5, 5);
const LOGIN_QUOTA: Quota = Quota::per_minutes(10, 5);

fn user_response(user: &bookline_db::models::DbUser, role: Role) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        role,
        created_at: user.created_at,
    }
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    rate_limit::enforce(
        state.rate_limiter.as_ref(),
        format!("auth:register:{}", addr.ip()),
        REGISTER_QUOTA,
    )
    .await?;

    let name = payload.name.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    validate::validate_name(&name)?;
    validate::validate_email(&email)?;
    validate::validate_password(&payload.password)?;

    let role = Role::parse(payload.role.trim()).ok_or_else(|| {
        BookingError::Validation("Role must be either \"admin\" or \"fan\"".to_string())
    })?;

    // Checked up front for a friendly message; the unique index on email
    // still catches a raced duplicate.
    let existing = bookline_db::repositories::user::get_user_by_email(&state.db_pool, &email)
        .await
        .map_err(BookingError::Database)?;
    if existing.is_some() {
        return Err(AppError(BookingError::Conflict(
            "User with this email already exists".to_string(),
        )));
    }

    let password_hash = auth::hash_password(&payload.password)?;

    // A registration raced past the pre-check hits the unique index and
    // still comes back as the same 409.
    let user = bookline_db::repositories::user::create_user(
        &state.db_pool,
        &email,
        &password_hash,
        &name,
        role.as_str(),
    )
    .await?;

    let token = auth::generate_session_token();
    let expires_at = Utc::now() + Duration::hours(state.config.session_ttl_hours);
    bookline_db::repositories::session::create_session(&state.db_pool, user.id, &token, expires_at)
        .await
        .map_err(BookingError::Database)?;

    state.notifier.notify(Notification::Welcome {
        to: user.email.clone(),
        name: user.name.clone(),
        verification_url: format!("{}/verify-email", state.config.frontend_url),
    });

    let response = AuthResponse {
        user: user_response(&user, role),
        access_token: token,
        expires_at,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<ApiState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    rate_limit::enforce(
        state.rate_limiter.as_ref(),
        format!("auth:login:{}", addr.ip()),
        LOGIN_QUOTA,
    )
    .await?;

    let email = payload.email.trim().to_lowercase();

    // Login doubles as the cleanup point for sessions past their expiry.
    bookline_db::repositories::session::delete_expired_sessions(&state.db_pool)
        .await
        .map_err(BookingError::Database)?;

    let user = bookline_db::repositories::user::get_user_by_email(&state.db_pool, &email)
        .await
        .map_err(BookingError::Database)?;

    // Same failure for unknown email and wrong password.
    let invalid =
        || BookingError::Authentication("Invalid email or password".to_string());

    let user = user.ok_or_else(invalid)?;
    if !auth::verify_password(&user.password_hash, &payload.password)? {
        return Err(AppError(invalid()));
    }

    let role = Role::parse(&user.role).ok_or_else(|| {
        BookingError::Internal(format!("Unknown role in store: {}", user.role).into())
    })?;

    let token = auth::generate_session_token();
    let expires_at = Utc::now() + Duration::hours(state.config.session_ttl_hours);
    bookline_db::repositories::session::create_session(&state.db_pool, user.id, &token, expires_at)
        .await
        .map_err(BookingError::Database)?;

    let response = AuthResponse {
        user: user_response(&user, role),
        access_token: token,
        expires_at,
    };

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn refresh(
    State(state): State<Arc<ApiState>>,
    bearer: BearerToken,
) -> Result<Json<SessionResponse>, AppError> {
    let expires_at = Utc::now() + Duration::hours(state.config.session_ttl_hours);

    let session =
        bookline_db::repositories::session::extend_session(&state.db_pool, &bearer.0, expires_at)
            .await
            .map_err(BookingError::Database)?
            .ok_or_else(|| {
                BookingError::Authentication("Invalid or expired session".to_string())
            })?;

    Ok(Json(SessionResponse {
        access_token: session.token,
        expires_at: session.expires_at,
    }))
}

#[axum::debug_handler]
pub async fn logout(
    State(state): State<Arc<ApiState>>,
    bearer: BearerToken,
) -> Result<Json<MessageResponse>, AppError> {
    bookline_db::repositories::session::delete_session(&state.db_pool, &bearer.0)
        .await
        .map_err(BookingError::Database)?;

    Ok(Json(MessageResponse {
        message: "Logout successful".to_string(),
    }))
}
