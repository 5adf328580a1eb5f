//! Profile management for authenticated users.

use axum::{extract::State, Json};
use std::sync::Arc;

use bookline_core::{
    errors::BookingError,
    models::user::{
        ChangePasswordRequest, MessageResponse, UpdateProfileRequest, UserResponse,
    },
    validate,
};

use crate::{
    middleware::{
        auth::{self, AuthUser},
        error_handling::AppError,
    },
    ApiState,
};

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let db_user = bookline_db::repositories::user::get_user_by_id(&state.db_pool, user.id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse {
        id: db_user.id,
        email: db_user.email,
        name: db_user.name,
        role: user.role,
        created_at: db_user.created_at,
    }))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let name = match &payload.name {
        Some(name) => {
            let name = name.trim().to_string();
            validate::validate_name(&name)?;
            Some(name)
        }
        None => None,
    };

    let email = match &payload.email {
        Some(email) => {
            let email = email.trim().to_lowercase();
            validate::validate_email(&email)?;

            let existing =
                bookline_db::repositories::user::get_user_by_email(&state.db_pool, &email)
                    .await
                    .map_err(BookingError::Database)?;
            if existing.is_some_and(|u| u.id != user.id) {
                return Err(AppError(BookingError::Conflict(
                    "Email already taken".to_string(),
                )));
            }

            Some(email)
        }
        None => None,
    };

    let updated = bookline_db::repositories::user::update_profile(
        &state.db_pool,
        user.id,
        name.as_deref(),
        email.as_deref(),
    )
    .await?;

    Ok(Json(UserResponse {
        id: updated.id,
        email: updated.email,
        name: updated.name,
        role: user.role,
        created_at: updated.created_at,
    }))
}

#[axum::debug_handler]
pub async fn change_password(
    State(state): State<Arc<ApiState>>,
    user: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let db_user = bookline_db::repositories::user::get_user_by_id(&state.db_pool, user.id)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(|| BookingError::NotFound("User not found".to_string()))?;

    if !auth::verify_password(&db_user.password_hash, &payload.current_password)? {
        return Err(AppError(BookingError::Authentication(
            "Current password is incorrect".to_string(),
        )));
    }

    validate::validate_password(&payload.new_password)?;

    let password_hash = auth::hash_password(&payload.new_password)?;
    bookline_db::repositories::user::update_password(&state.db_pool, user.id, &password_hash)
        .await
        .map_err(BookingError::Database)?;

    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}
