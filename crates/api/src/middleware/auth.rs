//! # Authentication Module
//!
//! Password hashing, session tokens, and the extractor that turns a bearer
//! token into an authenticated caller.
//!
//! Passwords are hashed with Argon2. Session tokens are opaque random
//! values stored server-side with an expiry; handlers receive the caller
//! as an [`AuthUser`] and perform explicit role checks at the start of
//! each operation.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use eyre::Result;
use rand::RngCore;
use std::sync::Arc;
use uuid::Uuid;

use bookline_core::errors::BookingError;
use bookline_core::models::user::Role;

use crate::middleware::error_handling::AppError;
use crate::ApiState;

/// Hashes a password using the Argon2 algorithm with a fresh random salt.
/// The result is a PHC string carrying algorithm, parameters, salt and hash.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Verifies a password against a stored PHC hash string.
pub fn verify_password(hash: &str, password: &str) -> Result<bool> {
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| eyre::eyre!("Invalid password hash: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generates an opaque 256-bit session token, hex encoded.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Bearer token extracted from the `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError(BookingError::Authentication(
                    "Missing authorization header".to_string(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError(BookingError::Authentication(
                "Invalid authorization format. Expected 'Bearer <token>'".to_string(),
            ))
        })?;

        if token.is_empty() {
            return Err(AppError(BookingError::Authentication(
                "Empty bearer token".to_string(),
            )));
        }

        Ok(Self(token.to_string()))
    }
}

/// The authenticated caller: identity and role resolved from a live session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let bearer = BearerToken::from_request_parts(parts, state).await?;

        let session =
            bookline_db::repositories::session::get_session_by_token(&state.db_pool, &bearer.0)
                .await
                .map_err(BookingError::Database)?
                .ok_or_else(|| {
                    BookingError::Authentication("Invalid or expired session".to_string())
                })?;

        let user =
            bookline_db::repositories::user::get_user_by_id(&state.db_pool, session.user_id)
                .await
                .map_err(BookingError::Database)?
                .ok_or_else(|| BookingError::Authentication("User not found".to_string()))?;

        let role = Role::parse(&user.role).ok_or_else(|| {
            BookingError::Internal(format!("Unknown role in store: {}", user.role).into())
        })?;

        Ok(AuthUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role,
        })
    }
}

/// Explicit capability check: the operation requires the admin role.
pub fn require_admin(user: &AuthUser) -> Result<(), BookingError> {
    if user.role == Role::Admin {
        Ok(())
    } else {
        Err(BookingError::Authorization(
            "Admin access required".to_string(),
        ))
    }
}

/// Explicit capability check: the operation requires the fan role.
pub fn require_fan(user: &AuthUser) -> Result<(), BookingError> {
    if user.role == Role::Fan {
        Ok(())
    } else {
        Err(BookingError::Authorization(
            "Fan access required".to_string(),
        ))
    }
}
