use crate::models::DbUser;
use bookline_core::errors::{BookingError, BookingResult};
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Maps a unique violation on `users.email` to the same conflict the
/// handler-level pre-check reports; a raced duplicate must not become a 500.
fn map_email_conflict(err: sqlx::Error) -> BookingError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            BookingError::Conflict("User with this email already exists".to_string())
        }
        _ => BookingError::Database(eyre::Report::new(err)),
    }
}

pub async fn create_user(
    pool: &Pool<Postgres>,
    email: &str,
    password_hash: &str,
    name: &str,
    role: &str,
) -> BookingResult<DbUser> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating user: id={}, email={}, role={}", id, email, role);

    let user = sqlx::query_as::<_, DbUser>(
        r#"
        INSERT INTO users (id, email, password_hash, name, role, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING id, email, password_hash, name, role, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(map_email_conflict)?;

    Ok(user)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, email, password_hash, name, role, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_email(pool: &Pool<Postgres>, email: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, email, password_hash, name, role, created_at, updated_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn update_profile(
    pool: &Pool<Postgres>,
    id: Uuid,
    name: Option<&str>,
    email: Option<&str>,
) -> BookingResult<DbUser> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        UPDATE users
        SET name = COALESCE($2, name),
            email = COALESCE($3, email),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, email, password_hash, name, role, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .fetch_one(pool)
    .await
    .map_err(map_email_conflict)?;

    Ok(user)
}

pub async fn update_password(pool: &Pool<Postgres>, id: Uuid, password_hash: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $2, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(password_hash)
    .execute(pool)
    .await?;

    Ok(())
}
