use crate::models::DbSession;
use chrono::{DateTime, Utc};
use eyre::Result;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_session(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<DbSession> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating session: id={}, user_id={}", id, user_id);

    let session = sqlx::query_as::<_, DbSession>(
        r#"
        INSERT INTO sessions (id, user_id, token, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, token, created_at, expires_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(token)
    .bind(now)
    .bind(expires_at)
    .fetch_one(pool)
    .await?;

    Ok(session)
}

/// Looks up a live session. Expired sessions are treated as absent.
pub async fn get_session_by_token(
    pool: &Pool<Postgres>,
    token: &str,
) -> Result<Option<DbSession>> {
    let session = sqlx::query_as::<_, DbSession>(
        r#"
        SELECT id, user_id, token, created_at, expires_at
        FROM sessions
        WHERE token = $1 AND expires_at > NOW()
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

pub async fn extend_session(
    pool: &Pool<Postgres>,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<Option<DbSession>> {
    let session = sqlx::query_as::<_, DbSession>(
        r#"
        UPDATE sessions
        SET expires_at = $2
        WHERE token = $1 AND expires_at > NOW()
        RETURNING id, user_id, token, created_at, expires_at
        "#,
    )
    .bind(token)
    .bind(expires_at)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

/// Sweeps sessions past their expiry. Lookups already ignore them; this
/// keeps the table from growing without bound. Returns the rows removed.
pub async fn delete_expired_sessions(pool: &Pool<Postgres>) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM sessions
        WHERE expires_at <= NOW()
        "#,
    )
    .execute(pool)
    .await?;

    let swept = result.rows_affected();
    if swept > 0 {
        tracing::debug!("Swept {} expired sessions", swept);
    }

    Ok(swept)
}

pub async fn delete_session(pool: &Pool<Postgres>, token: &str) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM sessions
        WHERE token = $1
        "#,
    )
    .bind(token)
    .execute(pool)
    .await?;

    Ok(())
}
