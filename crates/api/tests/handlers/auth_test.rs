use axum::Json;
use chrono::{Duration, Utc};
use mockall::predicate;
use uuid::Uuid;

use bookline_api::middleware::{auth, error_handling::AppError};
use bookline_core::{
    errors::BookingError,
    models::user::{Role, SessionResponse},
    validate,
};
use bookline_db::models::DbSession;

use crate::test_utils::{sample_user, TestContext};

// Wrapper mirroring the register handler's decision points: validation,
// the duplicate-email check, then user and session creation.
async fn test_register_wrapper(
    ctx: &mut TestContext,
    name: String,
    email: String,
    password: String,
    role: String,
) -> Result<Uuid, AppError> {
    let name = name.trim().to_string();
    let email = email.trim().to_lowercase();
    validate::validate_name(&name)?;
    validate::validate_email(&email)?;
    validate::validate_password(&password)?;
    let role = Role::parse(&role)
        .ok_or_else(|| BookingError::Validation("Role must be admin or fan".to_string()))?;

    let email_static: &'static str = Box::leak(email.into_boxed_str());
    if ctx
        .user_repo
        .get_user_by_email(email_static)
        .await
        .map_err(BookingError::Database)?
        .is_some()
    {
        return Err(AppError(BookingError::Conflict(
            "Email already registered".to_string(),
        )));
    }

    let password_hash = auth::hash_password(&password)?;
    let name_static: &'static str = Box::leak(name.into_boxed_str());
    let hash_static: &'static str = Box::leak(password_hash.into_boxed_str());
    let user = ctx
        .user_repo
        .create_user(email_static, hash_static, name_static, role.as_str())
        .await?;

    let token: &'static str = Box::leak(auth::generate_session_token().into_boxed_str());
    ctx.session_repo
        .create_session(user.id, token, Utc::now() + Duration::hours(24))
        .await
        .map_err(BookingError::Database)?;

    Ok(user.id)
}

// Wrapper mirroring the login handler: both an unknown email and a wrong
// password must yield the same authentication failure.
async fn test_login_wrapper(
    ctx: &mut TestContext,
    email: &'static str,
    password: String,
) -> Result<Json<SessionResponse>, AppError> {
    let invalid = || BookingError::Authentication("Invalid email or password".to_string());

    let user = ctx
        .user_repo
        .get_user_by_email(email)
        .await
        .map_err(BookingError::Database)?
        .ok_or_else(invalid)?;

    if !auth::verify_password(&user.password_hash, &password)? {
        return Err(AppError(invalid()));
    }

    let token = auth::generate_session_token();
    let expires_at = Utc::now() + Duration::hours(24);
    let token_static: &'static str = Box::leak(token.into_boxed_str());
    let session = ctx
        .session_repo
        .create_session(user.id, token_static, expires_at)
        .await
        .map_err(BookingError::Database)?;

    Ok(Json(SessionResponse {
        access_token: session.token,
        expires_at: session.expires_at,
    }))
}

fn session_fixture(user_id: Uuid, token: &str) -> DbSession {
    DbSession {
        id: Uuid::new_v4(),
        user_id,
        token: token.to_string(),
        created_at: Utc::now(),
        expires_at: Utc::now() + Duration::hours(24),
    }
}

#[tokio::test]
async fn test_register_success() {
    let mut ctx = TestContext::new();
    let user = sample_user("fan");
    let user_id = user.id;

    ctx.user_repo
        .expect_get_user_by_email()
        .with(predicate::eq("new.fan@example.com"))
        .returning(|_| Ok(None));

    ctx.user_repo
        .expect_create_user()
        .withf(|email, hash, name, role| {
            email == "new.fan@example.com"
                && hash.starts_with("$argon2")
                && name == "New Fan"
                && role == "fan"
        })
        .returning(move |email, hash, name, role| {
            let mut user = user.clone();
            user.email = email.to_string();
            user.password_hash = hash.to_string();
            user.name = name.to_string();
            user.role = role.to_string();
            Ok(user)
        });

    ctx.session_repo
        .expect_create_session()
        .with(
            predicate::eq(user_id),
            predicate::always(),
            predicate::always(),
        )
        .returning(|user_id, token, _| Ok(session_fixture(user_id, token)));

    let created = test_register_wrapper(
        &mut ctx,
        "New Fan".to_string(),
        "New.Fan@Example.com".to_string(),
        "Str0ng!pass".to_string(),
        "fan".to_string(),
    )
    .await
    .expect("registration should succeed");

    assert_eq!(created, user_id);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let mut ctx = TestContext::new();
    let existing = sample_user("fan");

    ctx.user_repo
        .expect_get_user_by_email()
        .returning(move |_| Ok(Some(existing.clone())));

    let result = test_register_wrapper(
        &mut ctx,
        "New Fan".to_string(),
        "fan@example.com".to_string(),
        "Str0ng!pass".to_string(),
        "fan".to_string(),
    )
    .await;

    match result {
        Err(AppError(BookingError::Conflict(_))) => {}
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_register_raced_duplicate_is_conflict() {
    // The pre-check sees no user, but a concurrent registration wins the
    // insert; the unique-index rejection must surface as the same 409.
    let mut ctx = TestContext::new();

    ctx.user_repo
        .expect_get_user_by_email()
        .returning(|_| Ok(None));

    ctx.user_repo.expect_create_user().returning(|_, _, _, _| {
        Err(BookingError::Conflict(
            "User with this email already exists".to_string(),
        ))
    });

    let result = test_register_wrapper(
        &mut ctx,
        "New Fan".to_string(),
        "fan@example.com".to_string(),
        "Str0ng!pass".to_string(),
        "fan".to_string(),
    )
    .await;

    match result {
        Err(AppError(BookingError::Conflict(_))) => {}
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let mut ctx = TestContext::new();

    let result = test_register_wrapper(
        &mut ctx,
        "New Fan".to_string(),
        "fan@example.com".to_string(),
        "weakpass".to_string(),
        "fan".to_string(),
    )
    .await;

    match result {
        Err(AppError(BookingError::Validation(_))) => {}
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_register_rejects_unknown_role() {
    let mut ctx = TestContext::new();

    let result = test_register_wrapper(
        &mut ctx,
        "New Fan".to_string(),
        "fan@example.com".to_string(),
        "Str0ng!pass".to_string(),
        "superuser".to_string(),
    )
    .await;

    match result {
        Err(AppError(BookingError::Validation(_))) => {}
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_success() {
    let mut ctx = TestContext::new();
    let mut user = sample_user("fan");
    user.password_hash = auth::hash_password("Str0ng!pass").unwrap();
    let user_id = user.id;

    ctx.user_repo
        .expect_get_user_by_email()
        .with(predicate::eq("fan@example.com"))
        .returning(move |_| Ok(Some(user.clone())));

    ctx.session_repo
        .expect_create_session()
        .with(
            predicate::eq(user_id),
            predicate::always(),
            predicate::always(),
        )
        .returning(|user_id, token, _| Ok(session_fixture(user_id, token)));

    let Json(response) = test_login_wrapper(&mut ctx, "fan@example.com", "Str0ng!pass".to_string())
        .await
        .expect("login should succeed");

    assert_eq!(response.access_token.len(), 64);
    assert!(response.expires_at > Utc::now());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let mut ctx = TestContext::new();
    let mut user = sample_user("fan");
    user.password_hash = auth::hash_password("Str0ng!pass").unwrap();

    ctx.user_repo
        .expect_get_user_by_email()
        .returning(move |_| Ok(Some(user.clone())));

    let result = test_login_wrapper(&mut ctx, "fan@example.com", "Wr0ng!pass".to_string()).await;
    match result {
        Err(AppError(BookingError::Authentication(msg))) => {
            assert_eq!(msg, "Invalid email or password");
        }
        other => panic!("expected authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_unknown_email_same_failure() {
    let mut ctx = TestContext::new();

    ctx.user_repo
        .expect_get_user_by_email()
        .returning(|_| Ok(None));

    let result = test_login_wrapper(&mut ctx, "ghost@example.com", "Str0ng!pass".to_string()).await;
    match result {
        Err(AppError(BookingError::Authentication(msg))) => {
            assert_eq!(msg, "Invalid email or password");
        }
        other => panic!("expected authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_session_token_is_opaque_hex() {
    let token = auth::generate_session_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

    // Two tokens must never collide in practice.
    assert_ne!(token, auth::generate_session_token());
}
