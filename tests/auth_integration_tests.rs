mod common;

use std::{sync::Arc, time::SystemTime};

use axum::{
    extract::FromRequestParts,
    http::{Method, Request, Uri, header, request::Parts},
};
use blog_backend::{
    AppError, AppState, InMemoryRepository, MockIdentityProvider,
    auth::{AuthUser, Claims},
    config::{AppConfig, Env},
    models::UserRole,
};
use common::{ADMIN, ALICE, BANNED, seeded_repo};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

fn create_token(user_id: Uuid, exp_offset: i64, secret: &str) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + exp_offset) as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn create_app_state(env: Env, repo: Arc<InMemoryRepository>) -> AppState {
    let config = AppConfig {
        env,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };
    AppState::new(repo, Arc::new(MockIdentityProvider::new()), config)
}

fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn with_bearer(parts: &mut Parts, token: &str) {
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
}

fn with_user_id(parts: &mut Parts, id: Uuid) {
    parts.headers.insert(
        header::HeaderName::from_static("x-user-id"),
        header::HeaderValue::from_str(&id.to_string()).unwrap(),
    );
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let app_state = create_app_state(Env::Production, seeded_repo().await);
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_bearer(&mut parts, &create_token(ADMIN, 3600, TEST_JWT_SECRET));

    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();

    assert_eq!(user.id, ADMIN);
    // Role comes from the users table, not the token.
    assert_eq!(user.role, UserRole::Admin);
    assert!(user.is_admin());
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let app_state = create_app_state(Env::Production, seeded_repo().await);
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;
    assert_eq!(auth_user.unwrap_err(), AppError::Unauthorized);
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    let app_state = create_app_state(Env::Production, seeded_repo().await);
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    // Well past the default validation leeway.
    with_bearer(&mut parts, &create_token(ALICE, -3600, TEST_JWT_SECRET));

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;
    assert_eq!(auth_user.unwrap_err(), AppError::Unauthorized);
}

#[tokio::test]
async fn test_auth_failure_with_wrong_signature() {
    let app_state = create_app_state(Env::Production, seeded_repo().await);
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_bearer(&mut parts, &create_token(ALICE, 3600, "some-other-secret"));

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;
    assert_eq!(auth_user.unwrap_err(), AppError::Unauthorized);
}

#[tokio::test]
async fn test_auth_failure_for_unknown_subject() {
    let app_state = create_app_state(Env::Production, seeded_repo().await);
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_bearer(&mut parts, &create_token(Uuid::new_v4(), 3600, TEST_JWT_SECRET));

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;
    assert_eq!(auth_user.unwrap_err(), AppError::Unauthorized);
}

#[tokio::test]
async fn test_banned_account_is_forbidden() {
    let app_state = create_app_state(Env::Production, seeded_repo().await);
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_bearer(&mut parts, &create_token(BANNED, 3600, TEST_JWT_SECRET));

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;
    assert!(matches!(auth_user, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_local_bypass_success() {
    let app_state = create_app_state(Env::Local, seeded_repo().await);
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_user_id(&mut parts, ALICE);

    let user = AuthUser::from_request_parts(&mut parts, &app_state)
        .await
        .unwrap();
    assert_eq!(user.id, ALICE);
    assert_eq!(user.role, UserRole::User);
}

#[tokio::test]
async fn test_local_bypass_unknown_user_falls_through_to_jwt() {
    let app_state = create_app_state(Env::Local, seeded_repo().await);
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    with_user_id(&mut parts, Uuid::new_v4());

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;
    assert_eq!(auth_user.unwrap_err(), AppError::Unauthorized);
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let app_state = create_app_state(Env::Production, seeded_repo().await);
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    // Provide ONLY the local bypass header
    with_user_id(&mut parts, ALICE);

    let auth_user = AuthUser::from_request_parts(&mut parts, &app_state).await;
    assert_eq!(auth_user.unwrap_err(), AppError::Unauthorized);
}
