mod common;

use axum::{
    extract::FromRequestParts,
    http::{Method, Request, Uri, header, request::Parts},
};
use chrono::Utc;
use common::{accounts, caller, seed_user, test_state};
use rolepress::{
    AppState,
    auth::{self, AuthUser, CREDENTIALS_MISSING, Claims, TOKEN_INVALID, TokenType},
    config::AppConfig,
    error::ApiError,
    models::AdminUpdateUserRequest,
    services::accounts::USER_INACTIVE,
};

// --- Helper Functions ---

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn parts_with_bearer(token: &str) -> Parts {
    let mut parts = get_request_parts(Method::GET, "/auth/me".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    parts
}

async fn extract(parts: &mut Parts, state: &AppState) -> Result<AuthUser, ApiError> {
    AuthUser::from_request_parts(parts, state).await
}

fn assert_auth_error(result: Result<AuthUser, ApiError>, expected: &str) {
    match result {
        Err(ApiError::Auth(detail)) => assert_eq!(detail, expected),
        other => panic!("expected auth error {expected:?}, got {other:?}"),
    }
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_access_token() {
    let state = test_state();
    let user = seed_user(&state, "alice", None).await;
    let tokens = auth::issue_tokens(&user, &state.config).unwrap();

    let mut parts = parts_with_bearer(&tokens.access);
    let resolved = extract(&mut parts, &state).await.unwrap();

    assert_eq!(resolved.user.id, user.id);
    assert_eq!(resolved.user.username, "alice");
}

#[tokio::test]
async fn test_auth_failure_missing_header() {
    let state = test_state();
    let mut parts = get_request_parts(Method::GET, "/auth/me".parse().unwrap());

    assert_auth_error(extract(&mut parts, &state).await, CREDENTIALS_MISSING);
}

#[tokio::test]
async fn test_auth_failure_non_bearer_scheme() {
    let state = test_state();
    let mut parts = get_request_parts(Method::GET, "/auth/me".parse().unwrap());
    parts
        .headers
        .insert(header::AUTHORIZATION, "Token abc.def.ghi".parse().unwrap());

    assert_auth_error(extract(&mut parts, &state).await, CREDENTIALS_MISSING);
}

#[tokio::test]
async fn test_auth_failure_expired_token() {
    let state = test_state();
    let user = seed_user(&state, "alice", None).await;

    // Well past the default validation leeway.
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user.id.to_string(),
        iat: now - 7200,
        exp: now - 3600,
        jti: "expired".to_string(),
        token_type: TokenType::Access,
    };
    let token = auth::sign(&claims, &state.config).unwrap();

    let mut parts = parts_with_bearer(&token);
    assert_auth_error(extract(&mut parts, &state).await, TOKEN_INVALID);
}

#[tokio::test]
async fn test_auth_failure_refresh_token_used_as_access() {
    let state = test_state();
    let user = seed_user(&state, "alice", None).await;
    let tokens = auth::issue_tokens(&user, &state.config).unwrap();

    let mut parts = parts_with_bearer(&tokens.refresh);
    assert_auth_error(extract(&mut parts, &state).await, TOKEN_INVALID);
}

#[tokio::test]
async fn test_auth_failure_foreign_signature() {
    let state = test_state();
    let user = seed_user(&state, "alice", None).await;
    let foreign = AppConfig {
        jwt_secret: "some-other-secret".to_string(),
        ..AppConfig::default()
    };
    let tokens = auth::issue_tokens(&user, &foreign).unwrap();

    let mut parts = parts_with_bearer(&tokens.access);
    assert_auth_error(extract(&mut parts, &state).await, TOKEN_INVALID);
}

#[tokio::test]
async fn test_auth_failure_garbage_token() {
    let state = test_state();
    let mut parts = parts_with_bearer("not-a-jwt");

    assert_auth_error(extract(&mut parts, &state).await, TOKEN_INVALID);
}

#[tokio::test]
async fn test_auth_failure_inactive_user() {
    let state = test_state();
    let user = seed_user(&state, "sleepy", None).await;
    let tokens = auth::issue_tokens(&user, &state.config).unwrap();
    accounts(&state)
        .admin_update(
            user.id,
            AdminUpdateUserRequest {
                is_active: Some(false),
                ..AdminUpdateUserRequest::default()
            },
        )
        .await
        .unwrap();

    let mut parts = parts_with_bearer(&tokens.access);
    assert_auth_error(extract(&mut parts, &state).await, USER_INACTIVE);
}

#[tokio::test]
async fn test_auth_failure_deleted_user() {
    let state = test_state();
    let user = seed_user(&state, "gone", None).await;
    let tokens = auth::issue_tokens(&user, &state.config).unwrap();
    accounts(&state).admin_delete(user.id).await.unwrap();

    let mut parts = parts_with_bearer(&tokens.access);
    assert_auth_error(extract(&mut parts, &state).await, TOKEN_INVALID);
}

#[tokio::test]
async fn test_auth_reuses_identity_resolved_by_middleware() {
    let state = test_state();
    let user = seed_user(&state, "cached", None).await;

    // No Authorization header: the identity comes from the extensions alone.
    let mut parts = get_request_parts(Method::GET, "/auth/me".parse().unwrap());
    parts.extensions.insert(caller(&user));

    let resolved = extract(&mut parts, &state).await.unwrap();
    assert_eq!(resolved.user.id, user.id);
}

// --- Token refresh ---

#[tokio::test]
async fn test_refresh_mints_a_working_access_token() {
    let state = test_state();
    let user = seed_user(&state, "alice", None).await;
    let tokens = auth::issue_tokens(&user, &state.config).unwrap();

    let access = accounts(&state).refresh(&tokens.refresh).await.unwrap();

    let verified = auth::verify(&access, TokenType::Access, &state.config).unwrap();
    assert_eq!(verified.user_id().unwrap(), user.id);
    let me = accounts(&state).current_user(&access).await.unwrap();
    assert_eq!(me.id, user.id);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let state = test_state();
    let user = seed_user(&state, "alice", None).await;
    let tokens = auth::issue_tokens(&user, &state.config).unwrap();

    let result = accounts(&state).refresh(&tokens.access).await;

    assert!(matches!(result, Err(ApiError::Auth(ref d)) if d == TOKEN_INVALID));
}

#[tokio::test]
async fn test_issued_tokens_carry_configured_lifetimes() {
    let state = test_state();
    let user = seed_user(&state, "alice", None).await;
    let tokens = auth::issue_tokens(&user, &state.config).unwrap();

    let access = auth::verify(&tokens.access, TokenType::Access, &state.config).unwrap();
    let refresh = auth::verify(&tokens.refresh, TokenType::Refresh, &state.config).unwrap();

    assert_eq!(access.exp - access.iat, 300);
    assert_eq!(refresh.exp - refresh.iat, 86_400);
    assert_eq!(access.sub, user.id.to_string());
    assert_ne!(access.jti, refresh.jti);
}
