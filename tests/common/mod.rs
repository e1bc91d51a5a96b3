#![allow(dead_code)]

use std::sync::Arc;

use rolepress::{
    AppConfig, AppState, MemoryRepository,
    auth::{self, AuthUser},
    error::{ApiError, FieldErrors},
    models::{RegisterRequest, Role, RoleRequest, User},
    policy::AdminCaller,
    repository::Repository,
    services::accounts::AccountService,
};

// --- Shared Test Fixtures ---

/// Passes every rule of the default password policy.
pub const STRONG_PASSWORD: &str = "Correct-Horse-42";

/// Fresh state over an empty in-memory repository and default configuration.
pub fn test_state() -> AppState {
    state_with_config(AppConfig::default())
}

pub fn state_with_config(config: AppConfig) -> AppState {
    AppState {
        repo: Arc::new(MemoryRepository::new()),
        config,
    }
}

pub fn accounts(state: &AppState) -> AccountService<'_> {
    AccountService::new(state.repo.as_ref(), &state.config)
}

pub async fn seed_role(state: &AppState, name: &str, slug: &str) -> Role {
    state
        .repo
        .create_role(RoleRequest {
            name: name.to_string(),
            slug: slug.to_string(),
            description: String::new(),
        })
        .await
        .expect("seed role")
}

/// Registers `username` with the strong password and an optional role slug.
pub async fn seed_user(state: &AppState, username: &str, role: Option<&str>) -> User {
    let (user, _) = accounts(state)
        .register(RegisterRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: STRONG_PASSWORD.to_string(),
            role: role.map(str::to_string),
        })
        .await
        .expect("seed user");
    user
}

/// A user holding the "admin" role (created on first use).
pub async fn seed_admin(state: &AppState) -> User {
    if state
        .repo
        .get_role_by_slug("admin")
        .await
        .expect("role lookup")
        .is_none()
    {
        seed_role(state, "Administrator", "admin").await;
    }
    seed_user(state, "site-admin", Some("admin")).await
}

pub fn access_token(state: &AppState, user: &User) -> String {
    auth::issue_tokens(user, &state.config)
        .expect("issue tokens")
        .access
}

pub fn caller(user: &User) -> AuthUser {
    AuthUser { user: user.clone() }
}

/// An admin identity for calling mutating handlers directly. The admin check
/// itself lives in the extractor and is tested there.
pub fn admin_caller(user: &User) -> AdminCaller {
    AdminCaller(caller(user))
}

/// Unwraps a validation error, failing the test on any other outcome.
pub fn field_errors<T: std::fmt::Debug>(result: Result<T, ApiError>) -> FieldErrors {
    match result {
        Err(ApiError::Validation(errors)) => errors,
        other => panic!("expected a validation error, got {other:?}"),
    }
}
