use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    handlers::AppJson,
    models::{
        AuthResponse, LoginRequest, RefreshRequest, RefreshResponse, RegisterRequest, UserProfile,
    },
    services::accounts::AccountService,
};

/// register
///
/// [Public Route] Creates an account and signs the caller in immediately.
/// The user receives the next sequential `user_code` and, optionally, a role
/// referenced by slug.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Validation errors, keyed by field"),
        (status = 404, description = "Unknown role slug")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (user, tokens) = AccountService::new(state.repo.as_ref(), &state.config)
        .register(payload)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: UserProfile::from(&user),
            tokens,
        }),
    ))
}

/// login
///
/// [Public Route] Exchanges username and password for an access/refresh pair.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials or inactive account")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (user, tokens) = AccountService::new(state.repo.as_ref(), &state.config)
        .login(payload)
        .await?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: UserProfile::from(&user),
        tokens,
    }))
}

/// refresh_token
///
/// [Public Route] Mints a new access token from a valid refresh token.
#[utoipa::path(
    post,
    path = "/auth/token/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 401, description = "Refresh token invalid or expired")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let access = AccountService::new(state.repo.as_ref(), &state.config)
        .refresh(&payload.refresh)
        .await?;
    Ok(Json(RefreshResponse { access }))
}

/// get_me
///
/// [Authenticated Route] The caller's own profile, role nested.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_me(caller: AuthUser) -> Json<UserProfile> {
    Json(UserProfile::from(&caller.user))
}
