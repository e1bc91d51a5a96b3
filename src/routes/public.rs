use crate::{
    AppState,
    handlers::{self, auth},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a token. Nothing here reads or changes data
/// beyond the caller's own credentials.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe; answers "ok" without touching the database.
        .route("/health", get(handlers::health))
        // POST /auth/register
        // Creates an account (next user_code assigned) and returns a token pair.
        .route("/auth/register", post(auth::register))
        // POST /auth/login
        .route("/auth/login", post(auth::login))
        // POST /auth/token/refresh
        // Refresh token in, new access token out.
        .route("/auth/token/refresh", post(auth::refresh_token))
}
