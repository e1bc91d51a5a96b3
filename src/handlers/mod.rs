//! HTTP handlers, grouped by resource.
//!
//! Handlers stay thin: they extract the caller and payload and delegate to a
//! service. Mutations on routes that mix reads and writes take an
//! `AdminCaller`, which applies the admin policy before the body is read.

pub mod auth;
pub mod blog;
pub mod roles;
pub mod users;

use axum::extract::FromRequest;

use crate::error::ApiError;

/// AppJson
///
/// `axum::Json` with its rejection mapped into `ApiError`, so a malformed
/// body comes back as a 400 validation error in the usual field-error shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// health
///
/// Liveness probe for load balancers. No authentication, no database.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}
