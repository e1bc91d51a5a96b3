//! Role-based authorization.
//!
//! A single policy decides administrative privilege for every protected
//! operation: roles, users, blog categories and blogs all go through
//! `require_admin`.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    auth::AuthUser, config::AppConfig, error::ApiError, models::User,
    repository::RepositoryState,
};

/// Slug of the role that grants administrative privilege.
pub const ADMIN_ROLE_SLUG: &str = "admin";

pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";

/// True iff the identity holds the admin role or one of the legacy
/// staff/superuser flags.
///
/// Only authenticated identities reach this function: an `AuthUser` cannot
/// be built without a verified token.
pub fn is_admin(user: &User) -> bool {
    user.role_slug() == Some(ADMIN_ROLE_SLUG) || user.is_staff || user.is_superuser
}

/// Rejects non-admin callers with a permission error (403).
pub fn require_admin(caller: &AuthUser) -> Result<(), ApiError> {
    if is_admin(&caller.user) {
        Ok(())
    } else {
        tracing::debug!(user_id = caller.user.id, "admin privilege required");
        Err(ApiError::Permission(PERMISSION_DENIED.to_string()))
    }
}

/// AdminCaller
///
/// An authenticated caller that passed `require_admin`. As a parts extractor
/// it runs before any body extractor, so a non-admin gets 403 whatever the
/// payload looks like.
#[derive(Debug, Clone)]
pub struct AdminCaller(pub AuthUser);

impl<S> FromRequestParts<S> for AdminCaller
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let caller = AuthUser::from_request_parts(parts, state).await?;
        require_admin(&caller)?;
        Ok(AdminCaller(caller))
    }
}
