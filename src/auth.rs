use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::ApiError,
    models::{TokenPair, User},
    repository::RepositoryState,
    services::accounts::AccountService,
};

pub const CREDENTIALS_MISSING: &str = "Authentication credentials were not provided.";
pub const TOKEN_INVALID: &str = "Token is invalid or expired";

/// TokenType
///
/// Access tokens authorize requests; refresh tokens only mint new access
/// tokens. Each is rejected where the other is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims
///
/// Payload of every token this service signs. Verification needs only the
/// signing secret and the clock; the database is consulted afterwards to
/// resolve `sub` into a live user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, as a decimal string.
    pub sub: String,
    /// Expiration time (unix seconds).
    pub exp: usize,
    /// Issued at (unix seconds).
    pub iat: usize,
    /// Unique token id, so two tokens minted in the same second differ.
    pub jti: String,
    pub token_type: TokenType,
}

impl Claims {
    pub fn new(user_id: i64, token_type: TokenType, ttl_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            iat: now as usize,
            exp: (now + ttl_secs).max(0) as usize,
            jti: Uuid::new_v4().simple().to_string(),
            token_type,
        }
    }

    pub fn user_id(&self) -> Result<i64, ApiError> {
        self.sub.parse().map_err(|_| ApiError::auth(TOKEN_INVALID))
    }
}

/// Signs `claims` with the configured secret (HS256).
pub fn sign(claims: &Claims, config: &AppConfig) -> Result<String, ApiError> {
    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
}

/// Issues a fresh access/refresh pair for `user`.
pub fn issue_tokens(user: &User, config: &AppConfig) -> Result<TokenPair, ApiError> {
    let access = Claims::new(user.id, TokenType::Access, config.access_token_ttl_secs);
    let refresh = Claims::new(user.id, TokenType::Refresh, config.refresh_token_ttl_secs);
    Ok(TokenPair {
        access: sign(&access, config)?,
        refresh: sign(&refresh, config)?,
    })
}

/// Verifies signature, expiry and token type.
pub fn verify(token: &str, expected: TokenType, config: &AppConfig) -> Result<Claims, ApiError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        match e.kind() {
            ErrorKind::ExpiredSignature => tracing::debug!("rejected expired token"),
            other => tracing::debug!("rejected token: {:?}", other),
        }
        ApiError::auth(TOKEN_INVALID)
    })?;

    if data.claims.token_type != expected {
        tracing::debug!("rejected {:?} token used as {:?}", data.claims.token_type, expected);
        return Err(ApiError::auth(TOKEN_INVALID));
    }
    Ok(data.claims)
}

/// AuthUser
///
/// The resolved identity of an authenticated request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

/// AuthUser Extractor Implementation
///
/// 1. Reuse the identity already resolved by the auth middleware, if any.
/// 2. Extract the Bearer token from the Authorization header.
/// 3. Verify it as an access token and load the (active) user it names.
///
/// Rejection: `ApiError::Auth` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(resolved) = parts.extensions.get::<AuthUser>() {
            return Ok(resolved.clone());
        }

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::auth(CREDENTIALS_MISSING))?;

        let user = AccountService::new(repo.as_ref(), &config)
            .current_user(token)
            .await?;

        Ok(AuthUser { user })
    }
}
