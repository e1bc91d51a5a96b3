use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    auth::{self, Claims, TOKEN_INVALID, TokenType},
    config::AppConfig,
    error::{ApiError, FieldErrors},
    models::{
        AdminCreateUserRequest, AdminUpdateUserRequest, LoginRequest, NewUser, RegisterRequest,
        Role, TokenPair, User,
    },
    password::{self, PasswordPolicy},
    repository::Repository,
    services::{BLANK, already_exists, check_max_len},
};

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const USER_INACTIVE: &str = "User is inactive";
pub const ROLE_NOT_FOUND: &str = "Role not found.";
pub const USER_NOT_FOUND: &str = "Not found.";

pub const USERNAME_MAX: usize = 150;
pub const EMAIL_MAX: usize = 254;

const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
const INVALID_EMAIL: &str = "Enter a valid email address.";

static USERNAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("static regex compiles"));
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex compiles"));

/// AccountService
///
/// Registration, login and administrative user management.
pub struct AccountService<'a> {
    repo: &'a dyn Repository,
    config: &'a AppConfig,
}

impl<'a> AccountService<'a> {
    pub fn new(repo: &'a dyn Repository, config: &'a AppConfig) -> Self {
        Self { repo, config }
    }

    fn policy(&self) -> PasswordPolicy {
        PasswordPolicy::new(self.config.password_min_length)
    }

    /// Self-service sign-up. Returns the stored user and a fresh token pair.
    pub async fn register(&self, req: RegisterRequest) -> Result<(User, TokenPair), ApiError> {
        let mut errors = self.check_identity(&req.username, &req.email, None).await?;
        if req.password.is_empty() {
            errors.push("password", BLANK);
        } else {
            errors.extend(
                "password",
                self.policy().check(&req.password, &req.username, &req.email),
            );
        }
        errors.into_result()?;

        let role = self.resolve_role(req.role.as_deref()).await?;
        let new_user = NewUser {
            username: req.username,
            email: req.email,
            password_hash: Some(password::hash_password(&req.password)?),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            role_id: role.map(|r| r.id),
        };

        let user = self
            .repo
            .create_user(new_user, &self.config.user_code_prefix)
            .await?;
        let tokens = auth::issue_tokens(&user, self.config)?;

        tracing::info!(
            user_id = user.id,
            user_code = user.user_code.as_deref().unwrap_or_default(),
            "user registered"
        );
        Ok((user, tokens))
    }

    /// Admin creation. Without a password the account exists but cannot log in.
    pub async fn admin_create(&self, req: AdminCreateUserRequest) -> Result<User, ApiError> {
        let mut errors = self.check_identity(&req.username, &req.email, None).await?;
        let password = req.password.as_deref().filter(|p| !p.is_empty());
        if let Some(password) = password {
            errors.extend(
                "password",
                self.policy().check(password, &req.username, &req.email),
            );
        }
        errors.into_result()?;

        let role = self.resolve_role(req.role.as_deref()).await?;
        let password_hash = password.map(password::hash_password).transpose()?;
        let new_user = NewUser {
            username: req.username,
            email: req.email,
            password_hash,
            is_active: req.is_active,
            is_staff: req.is_staff,
            is_superuser: req.is_superuser,
            role_id: role.map(|r| r.id),
        };

        let user = self
            .repo
            .create_user(new_user, &self.config.user_code_prefix)
            .await?;
        tracing::info!(user_id = user.id, "user created by admin");
        Ok(user)
    }

    /// Applies the supplied fields only. `role: null` clears the role; an
    /// empty password is ignored. `user_code` can never change here.
    pub async fn admin_update(&self, id: i64, req: AdminUpdateUserRequest) -> Result<User, ApiError> {
        let mut user = self.get_user(id).await?;

        let username = req.username.unwrap_or_else(|| user.username.clone());
        let email = req.email.unwrap_or_else(|| user.email.clone());
        let mut errors = self.check_identity(&username, &email, Some(id)).await?;

        let password = req.password.as_deref().filter(|p| !p.is_empty());
        if let Some(password) = password {
            errors.extend("password", self.policy().check(password, &username, &email));
        }
        errors.into_result()?;

        if let Some(role) = req.role {
            user.role = self.resolve_role(role.as_deref()).await?;
        }
        if let Some(password) = password {
            user.password_hash = Some(password::hash_password(password)?);
        }
        user.username = username;
        user.email = email;
        user.is_active = req.is_active.unwrap_or(user.is_active);
        user.is_staff = req.is_staff.unwrap_or(user.is_staff);
        user.is_superuser = req.is_superuser.unwrap_or(user.is_superuser);

        let updated = self.repo.update_user(&user).await?;
        tracing::info!(user_id = updated.id, "user updated by admin");
        Ok(updated)
    }

    pub async fn admin_delete(&self, id: i64) -> Result<(), ApiError> {
        if !self.repo.delete_user(id).await? {
            return Err(ApiError::not_found(USER_NOT_FOUND));
        }
        tracing::info!(user_id = id, "user deleted by admin");
        Ok(())
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.repo.list_users().await?)
    }

    pub async fn get_user(&self, id: i64) -> Result<User, ApiError> {
        self.repo
            .get_user(id)
            .await?
            .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))
    }

    /// Password login.
    ///
    /// Unknown users, wrong passwords and accounts without a password all get
    /// the same message. Only a caller who knows the password learns that the
    /// account is disabled.
    pub async fn login(&self, req: LoginRequest) -> Result<(User, TokenPair), ApiError> {
        let Some(user) = self.repo.get_user_by_username(&req.username).await? else {
            tracing::debug!("login failed: unknown username");
            return Err(ApiError::auth(INVALID_CREDENTIALS));
        };

        if !password::verify_password(&req.password, user.password_hash.as_deref()) {
            tracing::debug!(user_id = user.id, "login failed: bad password");
            return Err(ApiError::auth(INVALID_CREDENTIALS));
        }
        if !user.is_active {
            tracing::debug!(user_id = user.id, "login refused: inactive");
            return Err(ApiError::auth(USER_INACTIVE));
        }

        let tokens = auth::issue_tokens(&user, self.config)?;
        tracing::info!(user_id = user.id, "user logged in");
        Ok((user, tokens))
    }

    /// Resolves an access token into the live, active user it names.
    pub async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let claims = auth::verify(token, TokenType::Access, self.config)?;
        self.load_active(&claims).await
    }

    /// Exchanges a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        let claims = auth::verify(refresh_token, TokenType::Refresh, self.config)?;
        let user = self.load_active(&claims).await?;
        let access = Claims::new(user.id, TokenType::Access, self.config.access_token_ttl_secs);
        auth::sign(&access, self.config)
    }

    async fn load_active(&self, claims: &Claims) -> Result<User, ApiError> {
        let user = self
            .repo
            .get_user(claims.user_id()?)
            .await?
            .ok_or_else(|| ApiError::auth(TOKEN_INVALID))?;
        if !user.is_active {
            return Err(ApiError::auth(USER_INACTIVE));
        }
        Ok(user)
    }

    /// Empty or absent slugs mean "no role".
    async fn resolve_role(&self, slug: Option<&str>) -> Result<Option<Role>, ApiError> {
        match slug.filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(slug) => self
                .repo
                .get_role_by_slug(slug)
                .await?
                .map(Some)
                .ok_or_else(|| ApiError::not_found(ROLE_NOT_FOUND)),
        }
    }

    /// Username and email checks shared by every write path. Uniqueness is
    /// checked up front so it is reported with the other field errors; the
    /// database constraints still catch races.
    async fn check_identity(
        &self,
        username: &str,
        email: &str,
        except: Option<i64>,
    ) -> Result<FieldErrors, ApiError> {
        let mut errors = FieldErrors::new();

        if username.is_empty() {
            errors.push("username", BLANK);
        } else if !USERNAME.is_match(username) {
            errors.push("username", INVALID_USERNAME);
        } else if self.repo.username_taken(username, except).await? {
            errors.push("username", already_exists("user", "username"));
        }
        check_max_len(&mut errors, "username", username, USERNAME_MAX);

        if !email.is_empty() {
            if !EMAIL.is_match(email) {
                errors.push("email", INVALID_EMAIL);
            } else if self.repo.email_taken(email, except).await? {
                errors.push("email", already_exists("user", "email"));
            }
            check_max_len(&mut errors, "email", email, EMAIL_MAX);
        }

        Ok(errors)
    }
}
