use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Accounts ---

/// Role
///
/// A named permission group (`roles` table). The slug "admin" grants
/// administrative privilege through the authorization policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
}

/// User
///
/// The canonical identity record, with its role resolved. This is the internal
/// shape; responses go through `UserProfile` or `AdminUser`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    // None means the account has no usable password.
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub role: Option<Role>,
    // Assigned on insert, never rewritten.
    pub user_code: Option<String>,
}

impl User {
    pub fn role_slug(&self) -> Option<&str> {
        self.role.as_ref().map(|role| role.slug.as_str())
    }
}

/// NewUser
///
/// A validated user ready for insertion. The password is already hashed and
/// the role slug already resolved to an id.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub role_id: Option<i64>,
}

/// UserProfile
///
/// Public view of a user (register/login/me responses), with the role nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserProfile {
    pub id: i64,
    pub user_code: Option<String>,
    pub username: String,
    pub email: String,
    pub role: Option<Role>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            user_code: user.user_code.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

/// AdminUser
///
/// Administrative view of a user: flags included, role reduced to its slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminUser {
    pub id: i64,
    pub user_code: Option<String>,
    pub username: String,
    pub email: String,
    pub role: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl From<&User> for AdminUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            user_code: user.user_code.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role_slug().map(str::to_string),
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        }
    }
}

/// TokenPair
///
/// Signed access (short-lived) and refresh (long-lived) credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// AuthResponse
///
/// Envelope returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserProfile,
    pub tokens: TokenPair,
}

// --- Request Payloads (Accounts) ---

/// RegisterRequest
///
/// Public registration payload (POST /auth/register). `role` is a role slug.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// LoginRequest
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// RefreshRequest
///
/// Exchanges a refresh token for a new access token (POST /auth/token/refresh).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RefreshResponse {
    pub access: String,
}

/// AdminCreateUserRequest
///
/// Admin-only user creation. The password is optional: without one the
/// account exists but cannot log in with a password.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminCreateUserRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl Default for AdminCreateUserRequest {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            password: None,
            role: None,
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }
}

/// AdminUpdateUserRequest
///
/// Partial update. Only supplied fields change. `"role": null` clears the role,
/// while an absent `role` key leaves it untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct AdminUpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub role: Option<Option<String>>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_staff: Option<bool>,
    #[serde(default)]
    pub is_superuser: Option<bool>,
}

/// RoleRequest
///
/// Create payload for POST /roles.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct RoleRequest {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

/// RoleUpdate
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct RoleUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// --- Blog ---

/// BlogCategory
///
/// Independently owned reference table (`blog_categories`). Listed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct BlogCategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CategoryRequest {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CategoryUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

/// BlogStatus
///
/// Two-valued publication state. Any transition is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum BlogStatus {
    #[default]
    Draft,
    Published,
}

impl BlogStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BlogStatus::Draft => "draft",
            BlogStatus::Published => "published",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "draft" => Some(BlogStatus::Draft),
            "published" => Some(BlogStatus::Published),
            _ => None,
        }
    }
}

/// BlogFields
///
/// Everything an editor controls on a post. Shared by inserts and by the
/// stored `Blog`, which adds the id and timestamps.
///
/// `category` carries the category slug on the wire; `category_id` is the
/// stored reference and never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BlogFields {
    pub title: String,
    pub slug: String,
    pub status: BlogStatus,
    #[serde(skip)]
    pub category_id: Option<i64>,
    pub category: Option<String>,

    pub hero_title: String,
    pub hero_kicker_top: String,
    pub hero_kicker_bottom: String,
    pub main_heading: String,

    pub author_name: String,
    pub author_title: String,
    #[ts(type = "string | null")]
    pub published_date: Option<NaiveDate>,
    #[ts(type = "string | null")]
    pub last_updated: Option<NaiveDate>,
    pub read_time: i32,

    pub featured_image_url: String,

    pub intro: String,
    // [{ "label": "Intro" }, ...]
    pub whats_inside: Option<Value>,
    // [{ "heading": "", "body": "<p>..</p>", "image_url": "" }, ...]
    pub sections: Option<Value>,
    // [{ "question": "", "answer": "" }, ...]
    pub faqs: Option<Value>,

    pub cta_text: String,
    pub cta_button_label: String,
    pub cta_button_link: String,

    // ["SEO Services", "Digital Marketing"]
    pub extra_categories: Option<Value>,

    pub excerpt: String,
    pub content: String,
}

/// Blog
///
/// A stored post (`blogs` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Blog {
    pub id: i64,
    #[serde(flatten)]
    pub fields: BlogFields,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// CreateBlogRequest
///
/// Input for POST /blogs. `slug` and `hero_title` are derived from the title
/// when omitted or blank.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct CreateBlogRequest {
    pub title: String,
    pub slug: Option<String>,
    pub status: Option<BlogStatus>,
    pub category: Option<String>,
    pub hero_title: Option<String>,
    pub hero_kicker_top: Option<String>,
    pub hero_kicker_bottom: Option<String>,
    pub main_heading: Option<String>,
    pub author_name: Option<String>,
    pub author_title: Option<String>,
    pub published_date: Option<NaiveDate>,
    pub last_updated: Option<NaiveDate>,
    pub read_time: Option<i32>,
    pub featured_image_url: Option<String>,
    pub intro: Option<String>,
    pub whats_inside: Option<Value>,
    pub sections: Option<Value>,
    pub faqs: Option<Value>,
    pub cta_text: Option<String>,
    pub cta_button_label: Option<String>,
    pub cta_button_link: Option<String>,
    pub extra_categories: Option<Value>,
    pub excerpt: Option<String>,
    pub content: String,
}

/// UpdateBlogRequest
///
/// Partial update. Nullable fields use a double option so that an explicit
/// `null` clears the value while an absent key leaves it alone.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(default)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub status: Option<BlogStatus>,
    #[serde(deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    pub hero_title: Option<String>,
    pub hero_kicker_top: Option<String>,
    pub hero_kicker_bottom: Option<String>,
    pub main_heading: Option<String>,
    pub author_name: Option<String>,
    pub author_title: Option<String>,
    #[serde(deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub published_date: Option<Option<NaiveDate>>,
    #[serde(deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub last_updated: Option<Option<NaiveDate>>,
    pub read_time: Option<i32>,
    pub featured_image_url: Option<String>,
    pub intro: Option<String>,
    #[serde(deserialize_with = "double_option")]
    #[schema(value_type = Option<Object>)]
    pub whats_inside: Option<Option<Value>>,
    #[serde(deserialize_with = "double_option")]
    #[schema(value_type = Option<Object>)]
    pub sections: Option<Option<Value>>,
    #[serde(deserialize_with = "double_option")]
    #[schema(value_type = Option<Object>)]
    pub faqs: Option<Option<Value>>,
    pub cta_text: Option<String>,
    pub cta_button_label: Option<String>,
    pub cta_button_link: Option<String>,
    #[serde(deserialize_with = "double_option")]
    #[schema(value_type = Option<Object>)]
    pub extra_categories: Option<Option<Value>>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
}

// --- Listing queries ---

/// BlogOrderField
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlogOrderField {
    CreatedAt,
    UpdatedAt,
}

/// BlogOrdering
///
/// One key of an `ordering=` parameter such as `-created_at,updated_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlogOrdering {
    pub field: BlogOrderField,
    pub descending: bool,
}

impl BlogOrdering {
    pub const NEWEST_FIRST: BlogOrdering = BlogOrdering {
        field: BlogOrderField::CreatedAt,
        descending: true,
    };

    /// Parses a comma-separated ordering list. Unknown fields are dropped; an
    /// empty result falls back to newest first.
    pub fn parse_list(raw: Option<&str>) -> Vec<BlogOrdering> {
        let parsed: Vec<BlogOrdering> = raw
            .unwrap_or_default()
            .split(',')
            .filter_map(|key| {
                let key = key.trim();
                let (descending, name) = match key.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, key),
                };
                let field = match name {
                    "created_at" => BlogOrderField::CreatedAt,
                    "updated_at" => BlogOrderField::UpdatedAt,
                    _ => return None,
                };
                Some(BlogOrdering { field, descending })
            })
            .collect();

        if parsed.is_empty() {
            vec![Self::NEWEST_FIRST]
        } else {
            parsed
        }
    }
}

/// BlogFilter
///
/// Raw query parameters of GET /blogs.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct BlogFilter {
    /// Category slug to filter on.
    pub category: Option<String>,
    /// Exact status ("draft" or "published").
    pub status: Option<String>,
    /// Free-text search over title, slug, excerpt and content.
    pub search: Option<String>,
    /// Comma-separated `created_at` / `updated_at`, `-` for descending.
    pub ordering: Option<String>,
}

/// SearchFilter
///
/// Query parameters of GET /blog/categories.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct SearchFilter {
    /// Free-text search over name and slug.
    pub search: Option<String>,
}

/// BlogQuery
///
/// A parsed, repository-ready blog listing query.
#[derive(Debug, Clone, PartialEq)]
pub struct BlogQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub search_terms: Vec<String>,
    pub ordering: Vec<BlogOrdering>,
}

impl Default for BlogQuery {
    fn default() -> Self {
        Self {
            category: None,
            status: None,
            search_terms: Vec::new(),
            ordering: vec![BlogOrdering::NEWEST_FIRST],
        }
    }
}

impl From<BlogFilter> for BlogQuery {
    fn from(filter: BlogFilter) -> Self {
        Self {
            category: filter.category.filter(|c| !c.is_empty()),
            status: filter.status.filter(|s| !s.is_empty()),
            search_terms: search_terms(filter.search.as_deref()),
            ordering: BlogOrdering::parse_list(filter.ordering.as_deref()),
        }
    }
}

/// Splits a search string into terms on whitespace and commas. Every term has
/// to match at least one searched field.
pub fn search_terms(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

fn default_true() -> bool {
    true
}

/// Distinguishes an absent key (None) from an explicit null (Some(None)).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
