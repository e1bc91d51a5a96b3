use crate::{
    codes,
    error::ApiError,
    models::{
        Blog, BlogCategory, BlogFields, BlogOrderField, BlogQuery, BlogStatus, CategoryRequest,
        NewUser, Role, RoleRequest, User,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, query_builder::QueryBuilder};
use std::sync::Arc;

/// Schema applied at startup. Every statement is idempotent.
pub const SCHEMA: &str = include_str!("../schema.sql");

/// RepoError
///
/// Persistence failures. Unique-constraint violations come back as `Conflict`
/// naming the offending field, so callers can report them per field.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("record not found")]
    NotFound,
    #[error("{entity} with this {field} already exists.")]
    Conflict {
        entity: &'static str,
        field: &'static str,
    },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => ApiError::not_found("Not found."),
            RepoError::Conflict { entity, field } => {
                ApiError::field(field, format!("{entity} with this {field} already exists."))
            }
            RepoError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

/// Repository Trait
///
/// The persistence contract shared by the Postgres store and the in-memory
/// store used in tests. Handlers and services only ever see
/// `Arc<dyn Repository>`.
///
/// References follow null-on-delete semantics: deleting a role clears it
/// from its users, deleting a category clears it from its blogs.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Roles ---
    async fn list_roles(&self) -> Result<Vec<Role>, RepoError>;
    async fn get_role(&self, id: i64) -> Result<Option<Role>, RepoError>;
    async fn get_role_by_slug(&self, slug: &str) -> Result<Option<Role>, RepoError>;
    async fn create_role(&self, role: RoleRequest) -> Result<Role, RepoError>;
    async fn update_role(&self, role: &Role) -> Result<Role, RepoError>;
    async fn delete_role(&self, id: i64) -> Result<bool, RepoError>;

    // --- Users ---
    async fn list_users(&self) -> Result<Vec<User>, RepoError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, RepoError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
    /// Exact, case-sensitive match, optionally ignoring one user id.
    async fn username_taken(&self, username: &str, except: Option<i64>) -> Result<bool, RepoError>;
    /// Case-insensitive match, optionally ignoring one user id.
    async fn email_taken(&self, email: &str, except: Option<i64>) -> Result<bool, RepoError>;
    /// Inserts the user and assigns its sequential code in the same atomic unit.
    async fn create_user(&self, user: NewUser, code_prefix: &str) -> Result<User, RepoError>;
    /// Writes every mutable column. `user_code` is never touched.
    async fn update_user(&self, user: &User) -> Result<User, RepoError>;
    async fn delete_user(&self, id: i64) -> Result<bool, RepoError>;

    // --- Blog categories ---
    async fn list_categories(&self, search_terms: &[String]) -> Result<Vec<BlogCategory>, RepoError>;
    async fn get_category(&self, id: i64) -> Result<Option<BlogCategory>, RepoError>;
    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<BlogCategory>, RepoError>;
    async fn create_category(&self, category: CategoryRequest) -> Result<BlogCategory, RepoError>;
    async fn update_category(&self, category: &BlogCategory) -> Result<BlogCategory, RepoError>;
    async fn delete_category(&self, id: i64) -> Result<bool, RepoError>;

    // --- Blogs ---
    async fn list_blogs(&self, query: &BlogQuery) -> Result<Vec<Blog>, RepoError>;
    async fn get_blog(&self, id: i64) -> Result<Option<Blog>, RepoError>;
    async fn create_blog(&self, fields: BlogFields) -> Result<Blog, RepoError>;
    async fn update_blog(&self, blog: &Blog) -> Result<Blog, RepoError>;
    async fn delete_blog(&self, id: i64) -> Result<bool, RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// Escapes LIKE wildcards so search terms match literally.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Maps a unique-constraint name from `schema.sql` to the field it guards.
fn conflict_for(constraint: &str) -> Option<(&'static str, &'static str)> {
    Some(match constraint {
        "roles_name_key" => ("role", "name"),
        "roles_slug_key" => ("role", "slug"),
        "users_username_key" => ("user", "username"),
        "users_email_lower_key" => ("user", "email"),
        "users_user_code_key" => ("user", "user_code"),
        "blog_categories_name_key" => ("blog category", "name"),
        "blog_categories_slug_key" => ("blog category", "slug"),
        "blogs_slug_key" => ("blog", "slug"),
        _ => return None,
    })
}

/// Turns unique violations into `Conflict`, everything else into `Database`.
fn map_db_error(err: sqlx::Error) -> RepoError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            if let Some((entity, field)) = db.constraint().and_then(conflict_for) {
                return RepoError::Conflict { entity, field };
            }
        }
    }
    RepoError::Database(err)
}

// --- Row mapping ---

const USER_SELECT: &str = r#"
    SELECT u.id, u.username, u.email, u.password_hash, u.is_active, u.is_staff,
           u.is_superuser, u.user_code,
           r.id AS role_id, r.name AS role_name, r.slug AS role_slug,
           r.description AS role_description
    FROM users u
    LEFT JOIN roles r ON r.id = u.role_id
"#;

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: Option<String>,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
    user_code: Option<String>,
    role_id: Option<i64>,
    role_name: Option<String>,
    role_slug: Option<String>,
    role_description: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let role = match (row.role_id, row.role_name, row.role_slug) {
            (Some(id), Some(name), Some(slug)) => Some(Role {
                id,
                name,
                slug,
                description: row.role_description.unwrap_or_default(),
            }),
            _ => None,
        };
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            is_active: row.is_active,
            is_staff: row.is_staff,
            is_superuser: row.is_superuser,
            role,
            user_code: row.user_code,
        }
    }
}

const BLOG_SELECT: &str = r#"
    SELECT b.id, b.title, b.slug, b.status, b.category_id, c.slug AS category_slug,
           b.hero_title, b.hero_kicker_top, b.hero_kicker_bottom, b.main_heading,
           b.author_name, b.author_title, b.published_date, b.last_updated, b.read_time,
           b.featured_image_url, b.intro, b.whats_inside, b.sections, b.faqs,
           b.cta_text, b.cta_button_label, b.cta_button_link, b.extra_categories,
           b.excerpt, b.content, b.created_at, b.updated_at
    FROM blogs b
    LEFT JOIN blog_categories c ON c.id = b.category_id
"#;

#[derive(FromRow)]
struct BlogRow {
    id: i64,
    title: String,
    slug: String,
    status: String,
    category_id: Option<i64>,
    category_slug: Option<String>,
    hero_title: String,
    hero_kicker_top: String,
    hero_kicker_bottom: String,
    main_heading: String,
    author_name: String,
    author_title: String,
    published_date: Option<NaiveDate>,
    last_updated: Option<NaiveDate>,
    read_time: i32,
    featured_image_url: String,
    intro: String,
    whats_inside: Option<Value>,
    sections: Option<Value>,
    faqs: Option<Value>,
    cta_text: String,
    cta_button_label: String,
    cta_button_link: String,
    extra_categories: Option<Value>,
    excerpt: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BlogRow> for Blog {
    fn from(row: BlogRow) -> Self {
        let status = BlogStatus::parse(&row.status).unwrap_or_else(|| {
            tracing::warn!(blog_id = row.id, status = %row.status, "unknown stored blog status");
            BlogStatus::Draft
        });
        Blog {
            id: row.id,
            fields: BlogFields {
                title: row.title,
                slug: row.slug,
                status,
                category_id: row.category_id,
                category: row.category_slug,
                hero_title: row.hero_title,
                hero_kicker_top: row.hero_kicker_top,
                hero_kicker_bottom: row.hero_kicker_bottom,
                main_heading: row.main_heading,
                author_name: row.author_name,
                author_title: row.author_title,
                published_date: row.published_date,
                last_updated: row.last_updated,
                read_time: row.read_time,
                featured_image_url: row.featured_image_url,
                intro: row.intro,
                whats_inside: row.whats_inside,
                sections: row.sections,
                faqs: row.faqs,
                cta_text: row.cta_text,
                cta_button_label: row.cta_button_label,
                cta_button_link: row.cta_button_link,
                extra_categories: row.extra_categories,
                excerpt: row.excerpt,
                content: row.content,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Binds every editable blog column, in `BLOG_COLUMNS` order, onto a
/// comma-separated list.
fn push_blog_values(builder: &mut QueryBuilder<'_, Postgres>, fields: &BlogFields) {
    let mut values = builder.separated(", ");
    values.push_bind(fields.title.clone());
    values.push_bind(fields.slug.clone());
    values.push_bind(fields.status.as_str());
    values.push_bind(fields.category_id);
    values.push_bind(fields.hero_title.clone());
    values.push_bind(fields.hero_kicker_top.clone());
    values.push_bind(fields.hero_kicker_bottom.clone());
    values.push_bind(fields.main_heading.clone());
    values.push_bind(fields.author_name.clone());
    values.push_bind(fields.author_title.clone());
    values.push_bind(fields.published_date);
    values.push_bind(fields.last_updated);
    values.push_bind(fields.read_time);
    values.push_bind(fields.featured_image_url.clone());
    values.push_bind(fields.intro.clone());
    values.push_bind(fields.whats_inside.clone());
    values.push_bind(fields.sections.clone());
    values.push_bind(fields.faqs.clone());
    values.push_bind(fields.cta_text.clone());
    values.push_bind(fields.cta_button_label.clone());
    values.push_bind(fields.cta_button_link.clone());
    values.push_bind(fields.extra_categories.clone());
    values.push_bind(fields.excerpt.clone());
    values.push_bind(fields.content.clone());
}

const BLOG_COLUMNS: &str = "title, slug, status, category_id, hero_title, hero_kicker_top, \
    hero_kicker_bottom, main_heading, author_name, author_title, published_date, last_updated, \
    read_time, featured_image_url, intro, whats_inside, sections, faqs, cta_text, \
    cta_button_label, cta_button_link, extra_categories, excerpt, content";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies `schema.sql`. Safe to run on every start.
    pub async fn ensure_schema(&self) -> Result<(), RepoError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_roles(&self) -> Result<Vec<Role>, RepoError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT id, name, slug, description FROM roles ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    async fn get_role(&self, id: i64) -> Result<Option<Role>, RepoError> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT id, name, slug, description FROM roles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    async fn get_role_by_slug(&self, slug: &str) -> Result<Option<Role>, RepoError> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT id, name, slug, description FROM roles WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    async fn create_role(&self, role: RoleRequest) -> Result<Role, RepoError> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (name, slug, description) VALUES ($1, $2, $3) \
             RETURNING id, name, slug, description",
        )
        .bind(role.name)
        .bind(role.slug)
        .bind(role.description)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn update_role(&self, role: &Role) -> Result<Role, RepoError> {
        sqlx::query_as::<_, Role>(
            "UPDATE roles SET name = $2, slug = $3, description = $4 WHERE id = $1 \
             RETURNING id, name, slug, description",
        )
        .bind(role.id)
        .bind(&role.name)
        .bind(&role.slug)
        .bind(&role.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or(RepoError::NotFound)
    }

    /// `users.role_id` is declared `ON DELETE SET NULL`; the users survive.
    async fn delete_role(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} ORDER BY u.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} WHERE u.username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn username_taken(&self, username: &str, except: Option<i64>) -> Result<bool, RepoError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(username)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn email_taken(&self, email: &str, except: Option<i64>) -> Result<bool, RepoError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1) AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    /// create_user
    ///
    /// Runs code allocation and the insert in one transaction. The per-prefix
    /// counter row is locked with `FOR UPDATE`, so concurrent registrations
    /// queue behind each other instead of reading the same "last code". The
    /// unique constraint on `user_code` remains the final backstop.
    async fn create_user(&self, user: NewUser, code_prefix: &str) -> Result<User, RepoError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO user_code_counters (prefix, last_value) VALUES ($1, 0) \
             ON CONFLICT (prefix) DO NOTHING",
        )
        .bind(code_prefix)
        .execute(&mut *tx)
        .await?;

        let counter = sqlx::query_scalar::<_, i32>(
            "SELECT last_value FROM user_code_counters WHERE prefix = $1 FOR UPDATE",
        )
        .bind(code_prefix)
        .fetch_one(&mut *tx)
        .await?;

        let prefix_pattern = like_pattern(code_prefix);
        let prefix_pattern = &prefix_pattern[1..]; // anchored at the start
        let existing = sqlx::query_scalar::<_, String>(
            "SELECT user_code FROM users WHERE user_code LIKE $1",
        )
        .bind(prefix_pattern)
        .fetch_all(&mut *tx)
        .await?;

        let (value, user_code) = codes::next_code(
            code_prefix,
            existing.iter().map(String::as_str),
            counter.max(0) as u32,
        );

        sqlx::query("UPDATE user_code_counters SET last_value = $2 WHERE prefix = $1")
            .bind(code_prefix)
            .bind(value as i32)
            .execute(&mut *tx)
            .await?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, email, password_hash, is_active, is_staff, is_superuser, role_id, user_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.role_id)
        .bind(&user_code)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await?;
        tracing::debug!(user_id = id, %user_code, "allocated user code");

        self.get_user(id).await?.ok_or(RepoError::NotFound)
    }

    async fn update_user(&self, user: &User) -> Result<User, RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, email = $3, password_hash = $4, is_active = $5,
                is_staff = $6, is_superuser = $7, role_id = $8
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(user.role.as_ref().map(|role| role.id))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        self.get_user(user.id).await?.ok_or(RepoError::NotFound)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// list_categories
    ///
    /// Every search term must match the name or the slug (case-insensitive).
    async fn list_categories(&self, search_terms: &[String]) -> Result<Vec<BlogCategory>, RepoError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, name, slug, created_at, updated_at FROM blog_categories WHERE TRUE",
        );
        for term in search_terms {
            let pattern = like_pattern(term);
            builder.push(" AND (name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR slug ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
        builder.push(" ORDER BY name");

        let categories = builder
            .build_query_as::<BlogCategory>()
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn get_category(&self, id: i64) -> Result<Option<BlogCategory>, RepoError> {
        let category = sqlx::query_as::<_, BlogCategory>(
            "SELECT id, name, slug, created_at, updated_at FROM blog_categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<BlogCategory>, RepoError> {
        let category = sqlx::query_as::<_, BlogCategory>(
            "SELECT id, name, slug, created_at, updated_at FROM blog_categories WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn create_category(&self, category: CategoryRequest) -> Result<BlogCategory, RepoError> {
        sqlx::query_as::<_, BlogCategory>(
            "INSERT INTO blog_categories (name, slug) VALUES ($1, $2) \
             RETURNING id, name, slug, created_at, updated_at",
        )
        .bind(category.name)
        .bind(category.slug)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn update_category(&self, category: &BlogCategory) -> Result<BlogCategory, RepoError> {
        sqlx::query_as::<_, BlogCategory>(
            "UPDATE blog_categories SET name = $2, slug = $3, updated_at = NOW() WHERE id = $1 \
             RETURNING id, name, slug, created_at, updated_at",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or(RepoError::NotFound)
    }

    /// `blogs.category_id` is declared `ON DELETE SET NULL`; the posts survive.
    async fn delete_category(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM blog_categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// list_blogs
    ///
    /// Builds the filter/search/ordering clauses with QueryBuilder so every
    /// user-supplied value is a bound parameter.
    async fn list_blogs(&self, query: &BlogQuery) -> Result<Vec<Blog>, RepoError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(BLOG_SELECT);
        builder.push(" WHERE TRUE");

        if let Some(category) = &query.category {
            builder.push(" AND c.slug = ");
            builder.push_bind(category.clone());
        }
        if let Some(status) = &query.status {
            builder.push(" AND b.status = ");
            builder.push_bind(status.clone());
        }
        for term in &query.search_terms {
            let pattern = like_pattern(term);
            builder.push(" AND (b.title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR b.slug ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR b.excerpt ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR b.content ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        builder.push(" ORDER BY ");
        for ordering in &query.ordering {
            let column = match ordering.field {
                BlogOrderField::CreatedAt => "b.created_at",
                BlogOrderField::UpdatedAt => "b.updated_at",
            };
            builder.push(column);
            builder.push(if ordering.descending { " DESC, " } else { " ASC, " });
        }
        let tie_break_desc = query.ordering.first().is_none_or(|o| o.descending);
        builder.push(if tie_break_desc { "b.id DESC" } else { "b.id ASC" });

        let rows = builder
            .build_query_as::<BlogRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Blog::from).collect())
    }

    async fn get_blog(&self, id: i64) -> Result<Option<Blog>, RepoError> {
        let row = sqlx::query_as::<_, BlogRow>(&format!("{BLOG_SELECT} WHERE b.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Blog::from))
    }

    async fn create_blog(&self, fields: BlogFields) -> Result<Blog, RepoError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO blogs ({BLOG_COLUMNS}) VALUES ("));
        push_blog_values(&mut builder, &fields);
        builder.push(") RETURNING id");

        let id = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        self.get_blog(id).await?.ok_or(RepoError::NotFound)
    }

    async fn update_blog(&self, blog: &Blog) -> Result<Blog, RepoError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("UPDATE blogs SET ({BLOG_COLUMNS}, updated_at) = ROW("));
        push_blog_values(&mut builder, &blog.fields);
        builder.push(", NOW()) WHERE id = ");
        builder.push_bind(blog.id);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        self.get_blog(blog.id).await?.ok_or(RepoError::NotFound)
    }

    async fn delete_blog(&self, id: i64) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
