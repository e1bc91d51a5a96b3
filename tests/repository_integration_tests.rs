//! Postgres-backed repository tests.
//!
//! These need a reachable database, so they are ignored by default:
//! `DATABASE_URL=postgres://... cargo test -- --ignored`

use rolepress::{
    models::{BlogFields, BlogFilter, BlogQuery, CategoryRequest, NewUser, RoleRequest},
    repository::{PostgresRepository, RepoError, Repository},
};
use sqlx::PgPool;
use tokio::test;
use uuid::Uuid;

// --- Test Context and Setup ---

/// A simple structure to hold the database pool for testing
struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        PostgresRepository::new(pool.clone())
            .ensure_schema()
            .await
            .expect("Failed to apply schema.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

/// Short random marker so tests never collide on unique columns.
fn unique(label: &str) -> String {
    format!("{label}-{}", &Uuid::new_v4().simple().to_string()[..8])
}

fn new_user(username: &str, role_id: Option<i64>) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        is_active: true,
        role_id,
        ..NewUser::default()
    }
}

// --- Tests ---

#[test]
#[ignore]
async fn test_schema_is_idempotent() {
    let ctx = DbTestContext::setup().await;

    ctx.repository()
        .ensure_schema()
        .await
        .expect("second schema run should succeed");
}

#[test]
#[ignore]
async fn test_user_codes_are_sequential_per_prefix() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let prefix = format!("Z{}", Uuid::new_v4().simple().to_string()[..6].to_uppercase());

    let first = repo
        .create_user(new_user(&unique("first"), None), &prefix)
        .await
        .unwrap();
    let second = repo
        .create_user(new_user(&unique("second"), None), &prefix)
        .await
        .unwrap();

    assert_eq!(first.user_code, Some(format!("{prefix}001")));
    assert_eq!(second.user_code, Some(format!("{prefix}002")));

    // Deleting the newest user does not free its code.
    assert!(repo.delete_user(second.id).await.unwrap());
    let third = repo
        .create_user(new_user(&unique("third"), None), &prefix)
        .await
        .unwrap();
    assert_eq!(third.user_code, Some(format!("{prefix}003")));
}

#[test]
#[ignore]
async fn test_unique_violations_map_to_conflicts() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let username = unique("dup");

    repo.create_user(new_user(&username, None), "AW").await.unwrap();
    let mut shouting = new_user(&unique("other"), None);
    shouting.email = format!("{username}@EXAMPLE.com").to_uppercase();
    let err = repo.create_user(shouting, "AW").await.unwrap_err();

    assert!(matches!(
        err,
        RepoError::Conflict {
            entity: "user",
            field: "email"
        }
    ));
}

#[test]
#[ignore]
async fn test_deleting_role_nulls_user_reference() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let slug = unique("role");

    let role = repo
        .create_role(RoleRequest {
            name: slug.clone(),
            slug: slug.clone(),
            description: String::new(),
        })
        .await
        .unwrap();
    let user = repo
        .create_user(new_user(&unique("member"), Some(role.id)), "AW")
        .await
        .unwrap();
    assert_eq!(user.role_slug(), Some(slug.as_str()));

    assert!(repo.delete_role(role.id).await.unwrap());

    let reloaded = repo.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.role, None);
    assert_eq!(reloaded.user_code, user.user_code);
}

#[test]
#[ignore]
async fn test_blog_search_and_category_filter() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let marker = unique("mark");
    let category_slug = unique("cat");

    let category = repo
        .create_category(CategoryRequest {
            name: category_slug.clone(),
            slug: category_slug.clone(),
        })
        .await
        .unwrap();

    for (title, category_id) in [
        (format!("{marker} 100%"), Some(category.id)),
        (format!("{marker} 1000"), None),
    ] {
        repo.create_blog(BlogFields {
            slug: unique("post"),
            title,
            content: "Body".to_string(),
            category_id,
            ..BlogFields::default()
        })
        .await
        .unwrap();
    }

    let literal = repo
        .list_blogs(&BlogQuery::from(BlogFilter {
            search: Some(format!("{marker} 100%")),
            ..BlogFilter::default()
        }))
        .await
        .unwrap();
    assert_eq!(literal.len(), 1);
    assert_eq!(literal[0].fields.category.as_deref(), Some(category_slug.as_str()));

    let by_category = repo
        .list_blogs(&BlogQuery::from(BlogFilter {
            category: Some(category_slug.clone()),
            ..BlogFilter::default()
        }))
        .await
        .unwrap();
    assert_eq!(by_category.len(), 1);

    // Deleting the category keeps the post and clears the reference.
    assert!(repo.delete_category(category.id).await.unwrap());
    let orphan = repo.get_blog(by_category[0].id).await.unwrap().unwrap();
    assert_eq!(orphan.fields.category, None);
    assert_eq!(orphan.fields.category_id, None);
}
