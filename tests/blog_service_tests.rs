mod common;

use std::time::Duration;

use common::{field_errors, test_state};
use rolepress::{
    AppState,
    error::ApiError,
    models::{
        BlogFilter, BlogQuery, BlogStatus, CategoryRequest, CategoryUpdate, CreateBlogRequest,
        UpdateBlogRequest,
    },
    services::blog::BlogService,
};
use serde_json::json;
use tokio::test;

fn service(state: &AppState) -> BlogService<'_> {
    BlogService::new(state.repo.as_ref())
}

fn post(title: &str) -> CreateBlogRequest {
    CreateBlogRequest {
        title: title.to_string(),
        content: "Plain body".to_string(),
        ..CreateBlogRequest::default()
    }
}

fn category(name: &str, slug: &str) -> CategoryRequest {
    CategoryRequest {
        name: name.to_string(),
        slug: slug.to_string(),
    }
}

fn query(filter: BlogFilter) -> BlogQuery {
    BlogQuery::from(filter)
}

// --- Creation ---

#[test]
async fn test_explicit_slug_and_hero_title_are_kept() {
    let state = test_state();

    let mut request = post("Hello World!");
    request.slug = Some("custom-slug".to_string());
    request.hero_title = Some("A different hero".to_string());
    let blog = service(&state).create_blog(request).await.unwrap();

    assert_eq!(blog.fields.slug, "custom-slug");
    assert_eq!(blog.fields.hero_title, "A different hero");
    assert_eq!(blog.fields.status, BlogStatus::Draft);
    assert_eq!(blog.fields.read_time, 0);
}

#[test]
async fn test_title_without_slug_characters_is_rejected() {
    let state = test_state();

    let errors = field_errors(service(&state).create_blog(post("¡¿!?")).await);

    assert!(errors.get("slug").is_some());
    assert!(errors.get("title").is_none());
}

#[test]
async fn test_duplicate_slug_is_a_field_error() {
    let state = test_state();
    service(&state).create_blog(post("Same title")).await.unwrap();

    let errors = field_errors(service(&state).create_blog(post("Same title")).await);

    assert_eq!(
        errors.get("slug"),
        Some(&["blog with this slug already exists.".to_string()][..])
    );
}

#[test]
async fn test_create_validates_fields_together() {
    let state = test_state();

    let mut request = post("");
    request.content = String::new();
    request.read_time = Some(-1);
    request.featured_image_url = Some("not a url".to_string());
    request.cta_button_link = Some("https://example.com/go".to_string());
    request.author_name = Some("x".repeat(121));
    request.category = Some("missing".to_string());
    let errors = field_errors(service(&state).create_blog(request).await);

    assert!(errors.get("title").is_some());
    assert!(errors.get("content").is_some());
    assert!(errors.get("read_time").is_some());
    assert!(errors.get("featured_image_url").is_some());
    assert!(errors.get("cta_button_link").is_none());
    assert_eq!(
        errors.get("author_name"),
        Some(&["Ensure this field has no more than 120 characters.".to_string()][..])
    );
    assert_eq!(
        errors.get("category"),
        Some(&["Object with slug=missing does not exist.".to_string()][..])
    );
}

#[test]
async fn test_structured_content_round_trips() {
    let state = test_state();

    let mut request = post("Structured");
    request.faqs = Some(json!([{ "question": "Why?", "answer": "Because." }]));
    request.extra_categories = Some(json!(["SEO Services"]));
    let created = service(&state).create_blog(request).await.unwrap();
    let fetched = service(&state).get_blog(created.id).await.unwrap();

    assert_eq!(fetched.fields.faqs, created.fields.faqs);
    assert_eq!(fetched.fields.extra_categories, Some(json!(["SEO Services"])));
    assert_eq!(fetched.fields.sections, None);
}

// --- Updates ---

#[test]
async fn test_update_clears_nullable_fields_only_when_null() {
    let state = test_state();
    service(&state)
        .create_category(category("News", "news"))
        .await
        .unwrap();
    let mut request = post("Categorised");
    request.category = Some("news".to_string());
    request.faqs = Some(json!([]));
    let blog = service(&state).create_blog(request).await.unwrap();

    let untouched = service(&state)
        .update_blog(
            blog.id,
            serde_json::from_value::<UpdateBlogRequest>(json!({ "excerpt": "Short" })).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(untouched.fields.category.as_deref(), Some("news"));
    assert_eq!(untouched.fields.faqs, Some(json!([])));

    let cleared = service(&state)
        .update_blog(
            blog.id,
            serde_json::from_value::<UpdateBlogRequest>(json!({ "category": null, "faqs": null }))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(cleared.fields.category, None);
    assert_eq!(cleared.fields.faqs, None);
    assert_eq!(cleared.fields.excerpt, "Short");
}

#[test]
async fn test_update_status_transitions_freely() {
    let state = test_state();
    let blog = service(&state).create_blog(post("Toggle")).await.unwrap();

    for status in [BlogStatus::Published, BlogStatus::Draft, BlogStatus::Published] {
        let updated = service(&state)
            .update_blog(
                blog.id,
                UpdateBlogRequest {
                    status: Some(status),
                    ..UpdateBlogRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.fields.status, status);
    }
}

#[test]
async fn test_update_rejects_blank_slug() {
    let state = test_state();
    let blog = service(&state).create_blog(post("Has slug")).await.unwrap();

    let errors = field_errors(
        service(&state)
            .update_blog(
                blog.id,
                UpdateBlogRequest {
                    slug: Some(String::new()),
                    ..UpdateBlogRequest::default()
                },
            )
            .await,
    );

    assert!(errors.get("slug").is_some());
}

#[test]
async fn test_update_and_delete_missing_blog() {
    let state = test_state();

    let updated = service(&state)
        .update_blog(77, UpdateBlogRequest::default())
        .await;
    assert!(matches!(updated, Err(ApiError::NotFound(_))));
    assert!(matches!(
        service(&state).delete_blog(77).await,
        Err(ApiError::NotFound(_))
    ));
}

// --- Listing ---

#[test]
async fn test_search_requires_every_term_case_insensitively() {
    let state = test_state();
    let blogs = service(&state);
    blogs.create_blog(post("Tokio internals")).await.unwrap();
    let mut with_body = post("Async notes");
    with_body.content = "A deep dive into TOKIO scheduling".to_string();
    blogs.create_blog(with_body).await.unwrap();
    let mut with_excerpt = post("Misc");
    with_excerpt.excerpt = Some("scheduling trivia".to_string());
    blogs.create_blog(with_excerpt).await.unwrap();

    let tokio = blogs
        .list_blogs(&query(BlogFilter {
            search: Some("tokio".to_string()),
            ..BlogFilter::default()
        }))
        .await
        .unwrap();
    assert_eq!(tokio.len(), 2);

    let both = blogs
        .list_blogs(&query(BlogFilter {
            search: Some("Tokio Scheduling".to_string()),
            ..BlogFilter::default()
        }))
        .await
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].fields.slug, "async-notes");
}

#[test]
async fn test_search_treats_wildcards_literally() {
    let state = test_state();
    let blogs = service(&state);
    blogs.create_blog(post("Growth 100%")).await.unwrap();
    blogs.create_blog(post("Growth 1000")).await.unwrap();

    let found = blogs
        .list_blogs(&query(BlogFilter {
            search: Some("100%".to_string()),
            ..BlogFilter::default()
        }))
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].fields.title, "Growth 100%");
}

#[test]
async fn test_ordering_by_updated_at() {
    let state = test_state();
    let blogs = service(&state);
    let oldest = blogs.create_blog(post("First")).await.unwrap();
    blogs.create_blog(post("Second")).await.unwrap();
    blogs.create_blog(post("Third")).await.unwrap();

    tokio::time::sleep(Duration::from_millis(5)).await;
    blogs
        .update_blog(
            oldest.id,
            UpdateBlogRequest {
                excerpt: Some("touched".to_string()),
                ..UpdateBlogRequest::default()
            },
        )
        .await
        .unwrap();

    let default_order = blogs.list_blogs(&BlogQuery::default()).await.unwrap();
    let titles: Vec<&str> = default_order.iter().map(|b| b.fields.title.as_str()).collect();
    assert_eq!(titles, vec!["Third", "Second", "First"]);

    let recent = blogs
        .list_blogs(&query(BlogFilter {
            ordering: Some("-updated_at".to_string()),
            ..BlogFilter::default()
        }))
        .await
        .unwrap();
    assert_eq!(recent[0].id, oldest.id);

    let unknown = blogs
        .list_blogs(&query(BlogFilter {
            ordering: Some("title".to_string()),
            ..BlogFilter::default()
        }))
        .await
        .unwrap();
    assert_eq!(unknown[0].fields.title, "Third");
}

#[test]
async fn test_filters_combine_category_and_status() {
    let state = test_state();
    let blogs = service(&state);
    blogs.create_category(category("News", "news")).await.unwrap();

    for (title, in_news, status) in [
        ("News draft", true, BlogStatus::Draft),
        ("News live", true, BlogStatus::Published),
        ("Other live", false, BlogStatus::Published),
    ] {
        let mut request = post(title);
        request.status = Some(status);
        request.category = in_news.then(|| "news".to_string());
        blogs.create_blog(request).await.unwrap();
    }

    let found = blogs
        .list_blogs(&query(BlogFilter {
            category: Some("news".to_string()),
            status: Some("published".to_string()),
            ..BlogFilter::default()
        }))
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].fields.title, "News live");
}

// --- Categories ---

#[test]
async fn test_categories_listed_by_name_and_searchable() {
    let state = test_state();
    let blogs = service(&state);
    for (name, slug) in [("Zebra", "zebra"), ("Apple", "apple"), ("Mango", "tropical")] {
        blogs.create_category(category(name, slug)).await.unwrap();
    }

    let all = blogs.list_categories(None).await.unwrap();
    let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Apple", "Mango", "Zebra"]);

    let by_slug = blogs.list_categories(Some("TROP")).await.unwrap();
    assert_eq!(by_slug.len(), 1);
    assert_eq!(by_slug[0].name, "Mango");
}

#[test]
async fn test_category_validation_and_uniqueness() {
    let state = test_state();
    let blogs = service(&state);
    let news = blogs.create_category(category("News", "news")).await.unwrap();

    let errors = field_errors(blogs.create_category(category("", "bad slug")).await);
    assert!(errors.get("name").is_some());
    assert!(errors.get("slug").is_some());

    let errors = field_errors(blogs.create_category(category("News", "news-2")).await);
    assert_eq!(
        errors.get("name"),
        Some(&["blog category with this name already exists.".to_string()][..])
    );

    let renamed = blogs
        .update_category(
            news.id,
            CategoryUpdate {
                name: Some("Newsroom".to_string()),
                ..CategoryUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Newsroom");
    assert_eq!(renamed.slug, "news");
}
