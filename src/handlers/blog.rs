use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    handlers::AppJson,
    models::{
        Blog, BlogCategory, BlogFilter, BlogQuery, CategoryRequest, CategoryUpdate,
        CreateBlogRequest, SearchFilter, UpdateBlogRequest,
    },
    policy::AdminCaller,
    services::blog::BlogService,
};

// --- Categories ---

/// list_categories
///
/// [Authenticated Route] Categories ordered by name, optionally searched by
/// name or slug.
#[utoipa::path(
    get,
    path = "/blog/categories",
    params(SearchFilter),
    responses((status = 200, description = "Blog categories", body = [BlogCategory]))
)]
pub async fn list_categories(
    _caller: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<SearchFilter>,
) -> Result<Json<Vec<BlogCategory>>, ApiError> {
    let categories = BlogService::new(state.repo.as_ref())
        .list_categories(filter.search.as_deref())
        .await?;
    Ok(Json(categories))
}

#[utoipa::path(
    get,
    path = "/blog/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Blog category", body = BlogCategory),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_category(
    _caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<BlogCategory>, ApiError> {
    Ok(Json(BlogService::new(state.repo.as_ref()).get_category(id).await?))
}

#[utoipa::path(
    post,
    path = "/blog/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = BlogCategory),
        (status = 400, description = "Validation errors"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn create_category(
    _admin: AdminCaller,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CategoryRequest>,
) -> Result<(StatusCode, Json<BlogCategory>), ApiError> {
    let category = BlogService::new(state.repo.as_ref())
        .create_category(payload)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    method(put, patch),
    path = "/blog/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    request_body = CategoryUpdate,
    responses(
        (status = 200, description = "Category updated", body = BlogCategory),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_category(
    _admin: AdminCaller,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<CategoryUpdate>,
) -> Result<Json<BlogCategory>, ApiError> {
    let category = BlogService::new(state.repo.as_ref())
        .update_category(id, payload)
        .await?;
    Ok(Json(category))
}

/// delete_category
///
/// [Admin] Posts in the category survive with no category.
#[utoipa::path(
    delete,
    path = "/blog/categories/{id}",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_category(
    _admin: AdminCaller,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    BlogService::new(state.repo.as_ref())
        .delete_category(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Posts ---

/// list_blogs
///
/// [Authenticated Route] Lists posts of every status, newest first unless
/// `ordering` says otherwise.
///
/// `search` splits on whitespace and commas; each term has to appear in the
/// title, slug, excerpt or content.
#[utoipa::path(
    get,
    path = "/blogs",
    params(BlogFilter),
    responses((status = 200, description = "Blogs", body = [Blog]))
)]
pub async fn list_blogs(
    _caller: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<BlogFilter>,
) -> Result<Json<Vec<Blog>>, ApiError> {
    let query = BlogQuery::from(filter);
    Ok(Json(
        BlogService::new(state.repo.as_ref()).list_blogs(&query).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/blogs/{id}",
    params(("id" = i64, Path, description = "Blog id")),
    responses(
        (status = 200, description = "Blog", body = Blog),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_blog(
    _caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Blog>, ApiError> {
    Ok(Json(BlogService::new(state.repo.as_ref()).get_blog(id).await?))
}

/// create_blog
///
/// [Admin] `slug` and `hero_title` default to values derived from the title.
#[utoipa::path(
    post,
    path = "/blogs",
    request_body = CreateBlogRequest,
    responses(
        (status = 201, description = "Blog created", body = Blog),
        (status = 400, description = "Validation errors"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn create_blog(
    _admin: AdminCaller,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateBlogRequest>,
) -> Result<(StatusCode, Json<Blog>), ApiError> {
    let blog = BlogService::new(state.repo.as_ref())
        .create_blog(payload)
        .await?;
    Ok((StatusCode::CREATED, Json(blog)))
}

#[utoipa::path(
    method(put, patch),
    path = "/blogs/{id}",
    params(("id" = i64, Path, description = "Blog id")),
    request_body = UpdateBlogRequest,
    responses(
        (status = 200, description = "Blog updated", body = Blog),
        (status = 400, description = "Validation errors"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_blog(
    _admin: AdminCaller,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<UpdateBlogRequest>,
) -> Result<Json<Blog>, ApiError> {
    let blog = BlogService::new(state.repo.as_ref())
        .update_blog(id, payload)
        .await?;
    Ok(Json(blog))
}

#[utoipa::path(
    delete,
    path = "/blogs/{id}",
    params(("id" = i64, Path, description = "Blog id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_blog(
    _admin: AdminCaller,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    BlogService::new(state.repo.as_ref()).delete_blog(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
