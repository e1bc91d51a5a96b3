use crate::{
    AppState,
    handlers::{auth, blog, roles},
};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Every route here sits behind the authentication middleware, which resolves
/// the bearer token into an `AuthUser` before any handler runs.
///
/// Reads and writes share paths (`GET /roles` and `POST /roles`), so the
/// admin policy for writes comes from the `AdminCaller` extractor of the
/// mutating handlers rather than from a separate router.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /auth/me
        .route("/auth/me", get(auth::get_me))
        // --- Roles ---
        .route("/roles", get(roles::list_roles).post(roles::create_role))
        .route(
            "/roles/{id}",
            get(roles::get_role)
                .put(roles::update_role)
                .patch(roles::update_role)
                .delete(roles::delete_role),
        )
        // --- Blog categories ---
        // GET /blog/categories?search=...
        .route(
            "/blog/categories",
            get(blog::list_categories).post(blog::create_category),
        )
        .route(
            "/blog/categories/{id}",
            get(blog::get_category)
                .put(blog::update_category)
                .patch(blog::update_category)
                .delete(blog::delete_category),
        )
        // --- Blogs ---
        // GET /blogs?category=...&status=...&search=...&ordering=...
        .route("/blogs", get(blog::list_blogs).post(blog::create_blog))
        .route(
            "/blogs/{id}",
            get(blog::get_blog)
                .put(blog::update_blog)
                .patch(blog::update_blog)
                .delete(blog::delete_blog),
        )
}
