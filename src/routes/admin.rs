use crate::{AppState, handlers::users};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// User management. The whole router is wrapped in the admin middleware,
/// which authenticates the caller and applies the admin policy, so even
/// listing and retrieving users is admin-only.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET/POST /users
        .route("/users", get(users::list_users).post(users::create_user))
        // GET/PUT/PATCH/DELETE /users/{id}
        // PUT and PATCH are both partial updates; user_code never changes.
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
}
