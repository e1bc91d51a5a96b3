use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::ApiError,
    handlers::AppJson,
    models::{AdminCreateUserRequest, AdminUpdateUserRequest, AdminUser},
    services::accounts::AccountService,
};

// Every route in this module sits behind the admin middleware, so handlers
// do not re-check the caller.

/// list_users
///
/// [Admin] Every account, with flags and role slug.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Users", body = [AdminUser]),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<AdminUser>>, ApiError> {
    let users = AccountService::new(state.repo.as_ref(), &state.config)
        .list_users()
        .await?;
    Ok(Json(users.iter().map(AdminUser::from).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = AdminUser),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AdminUser>, ApiError> {
    let user = AccountService::new(state.repo.as_ref(), &state.config)
        .get_user(id)
        .await?;
    Ok(Json(AdminUser::from(&user)))
}

/// create_user
///
/// [Admin] The password is optional; without one the account cannot log in.
#[utoipa::path(
    post,
    path = "/users",
    request_body = AdminCreateUserRequest,
    responses(
        (status = 201, description = "User created", body = AdminUser),
        (status = 400, description = "Validation errors"),
        (status = 404, description = "Unknown role slug")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AdminCreateUserRequest>,
) -> Result<(StatusCode, Json<AdminUser>), ApiError> {
    let user = AccountService::new(state.repo.as_ref(), &state.config)
        .admin_create(payload)
        .await?;
    Ok((StatusCode::CREATED, Json(AdminUser::from(&user))))
}

/// update_user
///
/// [Admin] Partial update for both PUT and PATCH. `"role": null` clears the
/// role.
#[utoipa::path(
    method(put, patch),
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = AdminUpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = AdminUser),
        (status = 400, description = "Validation errors"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<AdminUpdateUserRequest>,
) -> Result<Json<AdminUser>, ApiError> {
    let user = AccountService::new(state.repo.as_ref(), &state.config)
        .admin_update(id, payload)
        .await?;
    Ok(Json(AdminUser::from(&user)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    AccountService::new(state.repo.as_ref(), &state.config)
        .admin_delete(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
