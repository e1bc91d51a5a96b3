use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    handlers::AppJson,
    models::{Role, RoleRequest, RoleUpdate},
    policy::AdminCaller,
    services::roles::RoleService,
};

/// list_roles
///
/// [Authenticated Route] All roles, ordered by id.
#[utoipa::path(
    get,
    path = "/roles",
    responses((status = 200, description = "Roles", body = [Role]))
)]
pub async fn list_roles(
    _caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Role>>, ApiError> {
    Ok(Json(RoleService::new(state.repo.as_ref()).list().await?))
}

#[utoipa::path(
    get,
    path = "/roles/{id}",
    params(("id" = i64, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role", body = Role),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_role(
    _caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Role>, ApiError> {
    Ok(Json(RoleService::new(state.repo.as_ref()).get(id).await?))
}

/// create_role
///
/// [Admin] Name and slug must both be unique.
#[utoipa::path(
    post,
    path = "/roles",
    request_body = RoleRequest,
    responses(
        (status = 201, description = "Role created", body = Role),
        (status = 400, description = "Validation errors"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn create_role(
    _admin: AdminCaller,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RoleRequest>,
) -> Result<(StatusCode, Json<Role>), ApiError> {
    let role = RoleService::new(state.repo.as_ref()).create(payload).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// update_role
///
/// [Admin] Serves both PUT and PATCH; only supplied fields change.
#[utoipa::path(
    method(put, patch),
    path = "/roles/{id}",
    params(("id" = i64, Path, description = "Role id")),
    request_body = RoleUpdate,
    responses(
        (status = 200, description = "Role updated", body = Role),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_role(
    _admin: AdminCaller,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    AppJson(payload): AppJson<RoleUpdate>,
) -> Result<Json<Role>, ApiError> {
    Ok(Json(
        RoleService::new(state.repo.as_ref()).update(id, payload).await?,
    ))
}

/// delete_role
///
/// [Admin] Users holding the role are kept; their role becomes null.
#[utoipa::path(
    delete,
    path = "/roles/{id}",
    params(("id" = i64, Path, description = "Role id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_role(
    _admin: AdminCaller,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    RoleService::new(state.repo.as_ref()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
