use crate::{
    error::{ApiError, FieldErrors},
    models::{Role, RoleRequest, RoleUpdate},
    repository::Repository,
    services::{check_required, check_slug},
};

pub const NAME_MAX: usize = 50;
pub const SLUG_MAX: usize = 60;

const ROLE_NOT_FOUND: &str = "Not found.";

/// RoleService
///
/// CRUD over roles. Authorization happens before these calls.
pub struct RoleService<'a> {
    repo: &'a dyn Repository,
}

impl<'a> RoleService<'a> {
    pub fn new(repo: &'a dyn Repository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Role>, ApiError> {
        Ok(self.repo.list_roles().await?)
    }

    pub async fn get(&self, id: i64) -> Result<Role, ApiError> {
        self.repo
            .get_role(id)
            .await?
            .ok_or_else(|| ApiError::not_found(ROLE_NOT_FOUND))
    }

    pub async fn create(&self, req: RoleRequest) -> Result<Role, ApiError> {
        validate(&req.name, &req.slug)?;
        let role = self.repo.create_role(req).await?;
        tracing::info!(role_id = role.id, slug = %role.slug, "role created");
        Ok(role)
    }

    pub async fn update(&self, id: i64, req: RoleUpdate) -> Result<Role, ApiError> {
        let mut role = self.get(id).await?;
        if let Some(name) = req.name {
            role.name = name;
        }
        if let Some(slug) = req.slug {
            role.slug = slug;
        }
        if let Some(description) = req.description {
            role.description = description;
        }
        validate(&role.name, &role.slug)?;

        let role = self.repo.update_role(&role).await?;
        tracing::info!(role_id = role.id, "role updated");
        Ok(role)
    }

    /// Users holding the role keep existing with no role.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        if !self.repo.delete_role(id).await? {
            return Err(ApiError::not_found(ROLE_NOT_FOUND));
        }
        tracing::info!(role_id = id, "role deleted");
        Ok(())
    }
}

fn validate(name: &str, slug: &str) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();
    check_required(&mut errors, "name", name, NAME_MAX);
    check_slug(&mut errors, "slug", slug, SLUG_MAX);
    errors.into_result()
}
