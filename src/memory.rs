use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    codes,
    models::{
        Blog, BlogCategory, BlogFields, BlogOrderField, BlogQuery, CategoryRequest, NewUser, Role,
        RoleRequest, User,
    },
    repository::{RepoError, Repository},
};

/// MemoryRepository
///
/// In-process implementation of `Repository` for tests and local experiments.
/// It enforces the same unique constraints and null-on-delete references as
/// the Postgres schema, and allocates user codes under its mutex.
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    roles: Vec<Role>,
    users: Vec<StoredUser>,
    categories: Vec<BlogCategory>,
    blogs: Vec<Blog>,
    code_counters: HashMap<String, u32>,
}

/// A user row as stored: the role is a bare id, resolved on read.
#[derive(Clone)]
struct StoredUser {
    user: User,
    role_id: Option<i64>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn resolve_user(&self, stored: &StoredUser) -> User {
        let mut user = stored.user.clone();
        user.role = stored
            .role_id
            .and_then(|id| self.roles.iter().find(|role| role.id == id).cloned());
        user
    }

    fn resolve_blog(&self, blog: &Blog) -> Blog {
        let mut blog = blog.clone();
        blog.fields.category = blog.fields.category_id.and_then(|id| {
            self.categories
                .iter()
                .find(|category| category.id == id)
                .map(|category| category.slug.clone())
        });
        blog
    }

    fn check_role_unique(&self, name: &str, slug: &str, except: Option<i64>) -> Result<(), RepoError> {
        let others = self.roles.iter().filter(|role| Some(role.id) != except);
        for role in others {
            if role.name == name {
                return Err(RepoError::Conflict { entity: "role", field: "name" });
            }
            if role.slug == slug {
                return Err(RepoError::Conflict { entity: "role", field: "slug" });
            }
        }
        Ok(())
    }

    fn check_user_unique(&self, username: &str, email: &str, except: Option<i64>) -> Result<(), RepoError> {
        let others = self.users.iter().filter(|stored| Some(stored.user.id) != except);
        for stored in others {
            if stored.user.username == username {
                return Err(RepoError::Conflict { entity: "user", field: "username" });
            }
            if !email.is_empty() && same_email(&stored.user.email, email) {
                return Err(RepoError::Conflict { entity: "user", field: "email" });
            }
        }
        Ok(())
    }

    fn check_category_unique(&self, name: &str, slug: &str, except: Option<i64>) -> Result<(), RepoError> {
        let others = self.categories.iter().filter(|c| Some(c.id) != except);
        for category in others {
            if category.name == name {
                return Err(RepoError::Conflict { entity: "blog category", field: "name" });
            }
            if category.slug == slug {
                return Err(RepoError::Conflict { entity: "blog category", field: "slug" });
            }
        }
        Ok(())
    }

    fn check_blog_unique(&self, slug: &str, except: Option<i64>) -> Result<(), RepoError> {
        if self
            .blogs
            .iter()
            .any(|blog| Some(blog.id) != except && blog.fields.slug == slug)
        {
            return Err(RepoError::Conflict { entity: "blog", field: "slug" });
        }
        Ok(())
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_roles(&self) -> Result<Vec<Role>, RepoError> {
        let state = self.state.lock().await;
        let mut roles = state.roles.clone();
        roles.sort_by_key(|role| role.id);
        Ok(roles)
    }

    async fn get_role(&self, id: i64) -> Result<Option<Role>, RepoError> {
        let state = self.state.lock().await;
        Ok(state.roles.iter().find(|role| role.id == id).cloned())
    }

    async fn get_role_by_slug(&self, slug: &str) -> Result<Option<Role>, RepoError> {
        let state = self.state.lock().await;
        Ok(state.roles.iter().find(|role| role.slug == slug).cloned())
    }

    async fn create_role(&self, role: RoleRequest) -> Result<Role, RepoError> {
        let mut state = self.state.lock().await;
        state.check_role_unique(&role.name, &role.slug, None)?;
        let created = Role {
            id: state.allocate_id(),
            name: role.name,
            slug: role.slug,
            description: role.description,
        };
        state.roles.push(created.clone());
        Ok(created)
    }

    async fn update_role(&self, role: &Role) -> Result<Role, RepoError> {
        let mut state = self.state.lock().await;
        state.check_role_unique(&role.name, &role.slug, Some(role.id))?;
        let stored = state
            .roles
            .iter_mut()
            .find(|stored| stored.id == role.id)
            .ok_or(RepoError::NotFound)?;
        *stored = role.clone();
        Ok(role.clone())
    }

    async fn delete_role(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state.lock().await;
        let before = state.roles.len();
        state.roles.retain(|role| role.id != id);
        if state.roles.len() == before {
            return Ok(false);
        }
        for stored in state.users.iter_mut().filter(|s| s.role_id == Some(id)) {
            stored.role_id = None;
        }
        Ok(true)
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let state = self.state.lock().await;
        let mut users: Vec<User> = state.users.iter().map(|s| state.resolve_user(s)).collect();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|stored| stored.user.id == id)
            .map(|stored| state.resolve_user(stored)))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|stored| stored.user.username == username)
            .map(|stored| state.resolve_user(stored)))
    }

    async fn username_taken(&self, username: &str, except: Option<i64>) -> Result<bool, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .any(|s| Some(s.user.id) != except && s.user.username == username))
    }

    async fn email_taken(&self, email: &str, except: Option<i64>) -> Result<bool, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .any(|s| Some(s.user.id) != except && same_email(&s.user.email, email)))
    }

    async fn create_user(&self, user: NewUser, code_prefix: &str) -> Result<User, RepoError> {
        let mut state = self.state.lock().await;
        state.check_user_unique(&user.username, &user.email, None)?;
        if let Some(role_id) = user.role_id {
            if !state.roles.iter().any(|role| role.id == role_id) {
                return Err(RepoError::NotFound);
            }
        }

        let counter = state.code_counters.get(code_prefix).copied().unwrap_or(0);
        let (value, user_code) = codes::next_code(
            code_prefix,
            state.users.iter().filter_map(|s| s.user.user_code.as_deref()),
            counter,
        );
        state.code_counters.insert(code_prefix.to_string(), value);

        let stored = StoredUser {
            user: User {
                id: state.allocate_id(),
                username: user.username,
                email: user.email,
                password_hash: user.password_hash,
                is_active: user.is_active,
                is_staff: user.is_staff,
                is_superuser: user.is_superuser,
                role: None,
                user_code: Some(user_code),
            },
            role_id: user.role_id,
        };
        let created = state.resolve_user(&stored);
        state.users.push(stored);
        Ok(created)
    }

    async fn update_user(&self, user: &User) -> Result<User, RepoError> {
        let mut state = self.state.lock().await;
        state.check_user_unique(&user.username, &user.email, Some(user.id))?;
        let role_id = user.role.as_ref().map(|role| role.id);
        let stored = state
            .users
            .iter_mut()
            .find(|stored| stored.user.id == user.id)
            .ok_or(RepoError::NotFound)?;

        let user_code = stored.user.user_code.clone();
        stored.user = User {
            user_code,
            role: None,
            ..user.clone()
        };
        stored.role_id = role_id;
        let stored = stored.clone();
        Ok(state.resolve_user(&stored))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state.lock().await;
        let before = state.users.len();
        state.users.retain(|stored| stored.user.id != id);
        Ok(state.users.len() != before)
    }

    async fn list_categories(&self, search_terms: &[String]) -> Result<Vec<BlogCategory>, RepoError> {
        let state = self.state.lock().await;
        let mut categories: Vec<BlogCategory> = state
            .categories
            .iter()
            .filter(|category| {
                search_terms.iter().all(|term| {
                    contains_ci(&category.name, term) || contains_ci(&category.slug, term)
                })
            })
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category(&self, id: i64) -> Result<Option<BlogCategory>, RepoError> {
        let state = self.state.lock().await;
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<BlogCategory>, RepoError> {
        let state = self.state.lock().await;
        Ok(state.categories.iter().find(|c| c.slug == slug).cloned())
    }

    async fn create_category(&self, category: CategoryRequest) -> Result<BlogCategory, RepoError> {
        let mut state = self.state.lock().await;
        state.check_category_unique(&category.name, &category.slug, None)?;
        let now = Utc::now();
        let created = BlogCategory {
            id: state.allocate_id(),
            name: category.name,
            slug: category.slug,
            created_at: now,
            updated_at: now,
        };
        state.categories.push(created.clone());
        Ok(created)
    }

    async fn update_category(&self, category: &BlogCategory) -> Result<BlogCategory, RepoError> {
        let mut state = self.state.lock().await;
        state.check_category_unique(&category.name, &category.slug, Some(category.id))?;
        let stored = state
            .categories
            .iter_mut()
            .find(|stored| stored.id == category.id)
            .ok_or(RepoError::NotFound)?;
        stored.name = category.name.clone();
        stored.slug = category.slug.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete_category(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state.lock().await;
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        if state.categories.len() == before {
            return Ok(false);
        }
        for blog in state.blogs.iter_mut().filter(|b| b.fields.category_id == Some(id)) {
            blog.fields.category_id = None;
        }
        Ok(true)
    }

    async fn list_blogs(&self, query: &BlogQuery) -> Result<Vec<Blog>, RepoError> {
        let state = self.state.lock().await;
        let mut blogs: Vec<Blog> = state
            .blogs
            .iter()
            .map(|blog| state.resolve_blog(blog))
            .filter(|blog| {
                query
                    .category
                    .as_ref()
                    .is_none_or(|slug| blog.fields.category.as_ref() == Some(slug))
            })
            .filter(|blog| {
                query
                    .status
                    .as_ref()
                    .is_none_or(|status| blog.fields.status.as_str() == status)
            })
            .filter(|blog| {
                let f = &blog.fields;
                query.search_terms.iter().all(|term| {
                    contains_ci(&f.title, term)
                        || contains_ci(&f.slug, term)
                        || contains_ci(&f.excerpt, term)
                        || contains_ci(&f.content, term)
                })
            })
            .collect();

        let tie_break_desc = query.ordering.first().is_none_or(|o| o.descending);
        blogs.sort_by(|a, b| {
            for ordering in &query.ordering {
                let (left, right) = match ordering.field {
                    BlogOrderField::CreatedAt => (a.created_at, b.created_at),
                    BlogOrderField::UpdatedAt => (a.updated_at, b.updated_at),
                };
                let cmp = if ordering.descending {
                    right.cmp(&left)
                } else {
                    left.cmp(&right)
                };
                if cmp.is_ne() {
                    return cmp;
                }
            }
            if tie_break_desc {
                b.id.cmp(&a.id)
            } else {
                a.id.cmp(&b.id)
            }
        });
        Ok(blogs)
    }

    async fn get_blog(&self, id: i64) -> Result<Option<Blog>, RepoError> {
        let state = self.state.lock().await;
        Ok(state
            .blogs
            .iter()
            .find(|blog| blog.id == id)
            .map(|blog| state.resolve_blog(blog)))
    }

    async fn create_blog(&self, fields: BlogFields) -> Result<Blog, RepoError> {
        let mut state = self.state.lock().await;
        state.check_blog_unique(&fields.slug, None)?;
        let now = Utc::now();
        let blog = Blog {
            id: state.allocate_id(),
            fields,
            created_at: now,
            updated_at: now,
        };
        state.blogs.push(blog.clone());
        Ok(state.resolve_blog(&blog))
    }

    async fn update_blog(&self, blog: &Blog) -> Result<Blog, RepoError> {
        let mut state = self.state.lock().await;
        state.check_blog_unique(&blog.fields.slug, Some(blog.id))?;
        let stored = state
            .blogs
            .iter_mut()
            .find(|stored| stored.id == blog.id)
            .ok_or(RepoError::NotFound)?;
        stored.fields = blog.fields.clone();
        stored.updated_at = Utc::now();
        let stored = stored.clone();
        Ok(state.resolve_blog(&stored))
    }

    async fn delete_blog(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state.lock().await;
        let before = state.blogs.len();
        state.blogs.retain(|blog| blog.id != id);
        Ok(state.blogs.len() != before)
    }
}

/// Email equality as the Postgres `lower(email)` index sees it.
fn same_email(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
