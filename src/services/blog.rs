use crate::{
    error::{ApiError, FieldErrors},
    models::{
        Blog, BlogCategory, BlogFields, BlogQuery, CategoryRequest, CategoryUpdate,
        CreateBlogRequest, UpdateBlogRequest, search_terms,
    },
    repository::Repository,
    services::{BLANK, check_max_len, check_required, check_slug, check_url},
    slug,
};

pub const CATEGORY_NAME_MAX: usize = 120;
pub const CATEGORY_SLUG_MAX: usize = 140;

pub const TITLE_MAX: usize = 240;
pub const SLUG_MAX: usize = 260;
pub const URL_MAX: usize = 200;

const NOT_FOUND: &str = "Not found.";
const UNDERIVABLE_SLUG: &str = "Unable to derive a slug from the title.";
const NEGATIVE: &str = "Ensure this value is greater than or equal to 0.";

/// Bounded optional text fields of a blog post.
const TEXT_LIMITS: &[(&str, usize)] = &[
    ("hero_title", 240),
    ("hero_kicker_top", 120),
    ("hero_kicker_bottom", 260),
    ("main_heading", 260),
    ("author_name", 120),
    ("author_title", 160),
    ("cta_button_label", 160),
];

/// BlogService
///
/// Blog posts and their categories. Slugs and hero titles are filled in
/// from the title once, at creation; later edits never recompute them.
pub struct BlogService<'a> {
    repo: &'a dyn Repository,
}

impl<'a> BlogService<'a> {
    pub fn new(repo: &'a dyn Repository) -> Self {
        Self { repo }
    }

    // --- Categories ---

    pub async fn list_categories(&self, search: Option<&str>) -> Result<Vec<BlogCategory>, ApiError> {
        Ok(self.repo.list_categories(&search_terms(search)).await?)
    }

    pub async fn get_category(&self, id: i64) -> Result<BlogCategory, ApiError> {
        self.repo
            .get_category(id)
            .await?
            .ok_or_else(|| ApiError::not_found(NOT_FOUND))
    }

    pub async fn create_category(&self, req: CategoryRequest) -> Result<BlogCategory, ApiError> {
        validate_category(&req.name, &req.slug)?;
        let category = self.repo.create_category(req).await?;
        tracing::info!(category_id = category.id, slug = %category.slug, "blog category created");
        Ok(category)
    }

    pub async fn update_category(&self, id: i64, req: CategoryUpdate) -> Result<BlogCategory, ApiError> {
        let mut category = self.get_category(id).await?;
        if let Some(name) = req.name {
            category.name = name;
        }
        if let Some(slug) = req.slug {
            category.slug = slug;
        }
        validate_category(&category.name, &category.slug)?;
        Ok(self.repo.update_category(&category).await?)
    }

    /// Posts in the category stay, uncategorised.
    pub async fn delete_category(&self, id: i64) -> Result<(), ApiError> {
        if !self.repo.delete_category(id).await? {
            return Err(ApiError::not_found(NOT_FOUND));
        }
        tracing::info!(category_id = id, "blog category deleted");
        Ok(())
    }

    // --- Posts ---

    pub async fn list_blogs(&self, query: &BlogQuery) -> Result<Vec<Blog>, ApiError> {
        Ok(self.repo.list_blogs(query).await?)
    }

    pub async fn get_blog(&self, id: i64) -> Result<Blog, ApiError> {
        self.repo
            .get_blog(id)
            .await?
            .ok_or_else(|| ApiError::not_found(NOT_FOUND))
    }

    pub async fn create_blog(&self, req: CreateBlogRequest) -> Result<Blog, ApiError> {
        let mut errors = FieldErrors::new();

        let slug = match req.slug.filter(|s| !s.is_empty()) {
            Some(explicit) => explicit,
            None => {
                let derived = slug::derive_blog_slug(&req.title);
                if derived.is_empty() && !req.title.trim().is_empty() {
                    errors.push("slug", UNDERIVABLE_SLUG);
                }
                derived
            }
        };
        let hero_title = req
            .hero_title
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| req.title.clone());

        let category_id = self
            .resolve_category(req.category.as_deref(), &mut errors)
            .await?;

        let fields = BlogFields {
            title: req.title,
            slug,
            status: req.status.unwrap_or_default(),
            category_id,
            category: None,
            hero_title,
            hero_kicker_top: req.hero_kicker_top.unwrap_or_default(),
            hero_kicker_bottom: req.hero_kicker_bottom.unwrap_or_default(),
            main_heading: req.main_heading.unwrap_or_default(),
            author_name: req.author_name.unwrap_or_default(),
            author_title: req.author_title.unwrap_or_default(),
            published_date: req.published_date,
            last_updated: req.last_updated,
            read_time: req.read_time.unwrap_or(0),
            featured_image_url: req.featured_image_url.unwrap_or_default(),
            intro: req.intro.unwrap_or_default(),
            whats_inside: req.whats_inside,
            sections: req.sections,
            faqs: req.faqs,
            cta_text: req.cta_text.unwrap_or_default(),
            cta_button_label: req.cta_button_label.unwrap_or_default(),
            cta_button_link: req.cta_button_link.unwrap_or_default(),
            extra_categories: req.extra_categories,
            excerpt: req.excerpt.unwrap_or_default(),
            content: req.content,
        };
        check_fields(&fields, &mut errors);
        errors.into_result()?;

        let blog = self.repo.create_blog(fields).await?;
        tracing::info!(blog_id = blog.id, slug = %blog.fields.slug, "blog created");
        Ok(blog)
    }

    /// Partial update; absent keys are left alone, explicit nulls clear.
    pub async fn update_blog(&self, id: i64, req: UpdateBlogRequest) -> Result<Blog, ApiError> {
        let mut blog = self.get_blog(id).await?;
        let mut errors = FieldErrors::new();
        let f = &mut blog.fields;

        if let Some(category) = req.category {
            f.category_id = self
                .resolve_category(category.as_deref(), &mut errors)
                .await?;
        }

        macro_rules! assign {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = req.$field {
                    f.$field = value;
                })*
            };
        }
        assign!(
            title,
            slug,
            status,
            hero_title,
            hero_kicker_top,
            hero_kicker_bottom,
            main_heading,
            author_name,
            author_title,
            published_date,
            last_updated,
            read_time,
            featured_image_url,
            intro,
            whats_inside,
            sections,
            faqs,
            cta_text,
            cta_button_label,
            cta_button_link,
            extra_categories,
            excerpt,
            content,
        );

        check_fields(f, &mut errors);
        errors.into_result()?;

        let blog = self.repo.update_blog(&blog).await?;
        tracing::info!(blog_id = blog.id, "blog updated");
        Ok(blog)
    }

    pub async fn delete_blog(&self, id: i64) -> Result<(), ApiError> {
        if !self.repo.delete_blog(id).await? {
            return Err(ApiError::not_found(NOT_FOUND));
        }
        tracing::info!(blog_id = id, "blog deleted");
        Ok(())
    }

    /// Maps a category slug to its id. Unknown slugs are a field error on
    /// `category`; an empty or absent slug means no category.
    async fn resolve_category(
        &self,
        slug: Option<&str>,
        errors: &mut FieldErrors,
    ) -> Result<Option<i64>, ApiError> {
        let Some(slug) = slug.filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        match self.repo.get_category_by_slug(slug).await? {
            Some(category) => Ok(Some(category.id)),
            None => {
                errors.push("category", format!("Object with slug={slug} does not exist."));
                Ok(None)
            }
        }
    }
}

fn validate_category(name: &str, slug: &str) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();
    check_required(&mut errors, "name", name, CATEGORY_NAME_MAX);
    check_slug(&mut errors, "slug", slug, CATEGORY_SLUG_MAX);
    errors.into_result()
}

/// Limits shared by create and update. A slug already flagged is not
/// re-checked.
fn check_fields(fields: &BlogFields, errors: &mut FieldErrors) {
    check_required(errors, "title", &fields.title, TITLE_MAX);
    if errors.get("slug").is_none() {
        check_slug(errors, "slug", &fields.slug, SLUG_MAX);
    }
    if fields.content.trim().is_empty() {
        errors.push("content", BLANK);
    }

    let texts = [
        &fields.hero_title,
        &fields.hero_kicker_top,
        &fields.hero_kicker_bottom,
        &fields.main_heading,
        &fields.author_name,
        &fields.author_title,
        &fields.cta_button_label,
    ];
    for ((field, max), value) in TEXT_LIMITS.iter().zip(texts) {
        check_max_len(errors, field, value, *max);
    }

    if fields.read_time < 0 {
        errors.push("read_time", NEGATIVE);
    }
    check_url(errors, "featured_image_url", &fields.featured_image_url, URL_MAX);
    check_url(errors, "cta_button_link", &fields.cta_button_link, URL_MAX);
}
