//! Category service: list, fetch, create, delete.

use sqlx::PgPool;
use uuid::Uuid;

use super::{ErrorKind, ServiceError, check_len, require};
use crate::db::{self, SlugTable};
use crate::models::category::{CATEGORY_COLUMNS, CATEGORY_NAME_MAX};
use crate::models::{CATEGORY_SLUG_MAX, Category, is_hex_color, slugify};

#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("category not found: {0}")]
    NotFound(String),
    #[error("category already exists: {0}")]
    Conflict(String),
    #[error("invalid category: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError for CategoryError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::Database(_) => ErrorKind::Database,
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

pub(crate) fn validate_new_category(input: &NewCategory) -> Result<String, CategoryError> {
    require("name", &input.name).map_err(CategoryError::Invalid)?;
    check_len("name", &input.name, CATEGORY_NAME_MAX).map_err(CategoryError::Invalid)?;
    if let Some(color) = &input.color {
        if !is_hex_color(color) {
            return Err(CategoryError::Invalid("color must be #RRGGBB".into()));
        }
    }
    if let Some(icon) = &input.icon {
        check_len("icon", icon, 50).map_err(CategoryError::Invalid)?;
    }
    let slug = slugify(input.slug.as_deref().unwrap_or(&input.name), CATEGORY_SLUG_MAX);
    Ok(slug)
}

/// List active categories in display order.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_active(pool: &PgPool) -> Result<Vec<Category>, CategoryError> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE is_active ORDER BY sort_order ASC, name ASC");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    rows.iter()
        .map(|r| Category::from_row(r).map_err(CategoryError::from))
        .collect()
}

/// Fetch an active category by slug.
///
/// # Errors
///
/// Returns `NotFound` if the slug is unknown or the category is inactive.
pub async fn get_by_slug(pool: &PgPool, slug: &str) -> Result<Category, CategoryError> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1 AND is_active");
    let row = sqlx::query(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CategoryError::NotFound(slug.to_owned()))?;
    Ok(Category::from_row(&row)?)
}

/// Create a category. The slug derives from `slug` or `name`; a name-derived
/// slug that is taken gets a `-2`, `-3`, ... suffix.
///
/// # Errors
///
/// Returns `Invalid` for bad input and `Conflict` on a duplicate name or an
/// explicit slug that is taken.
pub async fn create(pool: &PgPool, input: &NewCategory) -> Result<Category, CategoryError> {
    let slug = validate_new_category(input)?;

    let mut tx = pool.begin().await?;
    let slug = if input.slug.is_some() {
        if db::slug_taken(&mut tx, SlugTable::Categories, &slug).await? {
            return Err(CategoryError::Conflict(slug));
        }
        slug
    } else {
        db::free_slug(&mut tx, SlugTable::Categories, &slug, CATEGORY_SLUG_MAX)
            .await?
            .ok_or(CategoryError::Conflict(slug))?
    };

    let sql = format!(
        "INSERT INTO categories (id, name, slug, description, color, icon, sort_order, meta_title, meta_description)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {CATEGORY_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(&slug)
        .bind(&input.description)
        .bind(&input.color)
        .bind(&input.icon)
        .bind(input.sort_order)
        .bind(&input.meta_title)
        .bind(&input.meta_description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) { CategoryError::Conflict(slug.clone()) } else { CategoryError::Database(e) }
        })?;
    tx.commit().await?;

    let category = Category::from_row(&row)?;
    tracing::info!(category_id = %category.id, slug = %category.slug, "category created");
    Ok(category)
}

/// Delete a category. Photos in it keep existing with no category.
///
/// # Errors
///
/// Returns `NotFound` if the slug is unknown.
pub async fn delete(pool: &PgPool, slug: &str) -> Result<(), CategoryError> {
    let result = sqlx::query("DELETE FROM categories WHERE slug = $1")
        .bind(slug)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(CategoryError::NotFound(slug.to_owned()));
    }
    tracing::info!(%slug, "category deleted");
    Ok(())
}

/// Resolve a category slug to its id.
///
/// # Errors
///
/// Returns `NotFound` if the slug is unknown.
pub async fn id_for_slug(pool: &PgPool, slug: &str) -> Result<Uuid, CategoryError> {
    sqlx::query_scalar("SELECT id FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CategoryError::NotFound(slug.to_owned()))
}
