use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use super::{reference_violation, RepositoryError};
use crate::domain::aggregates::CategoryDraft;
use crate::models::Category;

pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self { Self { pool } }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE is_active ORDER BY sort_order, name")
            .fetch_all(self.pool)
            .await?;
        Ok(categories)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY sort_order, name")
            .fetch_all(self.pool)
            .await?;
        Ok(categories)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate slug or unknown parent.
    #[instrument(skip(self, draft), fields(slug = %draft.slug))]
    pub async fn create(&self, draft: &CategoryDraft) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            INSERT INTO categories (id, name, slug, description, image_url, icon, parent_id, sort_order, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            ",
        )
        .bind(Uuid::now_v7())
        .bind(&draft.name)
        .bind(draft.slug.as_str())
        .bind(&draft.description)
        .bind(&draft.image_url)
        .bind(&draft.icon)
        .bind(draft.parent_id)
        .bind(draft.sort_order)
        .bind(draft.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| reference_violation(e, "category slug"))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: Uuid, draft: &CategoryDraft) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            UPDATE categories SET name = $2, slug = $3, description = $4, image_url = $5, icon = $6,
                parent_id = $7, sort_order = $8, is_active = $9
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(draft.slug.as_str())
        .bind(&draft.description)
        .bind(&draft.image_url)
        .bind(&draft.icon)
        .bind(draft.parent_id)
        .bind(draft.sort_order)
        .bind(draft.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| reference_violation(e, "category slug"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Products of a deleted category become uncategorized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1").bind(id).execute(self.pool).await?;
        if result.rows_affected() == 0 { return Err(RepositoryError::NotFound); }
        Ok(())
    }
}
