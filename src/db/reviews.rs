use sqlx::PgPool;
use uuid::Uuid;

use super::{reference_violation, RepositoryError};
use crate::models::Review;

pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self { Self { pool } }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn approved_for(&self, product_id: Uuid) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE product_id = $1 AND is_approved ORDER BY created_at DESC",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(reviews)
    }

    /// New reviews wait for moderation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product does not exist.
    pub async fn create(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        sqlx::query_as::<_, Review>(
            r"
            INSERT INTO reviews (id, user_id, product_id, rating, comment, is_approved)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            RETURNING *
            ",
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(product_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(self.pool)
        .await
        .map_err(|e| reference_violation(e, "review"))
    }
}
