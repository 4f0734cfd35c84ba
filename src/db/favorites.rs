use sqlx::PgPool;
use uuid::Uuid;

use super::{reference_violation, RepositoryError};
use crate::models::FavoriteProduct;

pub struct FavoriteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FavoriteRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self { Self { pool } }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<FavoriteProduct>, RepositoryError> {
        let favorites = sqlx::query_as::<_, FavoriteProduct>(
            r"
            SELECT f.id, f.product_id, f.created_at, p.name, p.slug, p.price, p.image_url, p.stock_quantity
            FROM favorites f
            JOIN products p ON p.id = f.product_id
            WHERE f.user_id = $1
            ORDER BY f.created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(favorites)
    }

    /// Adding a product twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product does not exist.
    pub async fn add(&self, user_id: Uuid, product_id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO favorites (id, user_id, product_id) VALUES ($1, $2, $3) ON CONFLICT (user_id, product_id) DO NOTHING",
        )
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await
        .map_err(|e| reference_violation(e, "favorite"))?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product was not a favorite.
    pub async fn remove(&self, user_id: Uuid, product_id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 { return Err(RepositoryError::NotFound); }
        Ok(())
    }
}
