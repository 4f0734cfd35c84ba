//! Stock levels and the movement journal.
//!
//! Every change is a conditional update that refuses to take a level below
//! zero, so concurrent sales cannot oversell.

use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::StockMovement;

/// A journal entry to record alongside a stock change.
#[derive(Debug, Clone)]
pub struct NewMovement<'a> {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub quantity_change: i32,
    pub reason: &'a str,
    pub reference_type: Option<&'a str>,
    pub reference_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockAdjustment {
    pub movement: StockMovement,
    pub remaining: i32,
    pub threshold: i32,
}

/// Apply `change` to the variant's stock when one is given, else the product's.
///
/// Returns the new level, or `None` when the row is missing or the result
/// would be negative.
pub(crate) async fn apply_stock_change(
    conn: &mut PgConnection,
    product_id: Uuid,
    variant_id: Option<Uuid>,
    change: i32,
) -> Result<Option<i32>, sqlx::Error> {
    match variant_id {
        Some(variant_id) => {
            sqlx::query_scalar::<_, i32>(
                r"
                UPDATE product_variants SET stock_quantity = stock_quantity + $3
                WHERE id = $1 AND product_id = $2 AND stock_quantity + $3 >= 0
                RETURNING stock_quantity
                ",
            )
            .bind(variant_id)
            .bind(product_id)
            .bind(change)
            .fetch_optional(conn)
            .await
        }
        None => {
            sqlx::query_scalar::<_, i32>(
                r"
                UPDATE products SET stock_quantity = stock_quantity + $2, updated_at = NOW()
                WHERE id = $1 AND stock_quantity + $2 >= 0
                RETURNING stock_quantity
                ",
            )
            .bind(product_id)
            .bind(change)
            .fetch_optional(conn)
            .await
        }
    }
}

pub(crate) async fn record_movement(conn: &mut PgConnection, m: &NewMovement<'_>) -> Result<StockMovement, sqlx::Error> {
    sqlx::query_as::<_, StockMovement>(
        r"
        INSERT INTO stock_movements (id, product_id, variant_id, quantity_change, reason, reference_type, reference_id, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        ",
    )
    .bind(Uuid::now_v7())
    .bind(m.product_id)
    .bind(m.variant_id)
    .bind(m.quantity_change)
    .bind(m.reason)
    .bind(m.reference_type)
    .bind(m.reference_id)
    .bind(m.created_by)
    .fetch_one(conn)
    .await
}

pub struct StockRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StockRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self { Self { pool } }

    /// Manual adjustment from the back-office.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown product or a variant
    /// of another product, `RepositoryError::InsufficientStock` when the level
    /// would go negative.
    #[instrument(skip(self, movement), fields(product_id = %movement.product_id, change = movement.quantity_change))]
    pub async fn adjust(&self, movement: &NewMovement<'_>) -> Result<StockAdjustment, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let (name, threshold) =
            sqlx::query_as::<_, (String, i32)>("SELECT name, stock_threshold FROM products WHERE id = $1")
                .bind(movement.product_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(RepositoryError::NotFound)?;
        if let Some(variant_id) = movement.variant_id {
            let belongs = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS (SELECT 1 FROM product_variants WHERE id = $1 AND product_id = $2)",
            )
            .bind(variant_id)
            .bind(movement.product_id)
            .fetch_one(&mut *tx)
            .await?;
            if !belongs { return Err(RepositoryError::NotFound); }
        }

        let remaining = apply_stock_change(&mut *tx, movement.product_id, movement.variant_id, movement.quantity_change)
            .await?
            .ok_or(RepositoryError::InsufficientStock(name))?;
        let recorded = record_movement(&mut *tx, movement).await?;
        tx.commit().await?;
        Ok(StockAdjustment { movement: recorded, remaining, threshold })
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn movements(&self, product_id: Uuid) -> Result<Vec<StockMovement>, RepositoryError> {
        let movements = sqlx::query_as::<_, StockMovement>(
            "SELECT * FROM stock_movements WHERE product_id = $1 ORDER BY created_at DESC",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(movements)
    }
}
