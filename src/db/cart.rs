//! Cart lines. Every statement is scoped to the owning user.

use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use tracing::instrument;
use uuid::Uuid;

use super::{reference_violation, RepositoryError};
use crate::domain::aggregates::{Cart, CartChange, CartLine, ProductSnapshot, VariantSnapshot, MAX_LINE_QUANTITY};

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    quantity: i32,
    product_id: Uuid,
    product_name: String,
    product_price: Decimal,
    product_image_url: Option<String>,
    product_stock: i32,
    product_threshold: i32,
    variant_id: Option<Uuid>,
    variant_name: Option<String>,
    variant_price: Option<Decimal>,
    variant_color: Option<String>,
    variant_capacity: Option<String>,
    variant_size: Option<String>,
    variant_stock: Option<i32>,
}

impl From<CartRow> for CartLine {
    fn from(r: CartRow) -> Self {
        let variant = match (r.variant_id, r.variant_name) {
            (Some(id), Some(name)) => Some(VariantSnapshot {
                id,
                name,
                price: r.variant_price,
                color: r.variant_color,
                capacity: r.variant_capacity,
                size: r.variant_size,
                stock_quantity: r.variant_stock.unwrap_or(0),
            }),
            _ => None,
        };
        CartLine {
            id: r.id,
            product: ProductSnapshot {
                id: r.product_id,
                name: r.product_name,
                price: r.product_price,
                image_url: r.product_image_url,
                stock_quantity: r.product_stock,
                stock_threshold: r.product_threshold,
            },
            variant,
            quantity: r.quantity,
        }
    }
}

/// Whether a product can currently go into a cart.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct CartTarget {
    pub is_active: bool,
    pub has_variants: bool,
}

/// Load a user's cart through any executor, so checkout can read it inside
/// its transaction.
pub(crate) async fn load_cart<'e, E: PgExecutor<'e>>(executor: E, user_id: Uuid) -> Result<Cart, RepositoryError> {
    let rows = sqlx::query_as::<_, CartRow>(
        r"
        SELECT ci.id, ci.quantity,
               p.id AS product_id, p.name AS product_name, p.price AS product_price,
               p.image_url AS product_image_url, p.stock_quantity AS product_stock,
               p.stock_threshold AS product_threshold,
               v.id AS variant_id, v.name AS variant_name, v.price AS variant_price,
               v.color AS variant_color, v.capacity AS variant_capacity, v.size AS variant_size,
               v.stock_quantity AS variant_stock
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        LEFT JOIN product_variants v ON v.id = ci.variant_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at
        ",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;
    Ok(Cart::new(user_id, rows.into_iter().map(CartLine::from).collect()))
}

pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self { Self { pool } }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn load(&self, user_id: Uuid) -> Result<Cart, RepositoryError> { load_cart(self.pool, user_id).await }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_target(&self, product_id: Uuid) -> Result<Option<CartTarget>, RepositoryError> {
        let target = sqlx::query_as::<_, CartTarget>("SELECT is_active, has_variants FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(target)
    }

    /// True when the variant exists, is active and belongs to the product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn variant_belongs_to(&self, variant_id: Uuid, product_id: Uuid) -> Result<bool, RepositoryError> {
        let found = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM product_variants WHERE id = $1 AND product_id = $2 AND is_active)",
        )
        .bind(variant_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;
        Ok(found)
    }

    /// Persist a planned cart change.
    ///
    /// Inserts merge with a concurrent insert of the same product/variant pair.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the targeted line is not the user's.
    #[instrument(skip(self))]
    pub async fn apply(&self, user_id: Uuid, change: &CartChange) -> Result<(), RepositoryError> {
        let affected = match *change {
            CartChange::Insert { product_id, variant_id, quantity } => sqlx::query(
                r"
                INSERT INTO cart_items (id, user_id, product_id, variant_id, quantity)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (user_id, product_id, COALESCE(variant_id, '00000000-0000-0000-0000-000000000000'::uuid))
                DO UPDATE SET quantity = LEAST(cart_items.quantity + EXCLUDED.quantity, $6), updated_at = NOW()
                ",
            )
            .bind(Uuid::now_v7())
            .bind(user_id)
            .bind(product_id)
            .bind(variant_id)
            .bind(quantity)
            .bind(MAX_LINE_QUANTITY)
            .execute(self.pool)
            .await
            .map_err(|e| reference_violation(e, "cart item"))?,
            CartChange::SetQuantity { line_id, quantity } => {
                sqlx::query("UPDATE cart_items SET quantity = $3, updated_at = NOW() WHERE id = $1 AND user_id = $2")
                    .bind(line_id).bind(user_id).bind(quantity)
                    .execute(self.pool).await?
            }
            CartChange::Remove { line_id } => sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
                .bind(line_id).bind(user_id)
                .execute(self.pool).await?,
        };
        if affected.rows_affected() == 0 { return Err(RepositoryError::NotFound); }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, user_id: Uuid) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1").bind(user_id).execute(self.pool).await?;
        Ok(result.rows_affected())
    }
}
