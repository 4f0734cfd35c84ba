//! Orders, their line items, and the checkout transaction.

use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use super::stock::{apply_stock_change, record_movement, NewMovement};
use super::{like_pattern, next_reference, non_blank, RepositoryError, MAX_REFERENCE_ATTEMPTS};
use crate::domain::aggregates::{OrderDraft, OrderLine};
use crate::domain::reference::ReferenceKind;
use crate::domain::status::{OrderStatus, PaymentStatus};
use crate::models::{Order, OrderDetail, OrderItem};

/// Stock left at or below its threshold after a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LowStock {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub remaining: i32,
    pub threshold: i32,
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: OrderDetail,
    pub low_stock: Vec<LowStock>,
}

/// Back-office order edit; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

fn line_label(line: &OrderLine) -> String {
    match &line.variant_name {
        Some(variant) => format!("{} ({variant})", line.product_name),
        None => line.product_name.clone(),
    }
}

pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self { Self { pool } }

    /// Turn a draft into an order in one transaction.
    ///
    /// Inserts the order and its items, takes each line out of stock, journals
    /// the movements and removes the checked-out cart lines. Any line short on
    /// stock rolls the whole checkout back.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InsufficientStock` naming the first short line,
    /// `RepositoryError::Conflict` if no free order number was found.
    #[instrument(skip(self, draft, cart_line_ids), fields(user_id = %draft.user_id, lines = draft.lines.len()))]
    pub async fn place(&self, draft: &OrderDraft, cart_line_ids: &[Uuid]) -> Result<PlacedOrder, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut order = None;
        for _ in 0..MAX_REFERENCE_ATTEMPTS {
            let number = next_reference(ReferenceKind::Order);
            order = sqlx::query_as::<_, Order>(
                r"
                INSERT INTO orders (id, order_number, user_id, customer_name, customer_phone, customer_email,
                    shipping_address, subtotal, shipping_cost, discount, total, status, payment_method,
                    payment_status, notes)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
                ON CONFLICT (order_number) DO NOTHING
                RETURNING *
                ",
            )
            .bind(Uuid::now_v7())
            .bind(&number)
            .bind(draft.user_id)
            .bind(&draft.contact.customer_name)
            .bind(&draft.contact.customer_phone)
            .bind(&draft.contact.customer_email)
            .bind(&draft.contact.shipping_address)
            .bind(draft.totals.subtotal)
            .bind(draft.totals.shipping_cost)
            .bind(draft.totals.discount)
            .bind(draft.totals.total)
            .bind(OrderStatus::Pending.as_str())
            .bind(draft.payment_method.as_str())
            .bind(PaymentStatus::Pending.as_str())
            .bind(&draft.contact.notes)
            .fetch_optional(&mut *tx)
            .await?;
            if order.is_some() { break; }
            tracing::warn!(order_number = %number, "Order number collision, retrying");
        }
        let order = order.ok_or_else(|| RepositoryError::Conflict("could not allocate an order number".into()))?;

        let mut items = Vec::with_capacity(draft.lines.len());
        let mut low_stock = Vec::new();
        for (position, line) in draft.lines.iter().enumerate() {
            let item = sqlx::query_as::<_, OrderItem>(
                r"
                INSERT INTO order_items (id, order_id, product_id, product_name, variant_id, variant_name,
                    quantity, unit_price, total_price, position)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING id, order_id, product_id, product_name, variant_id, variant_name, quantity, unit_price, total_price
                ",
            )
            .bind(Uuid::now_v7())
            .bind(order.id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.variant_id)
            .bind(&line.variant_name)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.total_price)
            .bind(i32::try_from(position).unwrap_or(i32::MAX))
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);

            let remaining = apply_stock_change(&mut *tx, line.product_id, line.variant_id, -line.quantity)
                .await?
                .ok_or_else(|| RepositoryError::InsufficientStock(line_label(line)))?;
            record_movement(&mut *tx, &NewMovement {
                product_id: line.product_id,
                variant_id: line.variant_id,
                quantity_change: -line.quantity,
                reason: "sale",
                reference_type: Some("order"),
                reference_id: Some(order.id),
                created_by: Some(draft.user_id),
            })
            .await?;
            if remaining <= line.stock_threshold {
                low_stock.push(LowStock {
                    product_id: line.product_id,
                    variant_id: line.variant_id,
                    remaining,
                    threshold: line.stock_threshold,
                });
            }
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND id = ANY($2)")
            .bind(draft.user_id)
            .bind(cart_line_ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(order_number = %order.order_number, total = %order.total, "Order placed");
        Ok(PlacedOrder { order: OrderDetail::new(order, items), low_stock })
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(orders)
    }

    /// Another user's order is reported as missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` unless the order belongs to `user_id`.
    pub async fn get_for_user(&self, user_id: Uuid, id: Uuid) -> Result<OrderDetail, RepositoryError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let items = self.items(order.id).await?;
        Ok(OrderDetail::new(order, items))
    }

    /// `status` of `None` lists every order; `search` matches the order
    /// number, customer name or phone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, status: Option<&str>, search: Option<&str>) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT * FROM orders
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::TEXT IS NULL OR order_number ILIKE $2 OR customer_name ILIKE $2 OR customer_phone ILIKE $2)
            ORDER BY created_at DESC
            ",
        )
        .bind(status)
        .bind(non_blank(search).map(like_pattern))
        .fetch_all(self.pool)
        .await?;
        Ok(orders)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn get(&self, id: Uuid) -> Result<OrderDetail, RepositoryError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let items = self.items(order.id).await?;
        Ok(OrderDetail::new(order, items))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    #[instrument(skip(self))]
    pub async fn update(&self, id: Uuid, update: &OrderUpdate) -> Result<OrderDetail, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            UPDATE orders SET
                status = COALESCE($2, status),
                payment_status = COALESCE($3, payment_status),
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(update.status.map(OrderStatus::as_str))
        .bind(update.payment_status.map(PaymentStatus::as_str))
        .bind(&update.notes)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        let items = self.items(order.id).await?;
        Ok(OrderDetail::new(order, items))
    }

    async fn items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, product_name, variant_id, variant_name, quantity, unit_price, total_price
            FROM order_items WHERE order_id = $1 ORDER BY position, id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }
}
