//! Cart Aggregate

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::pricing::{effective_unit_price, line_total, OrderTotals, ShippingPolicy};

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: i32 = 999;

#[derive(Clone, Debug)]
pub struct Cart {
    user_id: Uuid,
    lines: Vec<CartLine>,
}

/// A cart row joined with the product (and variant) it points at.
#[derive(Clone, Debug, Serialize)]
pub struct CartLine {
    pub id: Uuid,
    pub product: ProductSnapshot,
    pub variant: Option<VariantSnapshot>,
    pub quantity: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub stock_quantity: i32,
    pub stock_threshold: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct VariantSnapshot {
    pub id: Uuid,
    pub name: String,
    pub price: Option<Decimal>,
    pub color: Option<String>,
    pub capacity: Option<String>,
    pub size: Option<String>,
    pub stock_quantity: i32,
}

impl CartLine {
    pub fn variant_id(&self) -> Option<Uuid> { self.variant.as_ref().map(|v| v.id) }
    pub fn unit_price(&self) -> Decimal {
        effective_unit_price(self.product.price, self.variant.as_ref().and_then(|v| v.price))
    }
    pub fn line_total(&self) -> Decimal { line_total(self.unit_price(), self.quantity) }
    /// Stock that this line draws from: the variant's when one is selected.
    pub fn available_stock(&self) -> i32 {
        self.variant.as_ref().map_or(self.product.stock_quantity, |v| v.stock_quantity)
    }
}

/// Write the caller must persist after a cart command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartChange {
    Insert { product_id: Uuid, variant_id: Option<Uuid>, quantity: i32 },
    SetQuantity { line_id: Uuid, quantity: i32 },
    Remove { line_id: Uuid },
}

impl Cart {
    pub fn new(user_id: Uuid, lines: Vec<CartLine>) -> Self { Self { user_id, lines } }

    pub fn user_id(&self) -> Uuid { self.user_id }
    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
    pub fn total_items(&self) -> i64 { self.lines.iter().map(|l| i64::from(l.quantity)).sum() }
    pub fn subtotal(&self) -> Decimal { self.lines.iter().map(CartLine::line_total).sum() }

    /// An empty cart owes no shipping.
    pub fn totals(&self, policy: &ShippingPolicy) -> OrderTotals {
        if self.is_empty() { return OrderTotals::empty(); }
        OrderTotals::compute(self.subtotal(), Decimal::ZERO, policy)
    }

    pub fn find(&self, line_id: Uuid) -> Option<&CartLine> { self.lines.iter().find(|l| l.id == line_id) }

    /// Adding a product/variant pair already in the cart bumps that line,
    /// capped at [`MAX_LINE_QUANTITY`].
    pub fn plan_add(&self, product_id: Uuid, variant_id: Option<Uuid>, quantity: i32) -> Result<CartChange, CartError> {
        if !(1..=MAX_LINE_QUANTITY).contains(&quantity) { return Err(CartError::InvalidQuantity(quantity)); }
        match self.lines.iter().find(|l| l.product.id == product_id && l.variant_id() == variant_id) {
            Some(existing) => Ok(CartChange::SetQuantity {
                line_id: existing.id,
                quantity: existing.quantity.saturating_add(quantity).min(MAX_LINE_QUANTITY),
            }),
            None => Ok(CartChange::Insert { product_id, variant_id, quantity }),
        }
    }

    /// A quantity below one removes the line.
    pub fn plan_set_quantity(&self, line_id: Uuid, quantity: i32) -> Result<CartChange, CartError> {
        let line = self.find(line_id).ok_or(CartError::LineNotFound)?;
        if quantity < 1 { return Ok(CartChange::Remove { line_id: line.id }); }
        if quantity > MAX_LINE_QUANTITY { return Err(CartError::InvalidQuantity(quantity)); }
        Ok(CartChange::SetQuantity { line_id: line.id, quantity })
    }

    pub fn plan_remove(&self, line_id: Uuid) -> Result<CartChange, CartError> {
        let line = self.find(line_id).ok_or(CartError::LineNotFound)?;
        Ok(CartChange::Remove { line_id: line.id })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("cart line not found")]
    LineNotFound,
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i32),
}
