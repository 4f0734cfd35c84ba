//! Order Aggregate
//!
//! An order is a snapshot of the cart at checkout time: names and prices are
//! copied so later catalog edits never rewrite history.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::cart::Cart;
use crate::domain::pricing::{OrderTotals, ShippingPolicy};
use crate::domain::status::PaymentMethod;

#[derive(Clone, Debug, Default)]
pub struct ContactDetails {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub shipping_address: String,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub product_name: String,
    pub variant_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub stock_threshold: i32,
}

#[derive(Clone, Debug)]
pub struct OrderDraft {
    pub user_id: Uuid,
    pub contact: ContactDetails,
    pub payment_method: PaymentMethod,
    pub lines: Vec<OrderLine>,
    pub totals: OrderTotals,
}

impl OrderDraft {
    pub fn from_cart(
        cart: &Cart,
        contact: ContactDetails,
        payment_method: PaymentMethod,
        policy: &ShippingPolicy,
    ) -> Result<Self, OrderError> {
        if cart.is_empty() { return Err(OrderError::EmptyCart); }
        let contact = contact.normalized()?;
        let lines = cart
            .lines()
            .iter()
            .map(|l| OrderLine {
                product_id: l.product.id,
                variant_id: l.variant_id(),
                product_name: l.product.name.clone(),
                variant_name: l.variant.as_ref().map(|v| v.name.clone()),
                quantity: l.quantity,
                unit_price: l.unit_price(),
                total_price: l.line_total(),
                stock_threshold: l.product.stock_threshold,
            })
            .collect::<Vec<_>>();
        let subtotal = lines.iter().map(|l| l.total_price).sum();
        Ok(Self {
            user_id: cart.user_id(),
            contact,
            payment_method,
            lines,
            totals: OrderTotals::compute(subtotal, Decimal::ZERO, policy),
        })
    }
}

impl ContactDetails {
    /// Trim every field; blank optionals become `None`.
    fn normalized(self) -> Result<Self, OrderError> {
        fn required(value: String, field: &'static str) -> Result<String, OrderError> {
            let value = value.trim().to_string();
            if value.is_empty() { return Err(OrderError::MissingField(field)); }
            Ok(value)
        }
        fn optional(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }
        Ok(Self {
            customer_name: required(self.customer_name, "customer_name")?,
            customer_phone: required(self.customer_phone, "customer_phone")?,
            shipping_address: required(self.shipping_address, "shipping_address")?,
            customer_email: optional(self.customer_email),
            notes: optional(self.notes),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("{0} is required")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::cart::tests::{line, product, variant};

    fn contact() -> ContactDetails {
        ContactDetails {
            customer_name: " Amina Ben Salah ".into(),
            customer_phone: "54 080 419".into(),
            customer_email: Some("  ".into()),
            shipping_address: "Av de la République, Zaghouan".into(),
            notes: None,
        }
    }

    #[test]
    fn test_draft_snapshots_lines_and_totals() {
        let cart = Cart::new(Uuid::new_v4(), vec![
            line(product(20, 10), None, 2),
            line(product(100, 10), Some(variant(Some(120), 3)), 1),
        ]);
        let draft = OrderDraft::from_cart(&cart, contact(), PaymentMethod::CashOnDelivery, &ShippingPolicy::default()).unwrap();
        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[1].unit_price, Decimal::new(120, 0));
        assert_eq!(draft.lines[1].variant_name.as_deref(), Some("Noir / 128 Go"));
        assert_eq!(draft.totals.subtotal, Decimal::new(160, 0));
        assert_eq!(draft.totals.shipping_cost, Decimal::new(7, 0));
        assert_eq!(draft.totals.total, Decimal::new(167, 0));
        assert_eq!(draft.contact.customer_name, "Amina Ben Salah");
        assert_eq!(draft.contact.customer_email, None);
        assert_eq!(draft.user_id, cart.user_id());
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let cart = Cart::new(Uuid::new_v4(), vec![]);
        let err = OrderDraft::from_cart(&cart, contact(), PaymentMethod::Card, &ShippingPolicy::default()).unwrap_err();
        assert_eq!(err, OrderError::EmptyCart);
    }

    #[test]
    fn test_missing_contact_field_is_rejected() {
        let cart = Cart::new(Uuid::new_v4(), vec![line(product(20, 10), None, 1)]);
        let mut c = contact();
        c.shipping_address = "   ".into();
        let err = OrderDraft::from_cart(&cart, c, PaymentMethod::Card, &ShippingPolicy::default()).unwrap_err();
        assert_eq!(err, OrderError::MissingField("shipping_address"));
    }
}
