use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::db::cart::CartRepository;
use crate::db::orders::OrderRepository;
use crate::domain::aggregates::{ContactDetails, OrderDraft};
use crate::domain::events::DomainEvent;
use crate::domain::status::PaymentMethod;
use crate::error::Result;
use crate::models::OrderDetail;
use crate::state::AppState;

pub fn routes() -> Router<AppState> { Router::new().route("/checkout", post(checkout)) }

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub customer_phone: String,
    #[validate(email(message = "must be a valid email"))]
    pub customer_email: Option<String>,
    pub shipping_address: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_number: String,
    pub order: OrderDetail,
}

impl From<CheckoutRequest> for ContactDetails {
    fn from(r: CheckoutRequest) -> Self {
        Self {
            customer_name: r.customer_name,
            customer_phone: r.customer_phone,
            customer_email: r.customer_email,
            shipping_address: r.shipping_address,
            notes: r.notes,
        }
    }
}

/// Place an order from the caller's cart.
async fn checkout(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(mut r): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    r.customer_email = r.customer_email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty());
    r.validate()?;
    let payment_method = r.payment_method;

    let cart = CartRepository::new(&s.db).load(user.user_id).await?;
    let draft = OrderDraft::from_cart(&cart, r.into(), payment_method, &s.config.shipping)?;
    let line_ids: Vec<Uuid> = cart.lines().iter().map(|l| l.id).collect();
    let placed = OrderRepository::new(&s.db).place(&draft, &line_ids).await?;

    let order = &placed.order.order;
    s.events.publish(DomainEvent::OrderPlaced {
        order_id: order.id,
        order_number: order.order_number.clone(),
        user_id: order.user_id,
        total: order.total,
    });
    for low in &placed.low_stock {
        tracing::warn!(product_id = %low.product_id, remaining = low.remaining, "Stock low after sale");
        s.events.publish(DomainEvent::StockLow {
            product_id: low.product_id,
            variant_id: low.variant_id,
            remaining: low.remaining,
            threshold: low.threshold,
        });
    }

    let order_number = order.order_number.clone();
    Ok((StatusCode::CREATED, Json(CheckoutResponse { order_number, order: placed.order })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_defaults_to_cash_on_delivery() {
        let r: CheckoutRequest = serde_json::from_value(serde_json::json!({
            "customer_name": "Mohamed",
            "customer_phone": "54 080 419",
            "shipping_address": "Av de la République, Zaghouan"
        }))
        .unwrap();
        assert_eq!(r.payment_method, PaymentMethod::CashOnDelivery);
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_invalid_email_is_rejected() {
        let r: CheckoutRequest = serde_json::from_value(serde_json::json!({
            "customer_name": "Mohamed",
            "customer_phone": "54080419",
            "customer_email": "nope",
            "shipping_address": "Zaghouan",
            "payment_method": "card"
        }))
        .unwrap();
        assert_eq!(r.payment_method, PaymentMethod::Card);
        assert!(r.validate().is_err());
    }
}
