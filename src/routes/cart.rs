//! The signed-in user's cart.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::db::cart::CartRepository;
use crate::domain::aggregates::{Cart, CartLine};
use crate::domain::pricing::ShippingPolicy;
use crate::error::{AppError, Result};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(get_cart).delete(clear_cart))
        .route("/cart/items", post(add_item))
        .route("/cart/items/:id", patch(update_item).delete(remove_item))
}

fn one() -> i32 { 1 }

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    #[serde(default)]
    pub variant_id: Option<Uuid>,
    #[serde(default = "one")]
    #[validate(range(min = 1, max = 999, message = "must be between 1 and 999"))]
    pub quantity: i32,
}

/// Zero or less removes the line.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateItemRequest {
    #[validate(range(max = 999, message = "must be at most 999"))]
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLine,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total_items: i64,
    pub subtotal: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
}

impl CartView {
    pub fn new(cart: &Cart, policy: &ShippingPolicy) -> Self {
        let totals = cart.totals(policy);
        let lines = cart
            .lines()
            .iter()
            .map(|l| CartLineView { unit_price: l.unit_price(), line_total: l.line_total(), line: l.clone() })
            .collect();
        Self {
            lines,
            total_items: cart.total_items(),
            subtotal: totals.subtotal,
            shipping_cost: totals.shipping_cost,
            total: totals.total,
        }
    }
}

async fn get_cart(State(s): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<CartView>> {
    let cart = CartRepository::new(&s.db).load(user.user_id).await?;
    Ok(Json(CartView::new(&cart, &s.config.shipping)))
}

async fn add_item(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(r): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    r.validate()?;
    let repo = CartRepository::new(&s.db);
    let target = repo
        .product_target(r.product_id)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| AppError::NotFound("product not found".into()))?;
    match r.variant_id {
        Some(variant_id) => {
            if !repo.variant_belongs_to(variant_id, r.product_id).await? {
                return Err(AppError::NotFound("variant not found".into()));
            }
        }
        None if target.has_variants => return Err(AppError::Validation("variant_id is required for this product".into())),
        None => {}
    }

    let cart = repo.load(user.user_id).await?;
    let change = cart.plan_add(r.product_id, r.variant_id, r.quantity)?;
    repo.apply(user.user_id, &change).await?;
    let cart = repo.load(user.user_id).await?;
    Ok(Json(CartView::new(&cart, &s.config.shipping)))
}

/// A quantity below one removes the line.
async fn update_item(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(line_id): Path<Uuid>,
    Json(r): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    r.validate()?;
    let repo = CartRepository::new(&s.db);
    let cart = repo.load(user.user_id).await?;
    let change = cart.plan_set_quantity(line_id, r.quantity)?;
    repo.apply(user.user_id, &change).await?;
    let cart = repo.load(user.user_id).await?;
    Ok(Json(CartView::new(&cart, &s.config.shipping)))
}

async fn remove_item(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(line_id): Path<Uuid>,
) -> Result<StatusCode> {
    let repo = CartRepository::new(&s.db);
    let cart = repo.load(user.user_id).await?;
    let change = cart.plan_remove(line_id)?;
    repo.apply(user.user_id, &change).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_cart(State(s): State<AppState>, CurrentUser(user): CurrentUser) -> Result<StatusCode> {
    let removed = CartRepository::new(&s.db).clear(user.user_id).await?;
    tracing::debug!(user_id = %user.user_id, removed, "Cart cleared");
    Ok(StatusCode::NO_CONTENT)
}
