//! Catalog management: products, variants and stock.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AdminUser, StaffUser};
use crate::db::catalog::{AdminProductFilter, CatalogRepository};
use crate::db::stock::{NewMovement, StockAdjustment, StockRepository};
use crate::domain::aggregates::{ProductDraft, ProductInput, VariantDraft, VariantInput};
use crate::domain::events::DomainEvent;
use crate::error::{AppError, Result};
use crate::models::{ProductVariant, ProductView, StockMovement};
use crate::routes::not_blank;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/:id", get(get_product).put(update_product).delete(delete_product))
        .route("/products/:id/variants", post(create_variant))
        .route("/products/:id/stock", get(list_movements).post(adjust_stock))
        .route("/variants/:id", put(update_variant).delete(delete_variant))
}

#[derive(Debug, Deserialize, Validate)]
pub struct StockRequest {
    pub variant_id: Option<Uuid>,
    pub quantity_change: i32,
    #[validate(custom = "not_blank")]
    pub reason: String,
}

async fn list_products(
    State(s): State<AppState>,
    _staff: StaffUser,
    Query(filter): Query<AdminProductFilter>,
) -> Result<Json<Vec<ProductView>>> {
    Ok(Json(CatalogRepository::new(&s.db).list_all(&filter).await?))
}

async fn get_product(State(s): State<AppState>, _staff: StaffUser, Path(id): Path<Uuid>) -> Result<Json<ProductView>> {
    Ok(Json(CatalogRepository::new(&s.db).get(id).await?))
}

async fn create_product(
    State(s): State<AppState>,
    StaffUser(staff): StaffUser,
    Json(r): Json<ProductInput>,
) -> Result<(StatusCode, Json<ProductView>)> {
    let draft = ProductDraft::validate(r)?;
    let product = CatalogRepository::new(&s.db).create(&draft).await?;
    tracing::info!(product_id = %product.id, slug = %product.slug, by = %staff.user_id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(s): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<Uuid>,
    Json(r): Json<ProductInput>,
) -> Result<Json<ProductView>> {
    let draft = ProductDraft::validate(r)?;
    Ok(Json(CatalogRepository::new(&s.db).update(id, &draft).await?))
}

async fn delete_product(State(s): State<AppState>, AdminUser(admin): AdminUser, Path(id): Path<Uuid>) -> Result<StatusCode> {
    CatalogRepository::new(&s.db).delete(id).await?;
    tracing::info!(product_id = %id, by = %admin.user_id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn create_variant(
    State(s): State<AppState>,
    _staff: StaffUser,
    Path(product_id): Path<Uuid>,
    Json(r): Json<VariantInput>,
) -> Result<(StatusCode, Json<ProductVariant>)> {
    let draft = VariantDraft::validate(r)?;
    let variant = CatalogRepository::new(&s.db).create_variant(product_id, &draft).await?;
    Ok((StatusCode::CREATED, Json(variant)))
}

async fn update_variant(
    State(s): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<Uuid>,
    Json(r): Json<VariantInput>,
) -> Result<Json<ProductVariant>> {
    let draft = VariantDraft::validate(r)?;
    Ok(Json(CatalogRepository::new(&s.db).update_variant(id, &draft).await?))
}

async fn delete_variant(State(s): State<AppState>, _admin: AdminUser, Path(id): Path<Uuid>) -> Result<StatusCode> {
    CatalogRepository::new(&s.db).delete_variant(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Manual restock or correction; the level may not go below zero.
async fn adjust_stock(
    State(s): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(product_id): Path<Uuid>,
    Json(r): Json<StockRequest>,
) -> Result<Json<StockAdjustment>> {
    r.validate()?;
    if r.quantity_change == 0 {
        return Err(AppError::Validation("quantity_change must not be zero".into()));
    }
    let adjustment = StockRepository::new(&s.db)
        .adjust(&NewMovement {
            product_id,
            variant_id: r.variant_id,
            quantity_change: r.quantity_change,
            reason: r.reason.trim(),
            reference_type: Some("manual"),
            reference_id: None,
            created_by: Some(staff.user_id),
        })
        .await?;
    if adjustment.remaining <= adjustment.threshold {
        s.events.publish(DomainEvent::StockLow {
            product_id,
            variant_id: r.variant_id,
            remaining: adjustment.remaining,
            threshold: adjustment.threshold,
        });
    }
    Ok(Json(adjustment))
}

async fn list_movements(
    State(s): State<AppState>,
    _staff: StaffUser,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Vec<StockMovement>>> {
    Ok(Json(StockRepository::new(&s.db).movements(product_id).await?))
}
