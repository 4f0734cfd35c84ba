//! Storefront catalog reads and customer reviews.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::clean;
use crate::auth::CurrentUser;
use crate::db::catalog::{CatalogRepository, ProductFilter};
use crate::db::categories::CategoryRepository;
use crate::db::reviews::ReviewRepository;
use crate::error::{AppError, Result};
use crate::models::{Category, ProductDetail, ProductView, Review};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:slug", get(get_product))
        // Shares the `:slug` segment with the detail route; it carries the product id.
        .route("/products/:slug/reviews", post(create_review))
        .route("/categories", get(list_categories))
        .route("/brands", get(list_brands))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: i32,
    pub comment: Option<String>,
}

async fn list_products(State(s): State<AppState>, Query(f): Query<ProductFilter>) -> Result<Json<Vec<ProductView>>> {
    Ok(Json(CatalogRepository::new(&s.db).list_active(&f).await?))
}

async fn get_product(State(s): State<AppState>, Path(slug): Path<String>) -> Result<Json<ProductDetail>> {
    let product = CatalogRepository::new(&s.db).get_active_by_slug(&slug).await?;
    let reviews = ReviewRepository::new(&s.db).approved_for(product.id).await?;
    Ok(Json(ProductDetail { product, reviews }))
}

async fn list_categories(State(s): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(CategoryRepository::new(&s.db).list_active().await?))
}

async fn list_brands(State(s): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(CatalogRepository::new(&s.db).brands().await?))
}

async fn create_review(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(r): Json<ReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    r.validate()?;
    let product = CatalogRepository::new(&s.db).get(product_id).await?;
    if !product.is_active {
        return Err(AppError::NotFound("product not found".into()));
    }
    let comment = clean(r.comment);
    let review = ReviewRepository::new(&s.db).create(user.user_id, product.id, r.rating, comment.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(review)))
}
