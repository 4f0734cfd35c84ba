//! Catalog rows and the product payloads built from them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::stock::{StockBadge, StockStatus};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Product row joined with the name and slug of its category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub brand: Option<String>,
    pub stock_quantity: i32,
    pub stock_threshold: i32,
    pub is_featured: bool,
    pub is_new: bool,
    pub is_active: bool,
    pub has_variants: bool,
    pub rating: Decimal,
    pub review_count: i32,
    pub specifications: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductVariant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub sku: Option<String>,
    pub color: Option<String>,
    pub capacity: Option<String>,
    pub size: Option<String>,
    pub price: Option<Decimal>,
    pub stock_quantity: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Product as served to clients: category summary, variants and stock badge.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub brand: Option<String>,
    pub stock_quantity: i32,
    pub stock_threshold: i32,
    pub is_featured: bool,
    pub is_new: bool,
    pub is_active: bool,
    pub has_variants: bool,
    pub rating: Decimal,
    pub review_count: i32,
    pub specifications: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category: Option<CategorySummary>,
    pub variants: Vec<ProductVariant>,
    pub stock: StockBadge,
}

impl ProductView {
    pub fn new(row: ProductRow, variants: Vec<ProductVariant>) -> Self {
        let category = match (row.category_id, row.category_name, row.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(CategorySummary { id, name, slug }),
            _ => None,
        };
        let stock = StockStatus::classify(row.stock_quantity, Some(row.stock_threshold)).into();
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            price: row.price,
            original_price: row.original_price,
            category_id: row.category_id,
            image_url: row.image_url,
            images: row.images,
            brand: row.brand,
            stock_quantity: row.stock_quantity,
            stock_threshold: row.stock_threshold,
            is_featured: row.is_featured,
            is_new: row.is_new,
            is_active: row.is_active,
            has_variants: row.has_variants,
            rating: row.rating,
            review_count: row.review_count,
            specifications: row.specifications,
            created_at: row.created_at,
            updated_at: row.updated_at,
            category,
            variants,
            stock,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductView,
    pub reviews: Vec<Review>,
}
