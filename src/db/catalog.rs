//! Products and their variants.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use super::{like_pattern, non_blank, reference_violation, unique_violation, RepositoryError};
use crate::domain::aggregates::{ProductDraft, VariantDraft};
use crate::models::{ProductRow, ProductVariant, ProductView};

const PRODUCT_SELECT: &str = "SELECT p.*, c.name AS category_name, c.slug AS category_slug \
     FROM products p LEFT JOIN categories c ON c.id = p.category_id";

/// Back-office listing filters. `category` matches a slug or an id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminProductFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

/// Storefront listing filters, straight from the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub brand: Option<String>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
    pub is_new: Option<bool>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    Rating,
    #[default]
    Newest,
}

impl ProductSort {
    /// Unknown values fall back to newest first.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("price_asc") => Self::PriceAsc,
            Some("price_desc") => Self::PriceDesc,
            Some("rating") => Self::Rating,
            _ => Self::Newest,
        }
    }

    fn order_clause(self) -> &'static str {
        match self {
            Self::PriceAsc => "p.price ASC, p.created_at DESC",
            Self::PriceDesc => "p.price DESC, p.created_at DESC",
            Self::Rating => "p.rating DESC, p.review_count DESC",
            Self::Newest => "p.created_at DESC",
        }
    }
}


pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self { Self { pool } }

    /// Active products matching `filter`, each with its active variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list_active(&self, filter: &ProductFilter) -> Result<Vec<ProductView>, RepositoryError> {
        // An unknown category slug filters nothing.
        let category_id = match non_blank(filter.category.as_deref()) {
            Some(slug) => sqlx::query_scalar::<_, Uuid>("SELECT id FROM categories WHERE slug = $1")
                .bind(slug).fetch_optional(self.pool).await?,
            None => None,
        };

        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        qb.push(" WHERE p.is_active");
        if let Some(id) = category_id {
            qb.push(" AND p.category_id = ").push_bind(id);
        }
        if let Some(term) = non_blank(filter.search.as_deref()) {
            let pattern = like_pattern(term);
            qb.push(" AND (p.name ILIKE ").push_bind(pattern.clone())
                .push(" OR p.description ILIKE ").push_bind(pattern.clone())
                .push(" OR p.brand ILIKE ").push_bind(pattern)
                .push(")");
        }
        if let Some(min) = filter.min_price {
            qb.push(" AND p.price >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price {
            qb.push(" AND p.price <= ").push_bind(max);
        }
        if let Some(brand) = non_blank(filter.brand.as_deref()) {
            qb.push(" AND LOWER(p.brand) = LOWER(").push_bind(brand.to_string()).push(")");
        }
        if filter.in_stock == Some(true) {
            qb.push(" AND p.stock_quantity > 0");
        }
        if filter.featured == Some(true) {
            qb.push(" AND p.is_featured");
        }
        if filter.is_new == Some(true) {
            qb.push(" AND p.is_new");
        }
        qb.push(" ORDER BY ").push(ProductSort::parse(filter.sort.as_deref()).order_clause());

        let rows = qb.build_query_as::<ProductRow>().fetch_all(self.pool).await?;
        self.with_variants(rows, true).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the slug is unknown or the product inactive.
    pub async fn get_active_by_slug(&self, slug: &str) -> Result<ProductView, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} WHERE p.slug = $1 AND p.is_active"))
            .bind(slug)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        self.with_variants(vec![row], true).await?.pop().ok_or(RepositoryError::NotFound)
    }

    /// Every product, inactive ones included, for the back-office.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list_all(&self, filter: &AdminProductFilter) -> Result<Vec<ProductView>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        qb.push(" WHERE TRUE");
        if let Some(category) = non_blank(filter.category.as_deref()) {
            qb.push(" AND (c.slug = ").push_bind(category.to_string())
                .push(" OR p.category_id::TEXT = ").push_bind(category.to_string())
                .push(")");
        }
        if let Some(term) = non_blank(filter.search.as_deref()) {
            let pattern = like_pattern(term);
            qb.push(" AND (p.name ILIKE ").push_bind(pattern.clone())
                .push(" OR p.brand ILIKE ").push_bind(pattern.clone())
                .push(" OR p.slug ILIKE ").push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY p.created_at DESC");

        let rows = qb.build_query_as::<ProductRow>().fetch_all(self.pool).await?;
        self.with_variants(rows, false).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn get(&self, id: Uuid) -> Result<ProductView, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        self.with_variants(vec![row], false).await?.pop().ok_or(RepositoryError::NotFound)
    }

    /// Distinct brands of active products, sorted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn brands(&self) -> Result<Vec<String>, RepositoryError> {
        let brands = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT brand FROM products WHERE is_active AND brand IS NOT NULL AND brand <> '' ORDER BY brand",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(brands)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a duplicate slug or unknown category.
    #[instrument(skip(self, draft), fields(slug = %draft.slug))]
    pub async fn create(&self, draft: &ProductDraft) -> Result<ProductView, RepositoryError> {
        let id = Uuid::now_v7();
        sqlx::query(
            r"
            INSERT INTO products (id, name, slug, description, price, original_price, category_id, image_url,
                images, brand, stock_quantity, stock_threshold, is_featured, is_new, is_active, specifications)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(draft.slug.as_str())
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.original_price)
        .bind(draft.category_id)
        .bind(&draft.image_url)
        .bind(&draft.images)
        .bind(&draft.brand)
        .bind(draft.stock_quantity)
        .bind(draft.stock_threshold)
        .bind(draft.is_featured)
        .bind(draft.is_new)
        .bind(draft.is_active)
        .bind(&draft.specifications)
        .execute(self.pool)
        .await
        .map_err(|e| reference_violation(e, "product slug"))?;
        self.get(id).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist,
    /// `RepositoryError::Conflict` on a duplicate slug.
    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: Uuid, draft: &ProductDraft) -> Result<ProductView, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products SET name = $2, slug = $3, description = $4, price = $5, original_price = $6,
                category_id = $7, image_url = $8, images = $9, brand = $10, stock_quantity = $11,
                stock_threshold = $12, is_featured = $13, is_new = $14, is_active = $15,
                specifications = $16, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(draft.slug.as_str())
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.original_price)
        .bind(draft.category_id)
        .bind(&draft.image_url)
        .bind(&draft.images)
        .bind(&draft.brand)
        .bind(draft.stock_quantity)
        .bind(draft.stock_threshold)
        .bind(draft.is_featured)
        .bind(draft.is_new)
        .bind(draft.is_active)
        .bind(&draft.specifications)
        .execute(self.pool)
        .await
        .map_err(|e| reference_violation(e, "product slug"))?;
        if result.rows_affected() == 0 { return Err(RepositoryError::NotFound); }
        self.get(id).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| reference_violation(e, "product"))?;
        if result.rows_affected() == 0 { return Err(RepositoryError::NotFound); }
        Ok(())
    }

    /// Adding a variant flags the parent product as having variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    #[instrument(skip(self, draft))]
    pub async fn create_variant(&self, product_id: Uuid, draft: &VariantDraft) -> Result<ProductVariant, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let flagged = sqlx::query("UPDATE products SET has_variants = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(product_id).execute(&mut *tx).await?;
        if flagged.rows_affected() == 0 { return Err(RepositoryError::NotFound); }
        let variant = sqlx::query_as::<_, ProductVariant>(
            r"
            INSERT INTO product_variants (id, product_id, name, sku, color, capacity, size, price, stock_quantity, image_url, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            ",
        )
        .bind(Uuid::now_v7())
        .bind(product_id)
        .bind(&draft.name)
        .bind(draft.sku.as_ref().map(|s| s.as_str()))
        .bind(&draft.color)
        .bind(&draft.capacity)
        .bind(&draft.size)
        .bind(draft.price)
        .bind(draft.stock_quantity)
        .bind(&draft.image_url)
        .bind(draft.is_active)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_violation(e, "variant"))?;
        tx.commit().await?;
        Ok(variant)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the variant does not exist.
    #[instrument(skip(self, draft))]
    pub async fn update_variant(&self, id: Uuid, draft: &VariantDraft) -> Result<ProductVariant, RepositoryError> {
        sqlx::query_as::<_, ProductVariant>(
            r"
            UPDATE product_variants SET name = $2, sku = $3, color = $4, capacity = $5, size = $6,
                price = $7, stock_quantity = $8, image_url = $9, is_active = $10
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(draft.sku.as_ref().map(|s| s.as_str()))
        .bind(&draft.color)
        .bind(&draft.capacity)
        .bind(&draft.size)
        .bind(draft.price)
        .bind(draft.stock_quantity)
        .bind(&draft.image_url)
        .bind(draft.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Removing the last variant clears the parent's `has_variants` flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the variant does not exist.
    #[instrument(skip(self))]
    pub async fn delete_variant(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let product_id = sqlx::query_scalar::<_, Uuid>("DELETE FROM product_variants WHERE id = $1 RETURNING product_id")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        sqlx::query(
            "UPDATE products SET has_variants = EXISTS (SELECT 1 FROM product_variants WHERE product_id = $1), updated_at = NOW() WHERE id = $1",
        )
        .bind(product_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn with_variants(&self, rows: Vec<ProductRow>, active_only: bool) -> Result<Vec<ProductView>, RepositoryError> {
        if rows.is_empty() { return Ok(Vec::new()); }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let variants = sqlx::query_as::<_, ProductVariant>(
            "SELECT * FROM product_variants WHERE product_id = ANY($1) AND (is_active OR NOT $2) ORDER BY created_at",
        )
        .bind(ids.as_slice())
        .bind(active_only)
        .fetch_all(self.pool)
        .await?;

        let mut by_product: HashMap<Uuid, Vec<ProductVariant>> = HashMap::new();
        for variant in variants {
            by_product.entry(variant.product_id).or_default().push(variant);
        }
        Ok(rows
            .into_iter()
            .map(|row| {
                let variants = by_product.remove(&row.id).unwrap_or_default();
                ProductView::new(row, variants)
            })
            .collect())
    }
}
