//! Product, variant and category drafts validated before they reach the
//! catalog tables.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::stock::DEFAULT_STOCK_THRESHOLD;
use crate::domain::value_objects::{Sku, SkuError, Slug, SlugError};

fn default_true() -> bool { true }

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock_quantity: Option<i32>,
    #[serde(default)]
    pub stock_threshold: Option<i32>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub specifications: Option<serde_json::Value>,
}

#[derive(Clone, Debug)]
pub struct ProductDraft {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub stock_quantity: i32,
    pub stock_threshold: i32,
    pub is_featured: bool,
    pub is_new: bool,
    pub is_active: bool,
    pub specifications: serde_json::Value,
}

impl ProductDraft {
    pub fn validate(input: ProductInput) -> Result<Self, ProductError> {
        let name = input.name.trim().to_string();
        if name.is_empty() { return Err(ProductError::MissingName); }
        if input.price.is_sign_negative() { return Err(ProductError::NegativePrice); }
        if input.original_price.is_some_and(|p| p.is_sign_negative()) { return Err(ProductError::NegativePrice); }
        let stock_quantity = input.stock_quantity.unwrap_or(0);
        if stock_quantity < 0 { return Err(ProductError::NegativeStock); }
        let stock_threshold = match input.stock_threshold {
            Some(t) if t > 0 => t,
            _ => DEFAULT_STOCK_THRESHOLD,
        };
        let slug = Slug::from_input(input.slug.as_deref(), &name)?;
        Ok(Self {
            name,
            slug,
            description: trimmed(input.description),
            price: input.price,
            original_price: input.original_price,
            category_id: input.category_id,
            brand: trimmed(input.brand),
            image_url: trimmed(input.image_url),
            images: input.images.into_iter().filter(|i| !i.trim().is_empty()).collect(),
            stock_quantity,
            stock_threshold,
            is_featured: input.is_featured,
            is_new: input.is_new,
            is_active: input.is_active,
            specifications: input.specifications.unwrap_or_else(|| serde_json::json!({})),
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct VariantInput {
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub capacity: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub stock_quantity: Option<i32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Clone, Debug)]
pub struct VariantDraft {
    pub name: String,
    pub sku: Option<Sku>,
    pub color: Option<String>,
    pub capacity: Option<String>,
    pub size: Option<String>,
    pub price: Option<Decimal>,
    pub stock_quantity: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
}

impl VariantDraft {
    pub fn validate(input: VariantInput) -> Result<Self, ProductError> {
        let name = input.name.trim().to_string();
        if name.is_empty() { return Err(ProductError::MissingName); }
        if input.price.is_some_and(|p| p.is_sign_negative()) { return Err(ProductError::NegativePrice); }
        let stock_quantity = input.stock_quantity.unwrap_or(0);
        if stock_quantity < 0 { return Err(ProductError::NegativeStock); }
        let sku = trimmed(input.sku).map(Sku::new).transpose()?;
        Ok(Self {
            name,
            sku,
            color: trimmed(input.color),
            capacity: trimmed(input.capacity),
            size: trimmed(input.size),
            price: input.price,
            stock_quantity,
            image_url: trimmed(input.image_url),
            is_active: input.is_active,
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Clone, Debug)]
pub struct CategoryDraft {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
    pub is_active: bool,
}

impl CategoryDraft {
    /// `id` is the category being edited, if any; it may not parent itself.
    pub fn validate(input: CategoryInput, id: Option<Uuid>) -> Result<Self, ProductError> {
        let name = input.name.trim().to_string();
        if name.is_empty() { return Err(ProductError::MissingName); }
        if id.is_some() && input.parent_id == id { return Err(ProductError::SelfParent); }
        let slug = Slug::from_input(input.slug.as_deref(), &name)?;
        Ok(Self {
            name,
            slug,
            description: trimmed(input.description),
            image_url: trimmed(input.image_url),
            icon: trimmed(input.icon),
            parent_id: input.parent_id,
            sort_order: input.sort_order,
            is_active: input.is_active,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductError {
    #[error("name is required")]
    MissingName,
    #[error("price cannot be negative")]
    NegativePrice,
    #[error("stock quantity cannot be negative")]
    NegativeStock,
    #[error("a category cannot be its own parent")]
    SelfParent,
    #[error("invalid slug: {0}")]
    Slug(#[from] SlugError),
    #[error("invalid sku: {0}")]
    Sku(#[from] SkuError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, price: i64) -> ProductInput {
        serde_json::from_value(serde_json::json!({ "name": name, "price": price })).unwrap()
    }

    #[test]
    fn test_product_defaults() {
        let draft = ProductDraft::validate(input("Écran Samsung A52", 180)).unwrap();
        assert_eq!(draft.slug.as_str(), "ecran-samsung-a52");
        assert_eq!(draft.stock_quantity, 0);
        assert_eq!(draft.stock_threshold, DEFAULT_STOCK_THRESHOLD);
        assert!(draft.is_active);
        assert!(!draft.is_featured);
        assert_eq!(draft.specifications, serde_json::json!({}));
    }

    #[test]
    fn test_product_rejects_blank_name_and_negative_price() {
        assert_eq!(ProductDraft::validate(input("  ", 10)).unwrap_err(), ProductError::MissingName);
        assert_eq!(ProductDraft::validate(input("Coque", -1)).unwrap_err(), ProductError::NegativePrice);
    }

    #[test]
    fn test_product_explicit_slug_must_be_canonical() {
        let mut i = input("Coque", 10);
        i.slug = Some("Coque Rouge".into());
        assert!(matches!(ProductDraft::validate(i).unwrap_err(), ProductError::Slug(_)));
    }

    #[test]
    fn test_variant_normalizes_sku() {
        let v: VariantInput = serde_json::from_value(serde_json::json!({
            "name": "Bleu", "sku": " cq-blu-01 ", "color": "Bleu", "price": "35.500"
        })).unwrap();
        let draft = VariantDraft::validate(v).unwrap();
        assert_eq!(draft.sku.unwrap().as_str(), "CQ-BLU-01");
        assert_eq!(draft.price, Some(Decimal::new(35_500, 3)));
    }

    #[test]
    fn test_category_cannot_parent_itself() {
        let id = Uuid::new_v4();
        let c: CategoryInput = serde_json::from_value(serde_json::json!({ "name": "Accessoires", "parent_id": id })).unwrap();
        assert_eq!(CategoryDraft::validate(c.clone(), Some(id)).unwrap_err(), ProductError::SelfParent);
        assert_eq!(CategoryDraft::validate(c, None).unwrap().slug.as_str(), "accessoires");
    }
}
