//! Catalog models: products and categories.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stitchpress_core::{CategoryId, ProductId};

/// A catalog product.
///
/// Placed orders snapshot the fields they need, so editing or deleting a
/// product never changes order history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub category_id: Option<CategoryId>,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    /// Informational stock count. The cart never reserves against it.
    pub inventory: i32,
    pub rating: f32,
    pub is_active: bool,
}

/// Fields for creating or fully replacing a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub inventory: i32,
    #[serde(default)]
    pub rating: f32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A catalog category, addressed by slug on the public API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub slug: String,
    pub name: String,
    pub image: Option<String>,
}

/// Fields for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

const fn default_true() -> bool {
    true
}
