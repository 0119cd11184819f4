//! Cart models.
//!
//! A cart line is a tagged variant: either a reference to a catalog product
//! or an embedded custom design. A line with neither cannot be constructed,
//! which is the invariant the old optional-field shape only enforced by
//! runtime checks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stitchpress_core::{CartItemId, DesignTransform, ProductId, UserId};

/// One line in a user's cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    /// Always at least 1; quantity updates below 1 are rejected upstream.
    pub quantity: u32,
    #[serde(flatten)]
    pub line: CartLine,
    pub created_at: DateTime<Utc>,
}

/// What a cart line refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartLine {
    /// A catalog product with optional variant selections.
    #[serde(rename_all = "camelCase")]
    Product {
        product_id: ProductId,
        size: Option<String>,
        color: Option<String>,
    },
    /// A fully self-contained custom design.
    #[serde(rename_all = "camelCase")]
    Custom { design: CustomDesign },
}

impl CartLine {
    /// The product reference, if this is a catalog line.
    #[must_use]
    pub const fn product_id(&self) -> Option<ProductId> {
        match self {
            Self::Product { product_id, .. } => Some(*product_id),
            Self::Custom { .. } => None,
        }
    }

    /// The embedded design, if this is a custom line.
    #[must_use]
    pub const fn design(&self) -> Option<&CustomDesign> {
        match self {
            Self::Product { .. } => None,
            Self::Custom { design } => Some(design),
        }
    }
}

/// An embedded custom design: a logo placed on a garment.
///
/// `composite_image_url` is only ever set while `is_finished` is true.
/// Reopening the design for editing clears it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDesign {
    #[serde(flatten)]
    pub transform: DesignTransform,
    /// Uploaded URL of the raw logo.
    pub image: String,
    /// Uploaded URL of the flattened garment+logo render.
    pub composite_image_url: Option<String>,
    pub is_finished: bool,
    pub color: String,
    pub size: String,
    pub price: Decimal,
}

impl CustomDesign {
    /// Mark the design finished with its rendered composite.
    pub fn finish(&mut self, composite_url: String) {
        self.is_finished = true;
        self.composite_image_url = Some(composite_url);
    }

    /// Reopen the design for editing, discarding the stale composite.
    pub fn reopen(&mut self) {
        self.is_finished = false;
        self.composite_image_url = None;
    }
}

/// Fields for adding a cart line.
#[derive(Debug, Clone)]
pub struct NewCartItem {
    pub user_id: UserId,
    pub quantity: u32,
    pub line: CartLine,
}
