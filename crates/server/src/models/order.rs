//! Order models.
//!
//! An order is a value snapshot taken at checkout: item names and prices are
//! copied out of the catalog, and the shipping address is embedded. Later
//! catalog or address-book edits cannot retroactively alter an order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stitchpress_core::{OrderId, OrderStatus, PaymentStatus, ProductId, UserId};

use super::address::AddressSnapshot;
use super::cart::CustomDesign;

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total: Decimal,
    pub items: Vec<OrderItem>,
    pub shipping_address: AddressSnapshot,
    pub created_at: DateTime<Utc>,
}

/// A frozen copy of one cart line at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    /// Unit price at purchase time.
    pub price: Decimal,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image: Option<String>,
    /// Informational back-reference; never dereferenced after placement.
    pub product_id: Option<ProductId>,
    pub custom_design: Option<CustomDesign>,
}

impl OrderItem {
    /// Line total (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Fields for persisting a new order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total: Decimal,
    pub items: Vec<OrderItem>,
    pub shipping_address: AddressSnapshot,
}
