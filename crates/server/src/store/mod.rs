//! Storage backends.
//!
//! All persistence goes through the object-safe [`Store`] trait. Two
//! backends exist:
//!
//! - [`MemStore`] - an in-process map, non-persistent. The default when no
//!   `DATABASE_URL` is configured, and what the integration tests run on.
//! - [`PgStore`] - `PostgreSQL` via sqlx. Migrations live in `migrations/`
//!   and are run by the CLI, never automatically on startup.
//!
//! Both backends provide atomic single-row read-modify-write; neither spans
//! a transaction across cart-clear + order-create (see the checkout
//! service's cleanup policy).

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use stitchpress_core::{
    AddressId, BannerId, CartItemId, CategoryId, OrderId, OrderStatus, ProductId, ThemeId, UserId,
    UserRole,
};

use crate::models::{
    Address, Banner, CartItem, Category, CustomDesign, NewAddress, NewBanner, NewCartItem,
    NewCategory, NewOrder, NewProduct, NewTheme, NewUser, Order, Product, Theme, User,
};

pub use memory::MemStore;
pub use postgres::PgStore;

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced row does not exist.
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be interpreted.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Object-safe storage interface shared by all backends.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs.
    fn backend_tag(&self) -> &'static str;

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Insert a user. Fails with [`StoreError::Conflict`] on a duplicate
    /// email.
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn set_user_role(&self, id: UserId, role: UserRole) -> Result<User, StoreError>;

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    async fn create_category(&self, new: NewCategory) -> Result<Category, StoreError>;
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;
    async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError>;
    async fn category_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError>;
    /// Full replace of a product's fields.
    async fn update_product(&self, id: ProductId, new: NewProduct) -> Result<Product, StoreError>;
    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError>;
    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError>;
    /// Active and inactive products, optionally filtered by category.
    async fn list_products(&self, category: Option<CategoryId>) -> Result<Vec<Product>, StoreError>;

    // ------------------------------------------------------------------
    // Cart
    // ------------------------------------------------------------------

    async fn add_cart_item(&self, new: NewCartItem) -> Result<CartItem, StoreError>;
    async fn cart_item(&self, id: CartItemId) -> Result<Option<CartItem>, StoreError>;
    async fn set_cart_quantity(
        &self,
        id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, StoreError>;
    /// Replace the embedded design of a custom line.
    async fn set_cart_design(
        &self,
        id: CartItemId,
        design: CustomDesign,
    ) -> Result<CartItem, StoreError>;
    /// Remove one line. A missing line is [`StoreError::NotFound`].
    async fn remove_cart_item(&self, id: CartItemId) -> Result<(), StoreError>;
    /// Remove all of a user's lines. Idempotent: an empty cart is not an
    /// error.
    async fn clear_cart(&self, user: UserId) -> Result<(), StoreError>;
    async fn list_cart(&self, user: UserId) -> Result<Vec<CartItem>, StoreError>;

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    async fn create_order(&self, new: NewOrder) -> Result<Order, StoreError>;
    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError>;
    /// Orders newest-first; `None` returns every user's orders (admin).
    async fn list_orders(&self, user: Option<UserId>) -> Result<Vec<Order>, StoreError>;
    /// Persist a status change. Transition legality is checked by the
    /// caller against [`OrderStatus::can_transition_to`].
    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, StoreError>;

    // ------------------------------------------------------------------
    // Addresses
    // ------------------------------------------------------------------

    /// Insert an address. When `is_default` is set, any previous default
    /// for the user is cleared in the same operation.
    async fn create_address(&self, user: UserId, new: NewAddress) -> Result<Address, StoreError>;
    async fn update_address(&self, id: AddressId, new: NewAddress) -> Result<Address, StoreError>;
    async fn delete_address(&self, id: AddressId) -> Result<(), StoreError>;
    async fn address_by_id(&self, id: AddressId) -> Result<Option<Address>, StoreError>;
    async fn list_addresses(&self, user: UserId) -> Result<Vec<Address>, StoreError>;
    /// Make `id` the user's only default address.
    async fn set_default_address(
        &self,
        user: UserId,
        id: AddressId,
    ) -> Result<Address, StoreError>;

    // ------------------------------------------------------------------
    // Banners
    // ------------------------------------------------------------------

    async fn create_banner(&self, new: NewBanner) -> Result<Banner, StoreError>;
    async fn update_banner(&self, id: BannerId, new: NewBanner) -> Result<Banner, StoreError>;
    async fn delete_banner(&self, id: BannerId) -> Result<(), StoreError>;
    /// Banners by position ascending; `active_only` is the public view.
    async fn list_banners(&self, active_only: bool) -> Result<Vec<Banner>, StoreError>;

    // ------------------------------------------------------------------
    // Themes
    // ------------------------------------------------------------------

    async fn create_theme(&self, new: NewTheme) -> Result<Theme, StoreError>;
    async fn update_theme(&self, id: ThemeId, new: NewTheme) -> Result<Theme, StoreError>;
    async fn delete_theme(&self, id: ThemeId) -> Result<(), StoreError>;
    async fn list_themes(&self) -> Result<Vec<Theme>, StoreError>;
    /// Activate one theme, deactivating the rest.
    async fn activate_theme(&self, id: ThemeId) -> Result<Theme, StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
