//! `PostgreSQL` storage backend.
//!
//! Queries are runtime-checked (`sqlx::query_as`), so the workspace builds
//! without a live database. Row structs decode the raw columns and convert
//! into domain models; JSON columns (images, cart designs, order snapshots,
//! theme tokens) go through `sqlx::types::Json`.

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use stitchpress_core::{
    AddressId, BannerId, CartItemId, CategoryId, Email, OrderId, OrderStatus, PaymentStatus,
    ProductId, ThemeId, UserId, UserRole,
};

use super::{Store, StoreError};
use crate::models::{
    Address, AddressSnapshot, Banner, CartItem, CartLine, Category, CustomDesign, NewAddress,
    NewBanner, NewCartItem, NewCategory, NewOrder, NewProduct, NewTheme, NewUser, Order, OrderItem,
    Product, Theme, User,
};

/// `PostgreSQL` storage backend.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for health checks.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a unique-constraint violation to [`StoreError::Conflict`].
fn map_insert_error(e: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return StoreError::Conflict(format!("{what} already exists"));
    }
    StoreError::Database(e)
}

// =============================================================================
// Row types
// =============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    password_hash: String,
    name: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, StoreError> {
        let email = Email::parse(&row.email).map_err(|e| {
            StoreError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = UserRole::from_str(&row.role)
            .map_err(|e| StoreError::DataCorruption(format!("invalid role in database: {e}")))?;
        Ok(Self {
            id: UserId::new(row.id),
            email,
            password_hash: row.password_hash,
            name: row.name,
            role,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    slug: String,
    name: String,
    image: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            slug: row.slug,
            name: row.name,
            image: row.image,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    slug: String,
    name: String,
    description: String,
    price: Decimal,
    original_price: Option<Decimal>,
    category_id: Option<i32>,
    images: Json<Vec<String>>,
    sizes: Json<Vec<String>>,
    colors: Json<Vec<String>>,
    inventory: i32,
    rating: f32,
    is_active: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            slug: row.slug,
            name: row.name,
            description: row.description,
            price: row.price,
            original_price: row.original_price,
            category_id: row.category_id.map(CategoryId::new),
            images: row.images.0,
            sizes: row.sizes.0,
            colors: row.colors.0,
            inventory: row.inventory,
            rating: row.rating,
            is_active: row.is_active,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: i32,
    user_id: i32,
    product_id: Option<i32>,
    quantity: i32,
    size: Option<String>,
    color: Option<String>,
    design: Option<Json<CustomDesign>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = StoreError;

    fn try_from(row: CartItemRow) -> Result<Self, StoreError> {
        let line = match (row.product_id, row.design) {
            (Some(product_id), None) => CartLine::Product {
                product_id: ProductId::new(product_id),
                size: row.size,
                color: row.color,
            },
            (None, Some(design)) => CartLine::Custom { design: design.0 },
            _ => {
                return Err(StoreError::DataCorruption(format!(
                    "cart item {} has neither product nor design",
                    row.id
                )));
            }
        };
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            StoreError::DataCorruption(format!("cart item {} has negative quantity", row.id))
        })?;
        Ok(Self {
            id: CartItemId::new(row.id),
            user_id: UserId::new(row.user_id),
            quantity,
            line,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    status: String,
    payment_status: String,
    total: Decimal,
    items: Json<Vec<OrderItem>>,
    shipping_address: Json<AddressSnapshot>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, StoreError> {
        let status = OrderStatus::from_str(&row.status)
            .map_err(|e| StoreError::DataCorruption(format!("invalid order status: {e}")))?;
        let payment_status = PaymentStatus::from_str(&row.payment_status)
            .map_err(|e| StoreError::DataCorruption(format!("invalid payment status: {e}")))?;
        Ok(Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            status,
            payment_status,
            total: row.total,
            items: row.items.0,
            shipping_address: row.shipping_address.0,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AddressRow {
    id: i32,
    user_id: i32,
    label: String,
    full_name: String,
    phone: String,
    line1: String,
    line2: Option<String>,
    city: String,
    state: String,
    pincode: String,
    is_default: bool,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            user_id: UserId::new(row.user_id),
            label: row.label,
            full_name: row.full_name,
            phone: row.phone,
            line1: row.line1,
            line2: row.line2,
            city: row.city,
            state: row.state,
            pincode: row.pincode,
            is_default: row.is_default,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BannerRow {
    id: i32,
    title: String,
    image_url: String,
    link: Option<String>,
    position: i32,
    is_active: bool,
}

impl From<BannerRow> for Banner {
    fn from(row: BannerRow) -> Self {
        Self {
            id: BannerId::new(row.id),
            title: row.title,
            image_url: row.image_url,
            link: row.link,
            position: row.position,
            is_active: row.is_active,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ThemeRow {
    id: i32,
    name: String,
    tokens: Json<BTreeMap<String, String>>,
    is_active: bool,
}

impl From<ThemeRow> for Theme {
    fn from(row: ThemeRow) -> Self {
        Self {
            id: ThemeId::new(row.id),
            name: row.name,
            tokens: row.tokens.0,
            is_active: row.is_active,
        }
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, name, role, created_at";
const PRODUCT_COLUMNS: &str = "id, slug, name, description, price, original_price, category_id, \
                               images, sizes, colors, inventory, rating, is_active";
const CART_COLUMNS: &str = "id, user_id, product_id, quantity, size, color, design, created_at";
const ORDER_COLUMNS: &str =
    "id, user_id, status, payment_status, total, items, shipping_address, created_at";
const ADDRESS_COLUMNS: &str =
    "id, user_id, label, full_name, phone, line1, line2, city, state, pincode, is_default";

#[async_trait]
impl Store for PgStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (email, password_hash, name, role)
             VALUES ($1, $2, $3, $4)
             RETURNING id, email, password_hash, name, role, created_at",
        )
        .bind(new.email.as_str())
        .bind(&new.password_hash)
        .bind(&new.name)
        .bind(new.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "email"))?;
        row.try_into()
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn set_user_role(&self, id: UserId, role: UserRole) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET role = $2 WHERE id = $1
             RETURNING id, email, password_hash, name, role, created_at",
        )
        .bind(id.as_i32())
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        row.try_into()
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    async fn create_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (slug, name, image)
             VALUES ($1, $2, $3)
             RETURNING id, slug, name, image",
        )
        .bind(&new.slug)
        .bind(&new.name)
        .bind(&new.image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "slug"))?;
        Ok(row.into())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, slug, name, image FROM categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, slug, name, image FROM categories WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Category::from))
    }

    async fn category_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, slug, name, image FROM categories WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Category::from))
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products
                 (slug, name, description, price, original_price, category_id,
                  images, sizes, colors, inventory, rating, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&new.slug)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.original_price)
        .bind(new.category_id.map(|id| id.as_i32()))
        .bind(Json(&new.images))
        .bind(Json(&new.sizes))
        .bind(Json(&new.colors))
        .bind(new.inventory)
        .bind(new.rating)
        .bind(new.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "slug"))?;
        Ok(row.into())
    }

    async fn update_product(&self, id: ProductId, new: NewProduct) -> Result<Product, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET
                 slug = $2, name = $3, description = $4, price = $5,
                 original_price = $6, category_id = $7, images = $8, sizes = $9,
                 colors = $10, inventory = $11, rating = $12, is_active = $13
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(&new.slug)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.original_price)
        .bind(new.category_id.map(|id| id.as_i32()))
        .bind(Json(&new.images))
        .bind(Json(&new.sizes))
        .bind(Json(&new.colors))
        .bind(new.inventory)
        .bind(new.rating)
        .bind(new.is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, "slug"))?
        .ok_or(StoreError::NotFound)?;
        Ok(row.into())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Product::from))
    }

    async fn list_products(
        &self,
        category: Option<CategoryId>,
    ) -> Result<Vec<Product>, StoreError> {
        let rows = if let Some(category) = category {
            sqlx::query_as::<_, ProductRow>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE category_id = $1 ORDER BY id"
            ))
            .bind(category.as_i32())
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, ProductRow>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
            ))
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows.into_iter().map(Product::from).collect())
    }

    // ------------------------------------------------------------------
    // Cart
    // ------------------------------------------------------------------

    async fn add_cart_item(&self, new: NewCartItem) -> Result<CartItem, StoreError> {
        let (product_id, size, color, design) = match &new.line {
            CartLine::Product {
                product_id,
                size,
                color,
            } => (Some(product_id.as_i32()), size.clone(), color.clone(), None),
            CartLine::Custom { design } => (None, None, None, Some(Json(design.clone()))),
        };
        let row = sqlx::query_as::<_, CartItemRow>(&format!(
            "INSERT INTO cart_items (user_id, product_id, quantity, size, color, design)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {CART_COLUMNS}"
        ))
        .bind(new.user_id.as_i32())
        .bind(product_id)
        .bind(i32::try_from(new.quantity).unwrap_or(i32::MAX))
        .bind(size)
        .bind(color)
        .bind(design)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn cart_item(&self, id: CartItemId) -> Result<Option<CartItem>, StoreError> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!(
            "SELECT {CART_COLUMNS} FROM cart_items WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;
        row.map(CartItem::try_from).transpose()
    }

    async fn set_cart_quantity(
        &self,
        id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, StoreError> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!(
            "UPDATE cart_items SET quantity = $2 WHERE id = $1 RETURNING {CART_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        row.try_into()
    }

    async fn set_cart_design(
        &self,
        id: CartItemId,
        design: CustomDesign,
    ) -> Result<CartItem, StoreError> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!(
            "UPDATE cart_items SET design = $2, product_id = NULL, size = NULL, color = NULL
             WHERE id = $1 RETURNING {CART_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(Json(design))
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        row.try_into()
    }

    async fn remove_cart_item(&self, id: CartItemId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn clear_cart(&self, user: UserId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user.as_i32())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_cart(&self, user: UserId) -> Result<Vec<CartItem>, StoreError> {
        let rows = sqlx::query_as::<_, CartItemRow>(&format!(
            "SELECT {CART_COLUMNS} FROM cart_items WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user.as_i32())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(CartItem::try_from).collect()
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    async fn create_order(&self, new: NewOrder) -> Result<Order, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (user_id, status, payment_status, total, items, shipping_address)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(new.user_id.as_i32())
        .bind(new.status.as_str())
        .bind(new.payment_status.as_str())
        .bind(new.total)
        .bind(Json(&new.items))
        .bind(Json(&new.shipping_address))
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Order::try_from).transpose()
    }

    async fn list_orders(&self, user: Option<UserId>) -> Result<Vec<Order>, StoreError> {
        let rows = if let Some(user) = user {
            sqlx::query_as::<_, OrderRow>(&format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1
                 ORDER BY created_at DESC, id DESC"
            ))
            .bind(user.as_i32())
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, OrderRow>(&format!(
                "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"
            ))
            .fetch_all(&self.pool)
            .await?
        };
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        row.try_into()
    }

    // ------------------------------------------------------------------
    // Addresses
    // ------------------------------------------------------------------

    async fn create_address(&self, user: UserId, new: NewAddress) -> Result<Address, StoreError> {
        let mut tx = self.pool.begin().await?;
        if new.is_default {
            sqlx::query("UPDATE addresses SET is_default = FALSE WHERE user_id = $1")
                .bind(user.as_i32())
                .execute(&mut *tx)
                .await?;
        }
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "INSERT INTO addresses
                 (user_id, label, full_name, phone, line1, line2, city, state, pincode, is_default)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(user.as_i32())
        .bind(&new.label)
        .bind(&new.full_name)
        .bind(&new.phone)
        .bind(&new.line1)
        .bind(&new.line2)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.pincode)
        .bind(new.is_default)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn update_address(&self, id: AddressId, new: NewAddress) -> Result<Address, StoreError> {
        let mut tx = self.pool.begin().await?;
        if new.is_default {
            sqlx::query(
                "UPDATE addresses SET is_default = FALSE
                 WHERE user_id = (SELECT user_id FROM addresses WHERE id = $1) AND id <> $1",
            )
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;
        }
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "UPDATE addresses SET
                 label = $2, full_name = $3, phone = $4, line1 = $5, line2 = $6,
                 city = $7, state = $8, pincode = $9, is_default = $10
             WHERE id = $1
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(&new.label)
        .bind(&new.full_name)
        .bind(&new.phone)
        .bind(&new.line1)
        .bind(&new.line2)
        .bind(&new.city)
        .bind(&new.state)
        .bind(&new.pincode)
        .bind(new.is_default)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn delete_address(&self, id: AddressId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn address_by_id(&self, id: AddressId) -> Result<Option<Address>, StoreError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Address::from))
    }

    async fn list_addresses(&self, user: UserId) -> Result<Vec<Address>, StoreError> {
        let rows = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user.as_i32())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Address::from).collect())
    }

    async fn set_default_address(
        &self,
        user: UserId,
        id: AddressId,
    ) -> Result<Address, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE addresses SET is_default = FALSE WHERE user_id = $1")
            .bind(user.as_i32())
            .execute(&mut *tx)
            .await?;
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "UPDATE addresses SET is_default = TRUE
             WHERE id = $1 AND user_id = $2
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(user.as_i32())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;
        tx.commit().await?;
        Ok(row.into())
    }

    // ------------------------------------------------------------------
    // Banners
    // ------------------------------------------------------------------

    async fn create_banner(&self, new: NewBanner) -> Result<Banner, StoreError> {
        let row = sqlx::query_as::<_, BannerRow>(
            "INSERT INTO banners (title, image_url, link, position, is_active)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, title, image_url, link, position, is_active",
        )
        .bind(&new.title)
        .bind(&new.image_url)
        .bind(&new.link)
        .bind(new.position)
        .bind(new.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update_banner(&self, id: BannerId, new: NewBanner) -> Result<Banner, StoreError> {
        let row = sqlx::query_as::<_, BannerRow>(
            "UPDATE banners SET title = $2, image_url = $3, link = $4, position = $5,
                 is_active = $6
             WHERE id = $1
             RETURNING id, title, image_url, link, position, is_active",
        )
        .bind(id.as_i32())
        .bind(&new.title)
        .bind(&new.image_url)
        .bind(&new.link)
        .bind(new.position)
        .bind(new.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;
        Ok(row.into())
    }

    async fn delete_banner(&self, id: BannerId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM banners WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_banners(&self, active_only: bool) -> Result<Vec<Banner>, StoreError> {
        let rows = if active_only {
            sqlx::query_as::<_, BannerRow>(
                "SELECT id, title, image_url, link, position, is_active FROM banners
                 WHERE is_active ORDER BY position, id",
            )
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, BannerRow>(
                "SELECT id, title, image_url, link, position, is_active FROM banners
                 ORDER BY position, id",
            )
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows.into_iter().map(Banner::from).collect())
    }

    // ------------------------------------------------------------------
    // Themes
    // ------------------------------------------------------------------

    async fn create_theme(&self, new: NewTheme) -> Result<Theme, StoreError> {
        let mut tx = self.pool.begin().await?;
        if new.is_active {
            sqlx::query("UPDATE themes SET is_active = FALSE")
                .execute(&mut *tx)
                .await?;
        }
        let row = sqlx::query_as::<_, ThemeRow>(
            "INSERT INTO themes (name, tokens, is_active)
             VALUES ($1, $2, $3)
             RETURNING id, name, tokens, is_active",
        )
        .bind(&new.name)
        .bind(Json(&new.tokens))
        .bind(new.is_active)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn update_theme(&self, id: ThemeId, new: NewTheme) -> Result<Theme, StoreError> {
        let mut tx = self.pool.begin().await?;
        if new.is_active {
            sqlx::query("UPDATE themes SET is_active = FALSE WHERE id <> $1")
                .bind(id.as_i32())
                .execute(&mut *tx)
                .await?;
        }
        let row = sqlx::query_as::<_, ThemeRow>(
            "UPDATE themes SET name = $2, tokens = $3, is_active = $4 WHERE id = $1
             RETURNING id, name, tokens, is_active",
        )
        .bind(id.as_i32())
        .bind(&new.name)
        .bind(Json(&new.tokens))
        .bind(new.is_active)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn delete_theme(&self, id: ThemeId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM themes WHERE id = $1")
            .bind(id.as_i32())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_themes(&self) -> Result<Vec<Theme>, StoreError> {
        let rows = sqlx::query_as::<_, ThemeRow>(
            "SELECT id, name, tokens, is_active FROM themes ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Theme::from).collect())
    }

    async fn activate_theme(&self, id: ThemeId) -> Result<Theme, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE themes SET is_active = FALSE")
            .execute(&mut *tx)
            .await?;
        let row = sqlx::query_as::<_, ThemeRow>(
            "UPDATE themes SET is_active = TRUE WHERE id = $1
             RETURNING id, name, tokens, is_active",
        )
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;
        tx.commit().await?;
        Ok(row.into())
    }
}
