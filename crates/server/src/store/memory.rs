//! In-process map storage.
//!
//! Non-persistent backend used in development and by the test suite. Every
//! entity lives in its own `RwLock`-guarded map with a monotonically
//! increasing id counter, which gives the same atomic single-row semantics
//! the relational backend provides.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use stitchpress_core::{
    AddressId, BannerId, CartItemId, CategoryId, OrderId, OrderStatus, ProductId, ThemeId, UserId,
    UserRole,
};

use super::{Store, StoreError};
use crate::models::{
    Address, Banner, CartItem, Category, CustomDesign, NewAddress, NewBanner, NewCartItem,
    NewCategory, NewOrder, NewProduct, NewTheme, NewUser, Order, Product, Theme, User,
};

/// In-memory storage backend.
#[derive(Default)]
pub struct MemStore {
    next_id: AtomicI32,
    users: RwLock<HashMap<UserId, User>>,
    categories: RwLock<HashMap<CategoryId, Category>>,
    products: RwLock<HashMap<ProductId, Product>>,
    cart_items: RwLock<HashMap<CartItemId, CartItem>>,
    orders: RwLock<HashMap<OrderId, Order>>,
    addresses: RwLock<HashMap<AddressId, Address>>,
    banners: RwLock<HashMap<BannerId, Banner>>,
    themes: RwLock<HashMap<ThemeId, Theme>>,
}

impl MemStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicI32::new(1),
            ..Self::default()
        }
    }

    fn next_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

#[async_trait]
impl Store for MemStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new.email) {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }
        let user = User {
            id: UserId::new(self.next_id()),
            email: new.email,
            password_hash: new.password_hash,
            name: new.name,
            role: new.role,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email.as_str() == email).cloned())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn set_user_role(&self, id: UserId, role: UserRole) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.role = role;
        Ok(user.clone())
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    async fn create_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        let mut categories = self.categories.write().await;
        if categories.values().any(|c| c.slug == new.slug) {
            return Err(StoreError::Conflict("slug already exists".to_owned()));
        }
        let category = Category {
            id: CategoryId::new(self.next_id()),
            slug: new.slug,
            name: new.name,
            image: new.image,
        };
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut categories: Vec<Category> =
            self.categories.read().await.values().cloned().collect();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        let categories = self.categories.read().await;
        Ok(categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn category_by_id(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    async fn create_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let mut products = self.products.write().await;
        if products.values().any(|p| p.slug == new.slug) {
            return Err(StoreError::Conflict("slug already exists".to_owned()));
        }
        let product = Product {
            id: ProductId::new(self.next_id()),
            slug: new.slug,
            name: new.name,
            description: new.description,
            price: new.price,
            original_price: new.original_price,
            category_id: new.category_id,
            images: new.images,
            sizes: new.sizes,
            colors: new.colors,
            inventory: new.inventory,
            rating: new.rating,
            is_active: new.is_active,
        };
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: ProductId, new: NewProduct) -> Result<Product, StoreError> {
        let mut products = self.products.write().await;
        if !products.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if products.values().any(|p| p.slug == new.slug && p.id != id) {
            return Err(StoreError::Conflict("slug already exists".to_owned()));
        }
        let product = Product {
            id,
            slug: new.slug,
            name: new.name,
            description: new.description,
            price: new.price,
            original_price: new.original_price,
            category_id: new.category_id,
            images: new.images,
            sizes: new.sizes,
            colors: new.colors,
            inventory: new.inventory,
            rating: new.rating,
            is_active: new.is_active,
        };
        products.insert(id, product.clone());
        Ok(product)
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        self.products
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list_products(
        &self,
        category: Option<CategoryId>,
    ) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().await;
        let mut matching: Vec<Product> = products
            .values()
            .filter(|p| category.is_none_or(|c| p.category_id == Some(c)))
            .cloned()
            .collect();
        matching.sort_by_key(|p| p.id);
        Ok(matching)
    }

    // ------------------------------------------------------------------
    // Cart
    // ------------------------------------------------------------------

    async fn add_cart_item(&self, new: NewCartItem) -> Result<CartItem, StoreError> {
        let mut cart_items = self.cart_items.write().await;
        let item = CartItem {
            id: CartItemId::new(self.next_id()),
            user_id: new.user_id,
            quantity: new.quantity,
            line: new.line,
            created_at: Utc::now(),
        };
        cart_items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn cart_item(&self, id: CartItemId) -> Result<Option<CartItem>, StoreError> {
        Ok(self.cart_items.read().await.get(&id).cloned())
    }

    async fn set_cart_quantity(
        &self,
        id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, StoreError> {
        let mut cart_items = self.cart_items.write().await;
        let item = cart_items.get_mut(&id).ok_or(StoreError::NotFound)?;
        item.quantity = quantity;
        Ok(item.clone())
    }

    async fn set_cart_design(
        &self,
        id: CartItemId,
        design: CustomDesign,
    ) -> Result<CartItem, StoreError> {
        let mut cart_items = self.cart_items.write().await;
        let item = cart_items.get_mut(&id).ok_or(StoreError::NotFound)?;
        item.line = crate::models::CartLine::Custom { design };
        Ok(item.clone())
    }

    async fn remove_cart_item(&self, id: CartItemId) -> Result<(), StoreError> {
        self.cart_items
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn clear_cart(&self, user: UserId) -> Result<(), StoreError> {
        self.cart_items
            .write()
            .await
            .retain(|_, item| item.user_id != user);
        Ok(())
    }

    async fn list_cart(&self, user: UserId) -> Result<Vec<CartItem>, StoreError> {
        let cart_items = self.cart_items.read().await;
        let mut items: Vec<CartItem> = cart_items
            .values()
            .filter(|item| item.user_id == user)
            .cloned()
            .collect();
        items.sort_by_key(|item| item.id);
        Ok(items)
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    async fn create_order(&self, new: NewOrder) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        let order = Order {
            id: OrderId::new(self.next_id()),
            user_id: new.user_id,
            status: new.status,
            payment_status: new.payment_status,
            total: new.total,
            items: new.items,
            shipping_address: new.shipping_address,
            created_at: Utc::now(),
        };
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list_orders(&self, user: Option<UserId>) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        let mut matching: Vec<Order> = orders
            .values()
            .filter(|o| user.is_none_or(|u| o.user_id == u))
            .cloned()
            .collect();
        // Creation time descending; ids break ties for same-instant inserts.
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(matching)
    }

    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(StoreError::NotFound)?;
        order.status = status;
        Ok(order.clone())
    }

    // ------------------------------------------------------------------
    // Addresses
    // ------------------------------------------------------------------

    async fn create_address(&self, user: UserId, new: NewAddress) -> Result<Address, StoreError> {
        let mut addresses = self.addresses.write().await;
        if new.is_default {
            for existing in addresses.values_mut().filter(|a| a.user_id == user) {
                existing.is_default = false;
            }
        }
        let address = Address {
            id: AddressId::new(self.next_id()),
            user_id: user,
            label: new.label,
            full_name: new.full_name,
            phone: new.phone,
            line1: new.line1,
            line2: new.line2,
            city: new.city,
            state: new.state,
            pincode: new.pincode,
            is_default: new.is_default,
        };
        addresses.insert(address.id, address.clone());
        Ok(address)
    }

    async fn update_address(&self, id: AddressId, new: NewAddress) -> Result<Address, StoreError> {
        let mut addresses = self.addresses.write().await;
        let user = addresses.get(&id).ok_or(StoreError::NotFound)?.user_id;
        if new.is_default {
            for existing in addresses
                .values_mut()
                .filter(|a| a.user_id == user && a.id != id)
            {
                existing.is_default = false;
            }
        }
        let address = addresses.get_mut(&id).ok_or(StoreError::NotFound)?;
        address.label = new.label;
        address.full_name = new.full_name;
        address.phone = new.phone;
        address.line1 = new.line1;
        address.line2 = new.line2;
        address.city = new.city;
        address.state = new.state;
        address.pincode = new.pincode;
        address.is_default = new.is_default;
        Ok(address.clone())
    }

    async fn delete_address(&self, id: AddressId) -> Result<(), StoreError> {
        self.addresses
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn address_by_id(&self, id: AddressId) -> Result<Option<Address>, StoreError> {
        Ok(self.addresses.read().await.get(&id).cloned())
    }

    async fn list_addresses(&self, user: UserId) -> Result<Vec<Address>, StoreError> {
        let addresses = self.addresses.read().await;
        let mut matching: Vec<Address> = addresses
            .values()
            .filter(|a| a.user_id == user)
            .cloned()
            .collect();
        matching.sort_by_key(|a| a.id);
        Ok(matching)
    }

    async fn set_default_address(
        &self,
        user: UserId,
        id: AddressId,
    ) -> Result<Address, StoreError> {
        let mut addresses = self.addresses.write().await;
        if !addresses.get(&id).is_some_and(|a| a.user_id == user) {
            return Err(StoreError::NotFound);
        }
        for existing in addresses.values_mut().filter(|a| a.user_id == user) {
            existing.is_default = existing.id == id;
        }
        addresses
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    // ------------------------------------------------------------------
    // Banners
    // ------------------------------------------------------------------

    async fn create_banner(&self, new: NewBanner) -> Result<Banner, StoreError> {
        let mut banners = self.banners.write().await;
        let banner = Banner {
            id: BannerId::new(self.next_id()),
            title: new.title,
            image_url: new.image_url,
            link: new.link,
            position: new.position,
            is_active: new.is_active,
        };
        banners.insert(banner.id, banner.clone());
        Ok(banner)
    }

    async fn update_banner(&self, id: BannerId, new: NewBanner) -> Result<Banner, StoreError> {
        let mut banners = self.banners.write().await;
        let banner = banners.get_mut(&id).ok_or(StoreError::NotFound)?;
        banner.title = new.title;
        banner.image_url = new.image_url;
        banner.link = new.link;
        banner.position = new.position;
        banner.is_active = new.is_active;
        Ok(banner.clone())
    }

    async fn delete_banner(&self, id: BannerId) -> Result<(), StoreError> {
        self.banners
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn list_banners(&self, active_only: bool) -> Result<Vec<Banner>, StoreError> {
        let banners = self.banners.read().await;
        let mut matching: Vec<Banner> = banners
            .values()
            .filter(|b| !active_only || b.is_active)
            .cloned()
            .collect();
        matching.sort_by_key(|b| (b.position, b.id));
        Ok(matching)
    }

    // ------------------------------------------------------------------
    // Themes
    // ------------------------------------------------------------------

    async fn create_theme(&self, new: NewTheme) -> Result<Theme, StoreError> {
        let mut themes = self.themes.write().await;
        if new.is_active {
            for existing in themes.values_mut() {
                existing.is_active = false;
            }
        }
        let theme = Theme {
            id: ThemeId::new(self.next_id()),
            name: new.name,
            tokens: new.tokens,
            is_active: new.is_active,
        };
        themes.insert(theme.id, theme.clone());
        Ok(theme)
    }

    async fn update_theme(&self, id: ThemeId, new: NewTheme) -> Result<Theme, StoreError> {
        let mut themes = self.themes.write().await;
        if !themes.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if new.is_active {
            for existing in themes.values_mut().filter(|t| t.id != id) {
                existing.is_active = false;
            }
        }
        let theme = themes.get_mut(&id).ok_or(StoreError::NotFound)?;
        theme.name = new.name;
        theme.tokens = new.tokens;
        theme.is_active = new.is_active;
        Ok(theme.clone())
    }

    async fn delete_theme(&self, id: ThemeId) -> Result<(), StoreError> {
        self.themes
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn list_themes(&self) -> Result<Vec<Theme>, StoreError> {
        let mut themes: Vec<Theme> = self.themes.read().await.values().cloned().collect();
        themes.sort_by_key(|t| t.id);
        Ok(themes)
    }

    async fn activate_theme(&self, id: ThemeId) -> Result<Theme, StoreError> {
        let mut themes = self.themes.write().await;
        if !themes.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        for theme in themes.values_mut() {
            theme.is_active = theme.id == id;
        }
        themes.get(&id).cloned().ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::CartLine;
    use stitchpress_core::Email;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: Email::parse(email).expect("valid email"),
            password_hash: "hash".to_owned(),
            name: "Test".to_owned(),
            role: UserRole::User,
        }
    }

    fn new_address(is_default: bool) -> NewAddress {
        NewAddress {
            label: "Home".to_owned(),
            full_name: "Asha Rao".to_owned(),
            phone: "9999999999".to_owned(),
            line1: "12 MG Road".to_owned(),
            line2: None,
            city: "Bengaluru".to_owned(),
            state: "Karnataka".to_owned(),
            pincode: "560001".to_owned(),
            is_default,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemStore::new();
        store.create_user(new_user("a@b.com")).await.expect("first");
        let err = store.create_user(new_user("a@b.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_clear_cart_is_idempotent() {
        let store = MemStore::new();
        let user = store.create_user(new_user("a@b.com")).await.expect("user");
        store.clear_cart(user.id).await.expect("empty clear ok");

        let product = store
            .create_product(NewProduct {
                slug: "tee".to_owned(),
                name: "Tee".to_owned(),
                description: String::new(),
                price: Decimal::new(250, 0),
                original_price: None,
                category_id: None,
                images: vec![],
                sizes: vec![],
                colors: vec![],
                inventory: 5,
                rating: 0.0,
                is_active: true,
            })
            .await
            .expect("product");
        store
            .add_cart_item(NewCartItem {
                user_id: user.id,
                quantity: 2,
                line: CartLine::Product {
                    product_id: product.id,
                    size: None,
                    color: None,
                },
            })
            .await
            .expect("add");

        store.clear_cart(user.id).await.expect("clear");
        store.clear_cart(user.id).await.expect("second clear ok");
        assert!(store.list_cart(user.id).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_cart_item_is_not_found() {
        let store = MemStore::new();
        let err = store
            .remove_cart_item(CartItemId::new(999))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_single_default_address() {
        let store = MemStore::new();
        let user = store.create_user(new_user("a@b.com")).await.expect("user");

        let first = store
            .create_address(user.id, new_address(true))
            .await
            .expect("first");
        let second = store
            .create_address(user.id, new_address(true))
            .await
            .expect("second");

        let addresses = store.list_addresses(user.id).await.expect("list");
        let defaults: Vec<_> = addresses.iter().filter(|a| a.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults.first().map(|a| a.id), Some(second.id));

        store
            .set_default_address(user.id, first.id)
            .await
            .expect("set default");
        let addresses = store.list_addresses(user.id).await.expect("list");
        let defaults: Vec<_> = addresses.iter().filter(|a| a.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults.first().map(|a| a.id), Some(first.id));
    }

    #[tokio::test]
    async fn test_default_address_scoped_to_user() {
        let store = MemStore::new();
        let alice = store.create_user(new_user("a@b.com")).await.expect("a");
        let bob = store.create_user(new_user("b@b.com")).await.expect("b");

        store
            .create_address(alice.id, new_address(true))
            .await
            .expect("alice default");
        store
            .create_address(bob.id, new_address(true))
            .await
            .expect("bob default");

        let alice_defaults = store
            .list_addresses(alice.id)
            .await
            .expect("list")
            .into_iter()
            .filter(|a| a.is_default)
            .count();
        assert_eq!(alice_defaults, 1);
    }

    #[tokio::test]
    async fn test_activate_theme_deactivates_rest() {
        let store = MemStore::new();
        let first = store
            .create_theme(NewTheme {
                name: "light".to_owned(),
                tokens: std::collections::BTreeMap::new(),
                is_active: true,
            })
            .await
            .expect("first");
        let second = store
            .create_theme(NewTheme {
                name: "dark".to_owned(),
                tokens: std::collections::BTreeMap::new(),
                is_active: false,
            })
            .await
            .expect("second");

        store.activate_theme(second.id).await.expect("activate");
        let themes = store.list_themes().await.expect("list");
        let active: Vec<_> = themes.iter().filter(|t| t.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active.first().map(|t| t.id), Some(second.id));
        assert_ne!(active.first().map(|t| t.id), Some(first.id));
    }
}
