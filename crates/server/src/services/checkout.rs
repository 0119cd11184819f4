//! Checkout: cart snapshotting, totals, and post-order cart cleanup.
//!
//! Placing an order snapshots the cart into immutable order items, computes
//! the total with the flat shipping fee below the free-shipping threshold,
//! and then clears the cart. Order creation and cart clearing are one
//! logical unit under an at-least-once policy: a failed clear never rolls
//! the order back, it goes to the in-process retry queue instead.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use stitchpress_core::{OrderStatus, PaymentStatus, UserId};

use crate::models::{AddressSnapshot, CartLine, NewOrder, Order, OrderItem};
use crate::store::{Store, StoreError};

/// Subtotal at or above which shipping is free, in rupees.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(500, 0, 0, false, 0);
/// Flat shipping fee below the threshold, in rupees.
pub const SHIPPING_FEE: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    /// A cart line references a product that no longer exists.
    #[error("product in cart no longer exists")]
    ProductMissing,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Shipping charge for a given merchandise subtotal.
#[must_use]
pub fn shipping_fee(subtotal: Decimal) -> Decimal {
    if subtotal >= FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        SHIPPING_FEE
    }
}

/// Place an order from the user's current cart.
///
/// On success the order exists with status `pending` and the cart is
/// cleared; if the clear fails it is handed to `cleanup` for retry and the
/// order stands.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] for an empty cart and
/// [`CheckoutError::ProductMissing`] when a catalog line's product has been
/// deleted since it was added.
pub async fn place_order(
    store: &dyn Store,
    cleanup: &CleanupQueue,
    user: UserId,
    shipping_address: AddressSnapshot,
    payment_status: PaymentStatus,
) -> Result<Order, CheckoutError> {
    let cart = store.list_cart(user).await?;
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let mut items = Vec::with_capacity(cart.len());
    let mut subtotal = Decimal::ZERO;
    for line in &cart {
        let quantity = line.quantity;
        let item = match &line.line {
            CartLine::Product {
                product_id,
                size,
                color,
            } => {
                let product = store
                    .product_by_id(*product_id)
                    .await?
                    .ok_or(CheckoutError::ProductMissing)?;
                OrderItem {
                    name: product.name,
                    price: product.price,
                    quantity,
                    size: size.clone(),
                    color: color.clone(),
                    image: product.images.first().cloned(),
                    product_id: Some(product.id),
                    custom_design: None,
                }
            }
            CartLine::Custom { design } => OrderItem {
                name: "Custom design".to_owned(),
                price: design.price,
                quantity,
                size: Some(design.size.clone()),
                color: Some(design.color.clone()),
                image: design.composite_image_url.clone().or_else(|| {
                    Some(design.image.clone())
                }),
                product_id: None,
                custom_design: Some(design.clone()),
            },
        };
        subtotal += item.price * Decimal::from(quantity);
        items.push(item);
    }

    let total = subtotal + shipping_fee(subtotal);
    let order = store
        .create_order(NewOrder {
            user_id: user,
            status: OrderStatus::Pending,
            payment_status,
            total,
            items,
            shipping_address,
        })
        .await?;
    info!(order_id = %order.id, user_id = %user, %total, "Order placed");

    if let Err(e) = store.clear_cart(user).await {
        warn!(user_id = %user, error = %e, "Cart clear failed, queueing retry");
        cleanup.enqueue(user);
    }

    Ok(order)
}

/// The one store operation the cleanup worker needs.
///
/// Narrower than [`Store`] so tests can drive the retry loop with a small
/// failure-injecting double.
#[async_trait]
pub trait CartCleaner: Send + Sync {
    async fn clear_cart(&self, user: UserId) -> Result<(), StoreError>;
}

#[async_trait]
impl CartCleaner for Arc<dyn Store> {
    async fn clear_cart(&self, user: UserId) -> Result<(), StoreError> {
        Store::clear_cart(self.as_ref(), user).await
    }
}

/// Handle to the in-process cart-cleanup retry worker.
#[derive(Clone)]
pub struct CleanupQueue {
    tx: mpsc::UnboundedSender<UserId>,
}

impl CleanupQueue {
    /// Retry attempts per queued clear before giving up.
    const MAX_ATTEMPTS: u32 = 5;

    /// Spawn the retry worker with the default backoff schedule.
    pub fn spawn<C>(cleaner: C) -> (Self, JoinHandle<()>)
    where
        C: CartCleaner + 'static,
    {
        Self::spawn_with(cleaner, Duration::from_millis(200))
    }

    /// Spawn the retry worker with a custom base backoff delay. The delay
    /// doubles after each failed attempt.
    pub fn spawn_with<C>(cleaner: C, base_delay: Duration) -> (Self, JoinHandle<()>)
    where
        C: CartCleaner + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<UserId>();
        let handle = tokio::spawn(async move {
            while let Some(user) = rx.recv().await {
                let mut delay = base_delay;
                let mut cleared = false;
                for attempt in 1..=Self::MAX_ATTEMPTS {
                    match cleaner.clear_cart(user).await {
                        Ok(()) => {
                            info!(user_id = %user, attempt, "Deferred cart clear succeeded");
                            cleared = true;
                            break;
                        }
                        Err(e) => {
                            warn!(user_id = %user, attempt, error = %e, "Cart clear retry failed");
                            tokio::time::sleep(delay).await;
                            delay *= 2;
                        }
                    }
                }
                if !cleared {
                    // The order already stands; the stale cart lines stay
                    // until the user next mutates the cart.
                    error!(user_id = %user, "Cart clear abandoned after retries");
                }
            }
        });
        (Self { tx }, handle)
    }

    /// Queue a user's cart for a deferred clear.
    pub fn enqueue(&self, user: UserId) {
        if self.tx.send(user).is_err() {
            error!(user_id = %user, "Cleanup worker gone, cart clear dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use stitchpress_core::DesignTransform;

    use crate::models::{CustomDesign, NewCartItem, NewProduct};
    use crate::store::MemStore;

    fn snapshot() -> AddressSnapshot {
        AddressSnapshot {
            full_name: "Ana Rao".to_owned(),
            phone: "9999999999".to_owned(),
            line1: "12 Lake Rd".to_owned(),
            line2: None,
            city: "Pune".to_owned(),
            state: "MH".to_owned(),
            pincode: "411001".to_owned(),
        }
    }

    async fn seed_product(store: &MemStore, slug: &str, price: i64) -> stitchpress_core::ProductId {
        let product = store
            .create_product(NewProduct {
                slug: slug.to_owned(),
                name: slug.to_owned(),
                description: String::new(),
                price: Decimal::new(price, 0),
                original_price: None,
                category_id: None,
                images: vec![format!("/api/images/{slug}.png")],
                sizes: vec!["M".to_owned()],
                colors: vec!["black".to_owned()],
                inventory: 10,
                rating: 0.0,
                is_active: true,
            })
            .await
            .expect("create product");
        product.id
    }

    async fn add_product_line(
        store: &MemStore,
        user: UserId,
        product: stitchpress_core::ProductId,
        quantity: u32,
    ) {
        store
            .add_cart_item(NewCartItem {
                user_id: user,
                quantity,
                line: CartLine::Product {
                    product_id: product,
                    size: Some("M".to_owned()),
                    color: None,
                },
            })
            .await
            .expect("add line");
    }

    #[tokio::test]
    async fn test_shipping_fee_under_threshold() {
        let store = MemStore::new();
        let (queue, _worker) = CleanupQueue::spawn_with(
            Arc::new(MemStore::new()) as Arc<dyn Store>,
            Duration::from_millis(1),
        );
        let user = UserId::new(1);
        let a = seed_product(&store, "tee", 200).await;
        let b = seed_product(&store, "cap", 250).await;
        add_product_line(&store, user, a, 1).await;
        add_product_line(&store, user, b, 1).await;

        let order = place_order(&store, &queue, user, snapshot(), PaymentStatus::Paid)
            .await
            .expect("place order");
        // 450 subtotal + 50 shipping
        assert_eq!(order.total, Decimal::new(500, 0));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(store.list_cart(user).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_free_shipping_at_threshold() {
        let store = MemStore::new();
        let (queue, _worker) = CleanupQueue::spawn_with(
            Arc::new(MemStore::new()) as Arc<dyn Store>,
            Duration::from_millis(1),
        );
        let user = UserId::new(1);
        let a = seed_product(&store, "hoodie", 600).await;
        add_product_line(&store, user, a, 1).await;

        let order = place_order(&store, &queue, user, snapshot(), PaymentStatus::Paid)
            .await
            .expect("place order");
        assert_eq!(order.total, Decimal::new(600, 0));
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let store = MemStore::new();
        let (queue, _worker) = CleanupQueue::spawn_with(
            Arc::new(MemStore::new()) as Arc<dyn Store>,
            Duration::from_millis(1),
        );
        assert!(matches!(
            place_order(&store, &queue, UserId::new(1), snapshot(), PaymentStatus::Paid).await,
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[tokio::test]
    async fn test_custom_line_priced_from_design() {
        let store = MemStore::new();
        let (queue, _worker) = CleanupQueue::spawn_with(
            Arc::new(MemStore::new()) as Arc<dyn Store>,
            Duration::from_millis(1),
        );
        let user = UserId::new(1);
        store
            .add_cart_item(NewCartItem {
                user_id: user,
                quantity: 2,
                line: CartLine::Custom {
                    design: CustomDesign {
                        transform: DesignTransform::identity(),
                        image: "/api/images/logo.png".to_owned(),
                        composite_image_url: None,
                        is_finished: false,
                        color: "black".to_owned(),
                        size: "L".to_owned(),
                        price: Decimal::new(350, 0),
                    },
                },
            })
            .await
            .expect("add line");

        let order = place_order(&store, &queue, user, snapshot(), PaymentStatus::Paid)
            .await
            .expect("place order");
        // 700 subtotal, free shipping
        assert_eq!(order.total, Decimal::new(700, 0));
        assert!(order.items[0].custom_design.is_some());
    }

    /// Fails the first N clears, then succeeds.
    struct FlakyCleaner {
        failures: AtomicU32,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl CartCleaner for FlakyCleaner {
        async fn clear_cart(&self, _user: UserId) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failures.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                n.checked_sub(1)
            }).is_ok()
            {
                Err(StoreError::Conflict("injected".to_owned()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_cleanup_queue_retries_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let (queue, worker) = CleanupQueue::spawn_with(
            FlakyCleaner {
                failures: AtomicU32::new(2),
                calls: Arc::clone(&calls),
            },
            Duration::from_millis(1),
        );
        queue.enqueue(UserId::new(9));
        drop(queue);
        worker.await.expect("worker");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cleanup_queue_gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let (queue, worker) = CleanupQueue::spawn_with(
            FlakyCleaner {
                failures: AtomicU32::new(u32::MAX),
                calls: Arc::clone(&calls),
            },
            Duration::from_millis(1),
        );
        queue.enqueue(UserId::new(9));
        drop(queue);
        worker.await.expect("worker");
        assert_eq!(calls.load(Ordering::SeqCst), CleanupQueue::MAX_ATTEMPTS);
    }
}
