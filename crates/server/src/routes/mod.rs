//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness probe
//! GET  /health/ready                   - Readiness probe
//!
//! # Auth
//! POST /api/auth/signup                - Create an account
//! POST /api/auth/login                 - Exchange credentials for a token
//!
//! # Catalog (public reads, admin mutations)
//! GET  /api/products                   - Product listing (?categoryId=)
//! GET  /api/products/{id}              - Product detail
//! POST /api/products                   - Create product (admin)
//! PUT  /api/products/{id}              - Replace product (admin)
//! DELETE /api/products/{id}            - Delete product (admin)
//! GET  /api/categories                 - Category listing
//! GET  /api/categories/{slug}          - Category by slug
//! GET  /api/categories/{id}/products   - Products in a category
//!
//! # Cart (requires auth)
//! GET  /api/cart                       - Materialized cart lines
//! POST /api/cart                       - Add a product or custom line
//! PUT  /api/cart/{id}                  - Update quantity
//! DELETE /api/cart/{id}                - Remove one line
//! DELETE /api/cart                     - Clear the cart
//! POST /api/cart/{id}/design/finish    - Compose and lock a custom design
//! POST /api/cart/{id}/design/edit      - Reopen a finished design
//!
//! # Orders (requires auth)
//! GET  /api/orders                     - Own orders, newest first
//! POST /api/orders                     - Checkout the current cart
//! GET  /api/orders/{id}                - Order detail (owner or admin)
//!
//! # Addresses (requires auth)
//! GET|POST /api/addresses              - List / create
//! PUT|DELETE /api/addresses/{id}       - Update / delete
//! POST /api/addresses/{id}/default     - Make this the default
//!
//! # Banners
//! GET  /api/banners                    - Active banners (public)
//!
//! # Assets
//! POST /api/upload                     - Multipart image upload (auth)
//! GET  /api/images/{filename}          - Serve a stored asset
//! GET  /attached_assets/{filename}     - Legacy alias for the above
//!
//! # Admin (requires admin role)
//! GET  /api/admin/orders               - All orders
//! PATCH /api/admin/orders/{id}/status  - Advance or cancel an order
//! GET|POST /api/admin/banners          - List all / create
//! PUT|DELETE /api/admin/banners/{id}   - Update / delete
//! GET  /api/admin/users                - List accounts
//! PATCH /api/admin/users/{id}/role     - Change an account role
//! GET|POST /api/admin/themes           - List / create
//! PUT|DELETE /api/admin/themes/{id}    - Update / delete
//! POST /api/admin/themes/{id}/activate - Activate exclusively
//! ```

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod banners;
pub mod cart;
pub mod health;
pub mod orders;
pub mod products;
pub mod uploads;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post, put};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the admin API router.
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}/status", patch(admin::update_order_status))
        .route(
            "/banners",
            get(admin::list_banners).post(admin::create_banner),
        )
        .route(
            "/banners/{id}",
            put(admin::update_banner).delete(admin::delete_banner),
        )
        .route("/users", get(admin::list_users))
        .route("/users/{id}/role", patch(admin::update_user_role))
        .route("/themes", get(admin::list_themes).post(admin::create_theme))
        .route(
            "/themes/{id}",
            put(admin::update_theme).delete(admin::delete_theme),
        )
        .route("/themes/{id}/activate", post(admin::activate_theme))
}

/// Create the complete application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route(
            "/api/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/api/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/api/categories", get(products::list_categories))
        .route("/api/categories/{slug}", get(products::get_category))
        .route(
            "/api/categories/{slug}/products",
            get(products::category_products),
        )
        .route(
            "/api/cart",
            get(cart::list_cart)
                .post(cart::add_item)
                .delete(cart::clear_cart),
        )
        .route(
            "/api/cart/{id}",
            put(cart::update_quantity).delete(cart::remove_item),
        )
        .route("/api/cart/{id}/design/finish", post(cart::finish_design))
        .route("/api/cart/{id}/design/edit", post(cart::edit_design))
        .route(
            "/api/orders",
            get(orders::list_orders).post(orders::place_order),
        )
        .route("/api/orders/{id}", get(orders::get_order))
        .route("/api/banners", get(banners::list_banners))
        .route(
            "/api/addresses",
            get(addresses::list_addresses).post(addresses::create_address),
        )
        .route(
            "/api/addresses/{id}",
            put(addresses::update_address).delete(addresses::delete_address),
        )
        .route("/api/addresses/{id}/default", post(addresses::set_default))
        .route(
            "/api/upload",
            post(uploads::upload).layer(DefaultBodyLimit::max(uploads::MAX_UPLOAD_BYTES)),
        )
        .route("/api/images/{filename}", get(uploads::serve_asset))
        .route("/attached_assets/{filename}", get(uploads::serve_asset))
        .nest("/api/admin", admin_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
