//! Stitchpress server library.
//!
//! Storefront and admin JSON API for a custom-apparel shop: catalog, cart
//! with embedded custom designs, the design compositor, orders with an
//! enforced fulfillment state machine, bearer-token auth, and asset
//! storage. Exposed as a library so the integration tests can drive the
//! router in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod compositor;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
