//! Domain models for the storefront and admin console.
//!
//! Models are plain data carried between the store, the services, and the
//! route handlers. Anything that reaches the wire goes through the view
//! types in `routes`, so password hashes and other internals stay here.

pub mod address;
pub mod banner;
pub mod cart;
pub mod order;
pub mod product;
pub mod theme;
pub mod user;

pub use address::{Address, AddressSnapshot, NewAddress};
pub use banner::{Banner, NewBanner};
pub use cart::{CartItem, CartLine, CustomDesign, NewCartItem};
pub use order::{NewOrder, Order, OrderItem};
pub use product::{Category, NewCategory, NewProduct, Product};
pub use theme::{NewTheme, Theme};
pub use user::{NewUser, User};
