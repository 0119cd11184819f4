//! Application services sitting between the routes and the store.

pub mod assets;
pub mod auth;
pub mod checkout;
pub mod design;
pub mod token;

pub use assets::{AssetError, AssetStore};
pub use auth::{AuthError, AuthService};
pub use checkout::{CheckoutError, CleanupQueue};
pub use design::DesignError;
pub use token::{Claims, TokenError, TokenService};
