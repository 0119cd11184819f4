//! Core types for Stitchpress.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod design;
pub mod email;
pub mod id;
pub mod status;

pub use design::{DesignTransform, DesignTransformError};
pub use email::{Email, EmailError};
pub use id::*;
pub use status::*;
