//! Finishing and reopening custom designs.
//!
//! Finishing composes the uploaded logo onto the garment base and stores
//! the flattened PNG; the resulting URL is recorded on the cart line.
//! Editing reopens the design, clearing the stale composite.

use thiserror::Error;
use tracing::info;

use stitchpress_core::{CartItemId, UserId};

use crate::compositor::{CompositeError, Compositor, solid_base};
use crate::models::{CartItem, CartLine, CustomDesign};
use crate::services::assets::{AssetError, AssetStore, decode_data_uri};
use crate::store::{Store, StoreError};

/// Errors from the design finish/edit flow.
#[derive(Debug, Error)]
pub enum DesignError {
    /// No such cart line, or it belongs to another user.
    #[error("cart item not found")]
    NotFound,

    /// The line is a catalog product, not a custom design.
    #[error("cart item has no custom design")]
    NotCustom,

    #[error(transparent)]
    Composite(#[from] CompositeError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fetch a cart line, checking ownership, and return its design.
async fn owned_design(
    store: &dyn Store,
    user: UserId,
    item: CartItemId,
) -> Result<CustomDesign, DesignError> {
    let line = store
        .cart_item(item)
        .await?
        .filter(|line| line.user_id == user)
        .ok_or(DesignError::NotFound)?;
    match line.line {
        CartLine::Custom { design } => Ok(design),
        CartLine::Product { .. } => Err(DesignError::NotCustom),
    }
}

/// Compose the design's composite image, store it, and mark the design
/// finished.
///
/// # Errors
///
/// Returns [`CompositeError::NoDesignUploaded`] (wrapped) when no logo has
/// been uploaded, plus decode/encode/storage failures from the pipeline.
pub async fn finish_design(
    store: &dyn Store,
    assets: &AssetStore,
    compositor: Compositor,
    user: UserId,
    item: CartItemId,
) -> Result<CartItem, DesignError> {
    let mut design = owned_design(store, user, item).await?;
    if design.image.is_empty() {
        return Err(CompositeError::NoDesignUploaded.into());
    }

    let overlay = load_overlay(assets, &design.image).await?;
    let base = solid_base(&design.color);
    let png = compositor.compose(&base, &overlay, &design.transform)?;
    let url = assets
        .save(&png, "png")
        .await
        .map_err(|e| CompositeError::UploadFailed(e.to_string()))?;

    info!(cart_item = %item, user_id = %user, %url, "Design composite stored");
    design.finish(url);
    Ok(store.set_cart_design(item, design).await?)
}

/// Reopen a finished design for editing, discarding the composite.
///
/// # Errors
///
/// Returns [`DesignError::NotFound`] / [`DesignError::NotCustom`] as in
/// [`finish_design`].
pub async fn edit_design(
    store: &dyn Store,
    user: UserId,
    item: CartItemId,
) -> Result<CartItem, DesignError> {
    let mut design = owned_design(store, user, item).await?;
    design.reopen();
    Ok(store.set_cart_design(item, design).await?)
}

/// Resolve the logo reference to raw bytes: either an inline data URI or a
/// previously uploaded asset URL.
async fn load_overlay(assets: &AssetStore, image: &str) -> Result<Vec<u8>, DesignError> {
    if image.starts_with("data:") {
        let (_, bytes) = decode_data_uri(image)?;
        return Ok(bytes);
    }
    let name = image
        .strip_prefix("/api/images/")
        .ok_or_else(|| CompositeError::ImageLoadFailed(format!("unresolvable logo url: {image}")))?;
    Ok(assets.read(name).await?)
}
