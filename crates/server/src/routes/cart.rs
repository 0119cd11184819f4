//! Cart route handlers.
//!
//! The cart is keyed by the authenticated user. Lines are either catalog
//! products or custom designs; the materialized view joins catalog lines
//! with their live product record.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use stitchpress_core::{CartItemId, DesignTransform, ProductId, UserId};

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{CartItem, CartLine, CustomDesign, NewCartItem, Product};
use crate::services::assets::decode_data_uri;
use crate::services::design;
use crate::state::AppState;

/// Add-to-cart payload. Either `product_id` or `custom_design` must be
/// present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub product_id: Option<ProductId>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
    pub custom_design: Option<CustomDesignRequest>,
}

const fn default_quantity() -> u32 {
    1
}

/// Incoming custom design. The logo may be an inline data URI, which is
/// persisted to the asset store before the line is saved.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDesignRequest {
    #[serde(flatten)]
    pub transform: DesignTransform,
    pub image: String,
    pub color: String,
    pub size: String,
    pub price: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// A cart line materialized for display: catalog lines carry their live
/// product, custom lines are self-contained.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub id: CartItemId,
    pub user_id: UserId,
    pub quantity: u32,
    #[serde(flatten)]
    pub line: CartLine,
    pub product: Option<Product>,
    pub created_at: DateTime<Utc>,
}

async fn materialize(state: &AppState, item: CartItem) -> Result<CartItemView> {
    let product = match item.line.product_id() {
        Some(id) => state.store().product_by_id(id).await?,
        None => None,
    };
    Ok(CartItemView {
        id: item.id,
        user_id: item.user_id,
        quantity: item.quantity,
        line: item.line,
        product,
        created_at: item.created_at,
    })
}

/// `GET /api/cart`
pub async fn list_cart(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CartItemView>>> {
    let items = state.store().list_cart(claims.user_id).await?;
    let mut views = Vec::with_capacity(items.len());
    for item in items {
        views.push(materialize(&state, item).await?);
    }
    Ok(Json(views))
}

/// `POST /api/cart`
#[instrument(skip(state, body, claims), fields(user_id = %claims.user_id))]
pub async fn add_item(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<AddCartItemRequest>,
) -> Result<(StatusCode, Json<CartItemView>)> {
    if body.quantity < 1 {
        return Err(AppError::Validation("quantity must be at least 1".to_owned()));
    }

    let line = match (body.product_id, body.custom_design) {
        (_, Some(design)) => CartLine::Custom {
            design: build_design(&state, design).await?,
        },
        (Some(product_id), None) => {
            state
                .store()
                .product_by_id(product_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Product".to_owned()))?;
            CartLine::Product {
                product_id,
                size: body.size,
                color: body.color,
            }
        }
        (None, None) => {
            return Err(AppError::Validation(
                "cart item requires a product or a custom design".to_owned(),
            ));
        }
    };

    let item = state
        .store()
        .add_cart_item(NewCartItem {
            user_id: claims.user_id,
            quantity: body.quantity,
            line,
        })
        .await?;
    info!(cart_item = %item.id, "Cart line added");
    Ok((StatusCode::CREATED, Json(materialize(&state, item).await?)))
}

/// Validate the incoming design and persist an inline logo upload.
async fn build_design(state: &AppState, req: CustomDesignRequest) -> Result<CustomDesign> {
    req.transform
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if req.price < Decimal::ZERO {
        return Err(AppError::Validation("price must not be negative".to_owned()));
    }

    let image = if req.image.starts_with("data:") {
        let (extension, bytes) = decode_data_uri(&req.image)?;
        state.assets().save(&bytes, extension).await?
    } else {
        req.image
    };

    Ok(CustomDesign {
        transform: req.transform,
        image,
        composite_image_url: None,
        is_finished: false,
        color: req.color,
        size: req.size,
        price: req.price,
    })
}

/// Fetch a cart line and check it belongs to the caller.
async fn owned_item(state: &AppState, user: UserId, id: CartItemId) -> Result<CartItem> {
    state
        .store()
        .cart_item(id)
        .await?
        .filter(|item| item.user_id == user)
        .ok_or_else(|| AppError::NotFound("Cart item".to_owned()))
}

/// `PUT /api/cart/{id}`
#[instrument(skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn update_quantity(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Json<CartItemView>> {
    if body.quantity < 1 {
        return Err(AppError::Validation("quantity must be at least 1".to_owned()));
    }
    owned_item(&state, claims.user_id, id).await?;
    let item = state.store().set_cart_quantity(id, body.quantity).await?;
    Ok(Json(materialize(&state, item).await?))
}

/// `DELETE /api/cart/{id}`
#[instrument(skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn remove_item(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
) -> Result<StatusCode> {
    owned_item(&state, claims.user_id, id).await?;
    state.store().remove_cart_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/cart`
#[instrument(skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn clear_cart(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    state.store().clear_cart(claims.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/cart/{id}/design/finish`
#[instrument(skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn finish_design(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
) -> Result<Json<CartItemView>> {
    let item = design::finish_design(
        state.store(),
        state.assets(),
        state.compositor(),
        claims.user_id,
        id,
    )
    .await?;
    Ok(Json(materialize(&state, item).await?))
}

/// `POST /api/cart/{id}/design/edit`
#[instrument(skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn edit_design(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
) -> Result<Json<CartItemView>> {
    let item = design::edit_design(state.store(), claims.user_id, id).await?;
    Ok(Json(materialize(&state, item).await?))
}
