//! Order route handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::instrument;

use stitchpress_core::{AddressId, OrderId, PaymentStatus};

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{AddressSnapshot, Order};
use crate::services::checkout;
use crate::state::AppState;

/// Checkout payload: a saved address by id, or an inline shipping address.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub address_id: Option<AddressId>,
    pub shipping_address: Option<AddressSnapshot>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

/// `GET /api/orders` - the caller's orders, newest first.
pub async fn list_orders(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.store().list_orders(Some(claims.user_id)).await?))
}

/// `GET /api/orders/{id}` - owner or admin only.
pub async fn get_order(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = state
        .store()
        .order_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_owned()))?;
    if order.user_id != claims.user_id && !claims.role.is_admin() {
        // Hide other users' order ids rather than confirming they exist.
        return Err(AppError::NotFound("Order".to_owned()));
    }
    Ok(Json(order))
}

/// `POST /api/orders` - place an order from the current cart.
#[instrument(skip(state, body, claims), fields(user_id = %claims.user_id))]
pub async fn place_order(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let shipping_address = match (body.address_id, body.shipping_address) {
        (Some(address_id), _) => {
            let address = state
                .store()
                .address_by_id(address_id)
                .await?
                .filter(|a| a.user_id == claims.user_id)
                .ok_or_else(|| AppError::NotFound("Address".to_owned()))?;
            address.snapshot()
        }
        (None, Some(snapshot)) => snapshot,
        (None, None) => {
            return Err(AppError::Validation(
                "order requires an address id or a shipping address".to_owned(),
            ));
        }
    };

    let order = checkout::place_order(
        state.store(),
        state.cleanup(),
        claims.user_id,
        shipping_address,
        body.payment_status,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(order)))
}
