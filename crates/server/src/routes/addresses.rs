//! Address book route handlers.
//!
//! All operations are scoped to the authenticated user; the store keeps
//! the at-most-one-default invariant.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::instrument;

use stitchpress_core::{AddressId, UserId};

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{Address, NewAddress};
use crate::state::AppState;

async fn check_ownership(state: &AppState, user: UserId, id: AddressId) -> Result<()> {
    state
        .store()
        .address_by_id(id)
        .await?
        .filter(|a| a.user_id == user)
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Address".to_owned()))
}

/// `GET /api/addresses`
pub async fn list_addresses(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Address>>> {
    Ok(Json(state.store().list_addresses(claims.user_id).await?))
}

/// `POST /api/addresses`
#[instrument(skip(state, body, claims), fields(user_id = %claims.user_id))]
pub async fn create_address(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<NewAddress>,
) -> Result<(StatusCode, Json<Address>)> {
    let address = state.store().create_address(claims.user_id, body).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// `PUT /api/addresses/{id}`
#[instrument(skip(state, body, claims), fields(user_id = %claims.user_id))]
pub async fn update_address(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
    Json(body): Json<NewAddress>,
) -> Result<Json<Address>> {
    check_ownership(&state, claims.user_id, id).await?;
    Ok(Json(state.store().update_address(id, body).await?))
}

/// `DELETE /api/addresses/{id}`
#[instrument(skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn delete_address(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
) -> Result<StatusCode> {
    check_ownership(&state, claims.user_id, id).await?;
    state.store().delete_address(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/addresses/{id}/default`
#[instrument(skip(state, claims), fields(user_id = %claims.user_id))]
pub async fn set_default(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
) -> Result<Json<Address>> {
    Ok(Json(
        state.store().set_default_address(claims.user_id, id).await?,
    ))
}
