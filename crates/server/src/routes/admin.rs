//! Admin console route handlers.
//!
//! Every handler here takes [`RequireAdmin`]; a valid non-admin token gets
//! 403, no token gets 401.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::{info, instrument};

use stitchpress_core::{BannerId, OrderId, OrderStatus, ThemeId, UserId, UserRole};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Banner, NewBanner, NewTheme, Order, Theme};
use crate::routes::auth::UserView;
use crate::state::AppState;

// ------------------------------------------------------------------
// Orders
// ------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

/// `GET /api/admin/orders` - every user's orders, newest first.
pub async fn list_orders(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.store().list_orders(None).await?))
}

/// `PATCH /api/admin/orders/{id}/status`
///
/// Transitions travel the fulfillment graph only: one step forward, or
/// cancellation from a non-terminal state.
#[instrument(skip(state))]
pub async fn update_order_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<Json<Order>> {
    let order = state
        .store()
        .order_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_owned()))?;
    if !order.status.can_transition_to(body.status) {
        return Err(AppError::Validation(format!(
            "invalid status transition: {} -> {}",
            order.status, body.status
        )));
    }
    let order = state.store().set_order_status(id, body.status).await?;
    info!(order_id = %id, status = %body.status, "Order status updated");
    Ok(Json(order))
}

// ------------------------------------------------------------------
// Banners
// ------------------------------------------------------------------

/// `GET /api/admin/banners` - all banners, active or not.
pub async fn list_banners(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Banner>>> {
    Ok(Json(state.store().list_banners(false).await?))
}

/// `POST /api/admin/banners`
#[instrument(skip(state, body))]
pub async fn create_banner(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<NewBanner>,
) -> Result<(StatusCode, Json<Banner>)> {
    let banner = state.store().create_banner(body).await?;
    Ok((StatusCode::CREATED, Json(banner)))
}

/// `PUT /api/admin/banners/{id}`
#[instrument(skip(state, body))]
pub async fn update_banner(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<BannerId>,
    Json(body): Json<NewBanner>,
) -> Result<Json<Banner>> {
    Ok(Json(state.store().update_banner(id, body).await?))
}

/// `DELETE /api/admin/banners/{id}`
#[instrument(skip(state))]
pub async fn delete_banner(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<BannerId>,
) -> Result<StatusCode> {
    state.store().delete_banner(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ------------------------------------------------------------------
// Users
// ------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdateRequest {
    pub role: UserRole,
}

/// `GET /api/admin/users`
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserView>>> {
    let users = state.store().list_users().await?;
    Ok(Json(users.iter().map(UserView::from).collect()))
}

/// `PATCH /api/admin/users/{id}/role`
#[instrument(skip(state, admin), fields(admin_id = %admin.user_id))]
pub async fn update_user_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<RoleUpdateRequest>,
) -> Result<Json<UserView>> {
    if admin.user_id == id && body.role == UserRole::User {
        return Err(AppError::Validation(
            "admins cannot demote themselves".to_owned(),
        ));
    }
    let user = state.store().set_user_role(id, body.role).await?;
    info!(user_id = %id, role = %body.role, "User role updated");
    Ok(Json(UserView::from(&user)))
}

// ------------------------------------------------------------------
// Themes
// ------------------------------------------------------------------

/// `GET /api/admin/themes`
pub async fn list_themes(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Theme>>> {
    Ok(Json(state.store().list_themes().await?))
}

/// `POST /api/admin/themes`
#[instrument(skip(state, body), fields(name = %body.name))]
pub async fn create_theme(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<NewTheme>,
) -> Result<(StatusCode, Json<Theme>)> {
    let theme = state.store().create_theme(body).await?;
    Ok((StatusCode::CREATED, Json(theme)))
}

/// `PUT /api/admin/themes/{id}`
#[instrument(skip(state, body))]
pub async fn update_theme(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ThemeId>,
    Json(body): Json<NewTheme>,
) -> Result<Json<Theme>> {
    Ok(Json(state.store().update_theme(id, body).await?))
}

/// `DELETE /api/admin/themes/{id}`
#[instrument(skip(state))]
pub async fn delete_theme(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ThemeId>,
) -> Result<StatusCode> {
    state.store().delete_theme(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/admin/themes/{id}/activate`
#[instrument(skip(state))]
pub async fn activate_theme(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ThemeId>,
) -> Result<Json<Theme>> {
    let theme = state.store().activate_theme(id).await?;
    info!(theme_id = %id, "Theme activated");
    Ok(Json(theme))
}
