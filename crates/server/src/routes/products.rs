//! Product and category route handlers.
//!
//! Reads are public; catalog mutations require the admin role.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::{info, instrument};

use stitchpress_core::{CategoryId, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Category, NewProduct, Product};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
}

/// `GET /api/products`
pub async fn list_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>> {
    let products = state.store().list_products(filter.category_id).await?;
    Ok(Json(products))
}

/// `GET /api/products/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = state
        .store()
        .product_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_owned()))?;
    Ok(Json(product))
}

/// `POST /api/products` (admin)
#[instrument(skip(state, body), fields(slug = %body.slug))]
pub async fn create_product(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.store().create_product(body).await?;
    info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/products/{id}` (admin)
#[instrument(skip(state, body))]
pub async fn update_product(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<NewProduct>,
) -> Result<Json<Product>> {
    let product = state.store().update_product(id, body).await?;
    Ok(Json(product))
}

/// `DELETE /api/products/{id}` (admin)
#[instrument(skip(state))]
pub async fn delete_product(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    state.store().delete_product(id).await?;
    info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/categories`
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.store().list_categories().await?))
}

/// `GET /api/categories/{slug}`
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Category>> {
    let category = state
        .store()
        .category_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_owned()))?;
    Ok(Json(category))
}

/// `GET /api/categories/{id}/products`
pub async fn category_products(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Vec<Product>>> {
    state
        .store()
        .category_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_owned()))?;
    Ok(Json(state.store().list_products(Some(id)).await?))
}
