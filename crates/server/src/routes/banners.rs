//! Public banner listing.

use axum::Json;
use axum::extract::State;

use crate::error::Result;
use crate::models::Banner;
use crate::state::AppState;

/// `GET /api/banners` - active banners only, by position.
pub async fn list_banners(State(state): State<AppState>) -> Result<Json<Vec<Banner>>> {
    Ok(Json(state.store().list_banners(true).await?))
}
