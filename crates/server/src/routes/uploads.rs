//! Upload and static asset routes.
//!
//! `POST /api/upload` accepts a multipart image and returns its public URL.
//! Stored assets are served back from `/api/images/{filename}` and the
//! legacy `/attached_assets/{filename}` alias, both behind the asset
//! store's traversal guard.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::services::AssetStore;
use crate::state::AppState;

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 8 * 1024 * 1024;

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        _ => None,
    }
}

/// `POST /api/upload`
#[instrument(skip(state, multipart, claims), fields(user_id = %claims.user_id))]
pub async fn upload(
    RequireUser(claims): RequireUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") && field.name() != Some("image") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_owned();
        let Some(extension) = extension_for(&content_type) else {
            return Err(AppError::Validation(format!(
                "unsupported image type: {content_type}"
            )));
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("upload read failed: {e}")))?;
        if bytes.is_empty() {
            return Err(AppError::Validation("empty upload".to_owned()));
        }

        let url = state.assets().save(&bytes, extension).await?;
        info!(%url, size = bytes.len(), "Asset uploaded");
        return Ok((StatusCode::CREATED, Json(json!({ "url": url }))));
    }
    Err(AppError::Validation("no file field in upload".to_owned()))
}

/// `GET /api/images/{filename}` and `GET /attached_assets/{filename}`
pub async fn serve_asset(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let bytes = state.assets().read(&filename).await?;
    let content_type = AssetStore::content_type(&filename);
    Ok(([(CONTENT_TYPE, content_type)], bytes).into_response())
}
