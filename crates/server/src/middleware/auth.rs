//! Authentication extractors.
//!
//! Handlers declare their auth requirement through an extractor argument:
//! [`RequireUser`] for any signed-in account, [`RequireAdmin`] for the
//! admin role. Tokens arrive as `Authorization: Bearer <token>`.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::Claims;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("user {}", user.user_id)
/// }
/// ```
pub struct RequireUser(pub Claims);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verify_bearer(parts, state)?
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;
        Ok(Self(claims))
    }
}

/// Extractor that additionally requires the admin role.
pub struct RequireAdmin(pub Claims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(claims) = RequireUser::from_request_parts(parts, state).await?;
        if !claims.role.is_admin() {
            return Err(AppError::Forbidden);
        }
        Ok(Self(claims))
    }
}

/// Pull and verify the bearer token, if one is present.
///
/// `Ok(None)` means no Authorization header; an unparsable or invalid
/// token is an error, never silently treated as anonymous.
fn verify_bearer(parts: &Parts, state: &AppState) -> Result<Option<Claims>, AppError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let header = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("malformed authorization header".to_owned()))?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("expected bearer authorization".to_owned()))?;
    let claims = state.tokens().verify(token)?;
    Ok(Some(claims))
}
