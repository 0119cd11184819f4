//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return
//! `Result<T, AppError>`. Responses carry a JSON `{"message": ...}` body;
//! internal detail is logged, never leaked.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::compositor::CompositeError;
use crate::services::assets::AssetError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::services::design::DesignError;
use crate::services::token::TokenError;
use crate::store::StoreError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or semantically invalid request body.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing, malformed, or expired credential.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but lacking the required role.
    #[error("Forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness conflict (duplicate email, slug, ...).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        // Don't expose internal error details to clients
        let message = match &self {
            Self::Internal(_) => "Internal server error".to_owned(),
            Self::Validation(msg) | Self::Unauthorized(msg) | Self::Conflict(msg) => msg.clone(),
            Self::Forbidden => "Forbidden".to_owned(),
            Self::NotFound(what) => format!("{what} not found"),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => Self::NotFound("Resource".to_owned()),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Database(_) | StoreError::DataCorruption(_) => {
                Self::Internal(e.to_string())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => Self::Unauthorized(e.to_string()),
            AuthError::UserExists => Self::Conflict(e.to_string()),
            AuthError::InvalidEmail(_) | AuthError::WeakPassword => {
                Self::Validation(e.to_string())
            }
            AuthError::Hashing => Self::Internal(e.to_string()),
            AuthError::Store(inner) => inner.into(),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        Self::Unauthorized(e.to_string())
    }
}

impl From<CheckoutError> for AppError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::EmptyCart | CheckoutError::ProductMissing => {
                Self::Validation(e.to_string())
            }
            CheckoutError::Store(inner) => inner.into(),
        }
    }
}

impl From<CompositeError> for AppError {
    fn from(e: CompositeError) -> Self {
        match e {
            CompositeError::NoDesignUploaded
            | CompositeError::ImageLoadFailed(_)
            | CompositeError::InvalidTransform(_) => Self::Validation(e.to_string()),
            CompositeError::UploadFailed(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<AssetError> for AppError {
    fn from(e: AssetError) -> Self {
        match e {
            AssetError::InvalidName | AssetError::InvalidDataUri | AssetError::UnsupportedType(_) => {
                Self::Validation(e.to_string())
            }
            AssetError::NotFound => Self::NotFound("Asset".to_owned()),
            AssetError::Io(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<DesignError> for AppError {
    fn from(e: DesignError) -> Self {
        match e {
            DesignError::NotFound => Self::NotFound("Cart item".to_owned()),
            DesignError::NotCustom => Self::Validation(e.to_string()),
            DesignError::Composite(inner) => inner.into(),
            DesignError::Asset(inner) => inner.into(),
            DesignError::Store(inner) => inner.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_credentials_maps_to_401() {
        let err: AppError = AuthError::InvalidCredentials.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let err = AppError::Internal("connection to 10.0.0.3 refused".into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
