//! HTTP error responses.

use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use crime_demo_dataset::DatasetError;
use crime_demo_server_models::ApiFailure;

use crate::auth::AuthError;

/// An error rendered as `{"success": false, "detail": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status}: {detail}")]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    /// Rejected query string or request body.
    #[must_use]
    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(ApiFailure::new(self.detail.clone()))
    }
}

impl From<DatasetError> for ApiError {
    fn from(e: DatasetError) -> Self {
        match e {
            DatasetError::Validation { .. } => Self::new(StatusCode::BAD_REQUEST, e.to_string()),
            DatasetError::NotFound { .. } => Self::new(StatusCode::NOT_FOUND, e.to_string()),
            DatasetError::Io(_) | DatasetError::Csv(_) | DatasetError::Parse { .. } => {
                log::error!("Dataset error: {e}");
                Self::internal(e.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        if let AuthError::Signing(source) = &e {
            log::error!("Token signing failed: {source}");
        }
        Self::new(e.status_code(), e.to_string())
    }
}

impl From<BlockingError> for ApiError {
    fn from(e: BlockingError) -> Self {
        log::error!("Blocking task failed: {e}");
        Self::internal("Internal server error")
    }
}
