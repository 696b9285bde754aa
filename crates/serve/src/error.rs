//! HTTP error responses
//!
//! Store failures are logged with their detail and answered with a generic
//! body; nothing from the store reaches the client.

use agency_core::{ListingError, LookupError, StoreError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Errors returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid page number")]
    InvalidPage,

    #[error("Page number too high")]
    PageTooHigh,

    #[error("Agency not found")]
    NotFound,

    #[error("store error: {0}")]
    Store(StoreError),
}

/// Error body for every non-2xx response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<ListingError> for ApiError {
    fn from(err: ListingError) -> Self {
        match err {
            ListingError::InvalidPage => Self::InvalidPage,
            ListingError::PageTooHigh => Self::PageTooHigh,
            ListingError::Store(e) => Self::Store(e),
        }
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NotFound { .. } => Self::NotFound,
            LookupError::Store(e) => Self::Store(e),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPage | Self::PageTooHigh => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Store(e) => {
                error!("Store error while serving request: {}", e);
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    message: Some("Please try again later".to_string()),
                }
            }
            other => ErrorResponse {
                error: other.to_string(),
                message: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
