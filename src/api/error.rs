/// Store error to HTTP response mapping
///
/// Clients only ever see a stable `code` and a fixed message per code. The
/// underlying error text goes to the log.

use crate::project::StoreError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// Error returned by every project handler
#[derive(Debug)]
pub struct ApiError(pub StoreError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            StoreError::Unavailable(_) | StoreError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::InvalidId(_) => StatusCode::BAD_REQUEST,
            StoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::Corrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message, fixed per error code
    fn public_message(&self) -> &'static str {
        match self.0 {
            StoreError::Unavailable(_) | StoreError::Timeout(_) => {
                "Project store is currently unavailable"
            }
            StoreError::NotFound(_) => "Project not found",
            StoreError::InvalidId(_) => "Identifier is not well-formed",
            StoreError::Validation(_) => "Request failed validation",
            StoreError::Corrupt(_) => "Stored project record could not be read",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(StoreError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(StoreError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("❌ {} ({})", self.0, self.0.code());
        } else {
            tracing::warn!("Request rejected: {} ({})", self.0, self.0.code());
        }

        let body = json!({
            "error": {
                "code": self.0.code(),
                "message": self.public_message(),
            }
        });
        (status, Json(body)).into_response()
    }
}
