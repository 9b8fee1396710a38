/// Store error taxonomy
///
/// Every failure of a `ProjectStore` operation surfaces as a `StoreError`.
/// Each variant carries a stable machine code used by the HTTP layer instead
/// of the internal error text.

use std::time::Duration;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backing database could not be reached or rejected the statement
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("project not found: {0}")]
    NotFound(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("validation failed: {0}")]
    Validation(String),

    /// Persisted document no longer decodes into the current model
    #[error("corrupt project record: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Stable error code, safe to expose to clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) | Self::Timeout(_) => "store_unavailable",
            Self::NotFound(_) => "not_found",
            Self::InvalidId(_) => "invalid_id",
            Self::Validation(_) => "validation_failed",
            Self::Corrupt(_) => "corrupt_record",
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Corrupt(err.to_string())
    }
}
