//! Store-level error types.
//!
//! "Not found" is deliberately absent here: handler operations report a
//! missing record as `Ok(None)` / `Ok(false)` so it can never be confused
//! with a transport failure.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid paging parameter: {0}")]
    InvalidPagingParameter(String),

    #[error("malformed document in collection '{collection}': {message}")]
    MalformedDocument { collection: String, message: String },

    #[error("record could not be encoded: {0}")]
    Encoding(String),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn invalid_paging(message: impl Into<String>) -> Self {
        Self::InvalidPagingParameter(message.into())
    }

    /// Returns true for failures caused by the store itself rather than the caller.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<bson::ser::Error> for StoreError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}
