use thiserror::Error;

use crate::{store::StoreError, transcription::TranscriptionError};

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("record was not persisted: {0}")]
    NotPersisted(String),
    #[error("invalid paging parameter: {0}")]
    InvalidPaging(String),
    #[error("document store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("stored record is malformed: {0}")]
    MalformedRecord(String),
    #[error("transcription failed: {0}")]
    Transcription(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn not_persisted(message: impl Into<String>) -> Self {
        Self::NotPersisted(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(detail) => Self::StoreUnavailable(detail),
            StoreError::InvalidPagingParameter(detail) => Self::InvalidPaging(detail),
            err @ StoreError::MalformedDocument { .. } => Self::MalformedRecord(err.to_string()),
            StoreError::Encoding(detail) => Self::Internal(detail),
        }
    }
}

impl From<TranscriptionError> for DomainError {
    fn from(err: TranscriptionError) -> Self {
        Self::Transcription(err.to_string())
    }
}
