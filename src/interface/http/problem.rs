use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use crate::domain::errors::DomainError;

pub type ApiResult<T> = Result<T, ApiProblem>;

/// Stable machine-readable error codes carried in `error_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    Validation = 1,
    NotFound = 2,
    NotPersisted = 3,
    InvalidPaging = 4,
    StoreUnavailable = 5,
    MalformedRecord = 6,
    Transcription = 7,
    Internal = 8,
}

#[derive(Debug)]
pub struct ApiProblem {
    status: StatusCode,
    code: ErrorCode,
    description: String,
    origin: &'static str,
    correlation_id: String,
}

impl ApiProblem {
    pub fn from_domain(error: DomainError, origin: &'static str) -> Self {
        let (status, code, description) = match error {
            DomainError::Validation(detail) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::Validation, detail)
            }
            DomainError::NotFound(detail) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, detail),
            DomainError::NotPersisted(detail) => {
                (StatusCode::BAD_REQUEST, ErrorCode::NotPersisted, detail)
            }
            DomainError::InvalidPaging(detail) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidPaging, detail)
            }
            DomainError::StoreUnavailable(detail) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::StoreUnavailable,
                detail,
            ),
            DomainError::MalformedRecord(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::MalformedRecord,
                detail,
            ),
            DomainError::Transcription(detail) => {
                (StatusCode::BAD_GATEWAY, ErrorCode::Transcription, detail)
            }
            DomainError::Internal(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::Internal,
                detail,
            ),
        };

        Self::new(status, code, description, origin)
    }

    pub fn validation(detail: impl Into<String>, origin: &'static str) -> Self {
        Self::from_domain(DomainError::validation(detail), origin)
    }

    fn new(
        status: StatusCode,
        code: ErrorCode,
        description: impl Into<String>,
        origin: &'static str,
    ) -> Self {
        Self {
            status,
            code,
            description: description.into(),
            origin,
            correlation_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    http_status_code: u16,
    error_code: u16,
    error_description: String,
    error_origin: String,
    correlation_id: String,
}

impl IntoResponse for ApiProblem {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(
                status = self.status.as_u16(),
                origin = self.origin,
                correlation_id = %self.correlation_id,
                detail = %self.description,
                "request failed"
            );
        }

        let payload = ErrorResponse {
            http_status_code: self.status.as_u16(),
            error_code: self.code as u16,
            error_description: self.description,
            error_origin: self.origin.to_string(),
            correlation_id: self.correlation_id,
        };

        (self.status, Json(payload)).into_response()
    }
}
