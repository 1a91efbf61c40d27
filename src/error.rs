//! Error types for Biblos server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable error codes carried in every error payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotFound = 2,
    DbFailure = 3,
    BadValue = 4,
    LimitExceeded = 5,
    NotAvailable = 6,
    AlreadyReturned = 7,
    ActiveRecordUndeletable = 8,
    DeletionRestricted = 9,
    StatusChangeBlocked = 10,
    Duplicate = 11,
    FormatInvalid = 12,
    FutureDateInvalid = 13,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Member \"{member}\" has reached the borrowing limit of {limit} books")]
    LimitExceeded { member: String, limit: i32 },

    #[error("Book \"{book}\" is not available for borrowing")]
    NotAvailable { book: String },

    #[error("This book has already been returned")]
    AlreadyReturned,

    #[error("Cannot delete borrowing record \"{record}\" while the book has not been returned (status: {status})")]
    ActiveRecordUndeletable { record: String, status: String },

    #[error("{0}")]
    DeletionRestricted(String),

    #[error("Cannot change status of member \"{member}\" to \"{status}\" while {current_borrowed} books are still borrowed. All books must be returned first")]
    StatusChangeBlocked {
        member: String,
        status: String,
        current_borrowed: i64,
    },

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    FormatInvalid(String),

    #[error("{0}")]
    FutureDateInvalid(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg.clone()),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::LimitExceeded { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::LimitExceeded,
                self.to_string(),
            ),
            AppError::NotAvailable { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::NotAvailable,
                self.to_string(),
            ),
            AppError::AlreadyReturned => (
                StatusCode::CONFLICT,
                ErrorCode::AlreadyReturned,
                self.to_string(),
            ),
            AppError::ActiveRecordUndeletable { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::ActiveRecordUndeletable,
                self.to_string(),
            ),
            AppError::DeletionRestricted(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::DeletionRestricted,
                msg.clone(),
            ),
            AppError::StatusChangeBlocked { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::StatusChangeBlocked,
                self.to_string(),
            ),
            AppError::Duplicate(msg) => (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone()),
            AppError::FormatInvalid(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::FormatInvalid, msg.clone())
            }
            AppError::FutureDateInvalid(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::FutureDateInvalid,
                msg.clone(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
