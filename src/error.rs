//! Error types for Biblio server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchRecord = 4,
    BookNotAvailable = 5,
    DuplicateLoan = 6,
    DueDatePassed = 7,
    NoOpenLoan = 8,
    Duplicate = 9,
    BadValue = 10,
}

/// Main application error type
///
/// One variant per outward error kind; the kind (not the HTTP status) is the
/// contract with callers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid due date: {0}")]
    InvalidDueDate(String),

    #[error("Book not available: {0}")]
    ItemUnavailable(String),

    #[error("Duplicate loan: {0}")]
    DuplicateLoan(String),

    #[error("No open loan: {0}")]
    NoOpenLoan(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        // Surface unique-index violations as constraint violations; the open
        // loan pair index is mapped to DuplicateLoan at the call site where
        // the pair semantics are known.
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unique constraint");
                return AppError::ConstraintViolation(format!("{} violated", constraint));
            }
        }
        AppError::Database(err)
    }
}

impl AppError {
    /// True when this error wraps a violation of the named unique index.
    pub fn is_unique_violation(&self, constraint: &str) -> bool {
        matches!(self, AppError::ConstraintViolation(msg) if msg.starts_with(constraint))
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchRecord),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue),
            AppError::InvalidDueDate(_) => (StatusCode::BAD_REQUEST, ErrorCode::DueDatePassed),
            AppError::ItemUnavailable(_) => (StatusCode::CONFLICT, ErrorCode::BookNotAvailable),
            AppError::DuplicateLoan(_) => (StatusCode::CONFLICT, ErrorCode::DuplicateLoan),
            AppError::NoOpenLoan(_) => (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::NoOpenLoan),
            AppError::ConstraintViolation(_) => (StatusCode::CONFLICT, ErrorCode::Duplicate),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
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
