//! Error types for Curatly services
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - HTTP status code mapping
//! - Short, non-technical messages in responses
//! - Error codes for client handling

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::SqlErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Message returned for server errors that were not given a public message
pub const GENERIC_SERVER_ERROR: &str = "Something went wrong. Please try again.";

/// Message for unique violations the caller did not rephrase
pub const DUPLICATE_MESSAGE: &str = "This item already exists.";

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    ValidationError,
    MissingField,
    InvalidFormat,
    InvalidPagination,
    UnknownProvider,
    PageOutOfRange,

    // Authentication errors
    Unauthorized,
    ExpiredToken,

    // Authorization errors
    Forbidden,

    // Resource errors
    NotFound,
    ExhibitionNotFound,
    FavouriteNotFound,

    // Conflict errors
    Conflict,

    // Rate limiting
    RateLimited,

    // Database errors
    DatabaseError,
    ConnectionError,

    // External service errors
    UpstreamError,

    // Internal errors
    InternalError,
    ConfigurationError,
    SerializationError,
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("{message}")]
    MissingField { field: String, message: String },

    #[error("{message}")]
    InvalidFormat { message: String },

    #[error("Invalid page or limit parameter")]
    InvalidPagination,

    #[error("Invalid provider specified")]
    UnknownProvider { provider: String },

    #[error("Page number out of range")]
    PageOutOfRange { page: u32, total_pages: u32 },

    // Authentication errors
    #[error("{message}")]
    Unauthorized { message: String },

    #[error("Session expired, please log in again")]
    ExpiredToken,

    // Authorization errors
    #[error("{message}")]
    Forbidden { message: String },

    // Resource errors
    #[error("{resource_type} not found")]
    NotFound { resource_type: String, id: String },

    #[error("Exhibition not found")]
    ExhibitionNotFound { id: String },

    #[error("Favourite not found")]
    FavouriteNotFound { id: String },

    // Conflict errors
    #[error("{message}")]
    Duplicate { message: String },

    // Rate limiting
    #[error("Too many requests, please slow down")]
    RateLimited,

    // Database errors
    #[error("Database error: {0}")]
    Database(sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    // External service errors
    #[error("Upstream {service} error: {message}")]
    Upstream { service: String, message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Internal errors
    #[error("{message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::InvalidPagination => ErrorCode::InvalidPagination,
            AppError::UnknownProvider { .. } => ErrorCode::UnknownProvider,
            AppError::PageOutOfRange { .. } => ErrorCode::PageOutOfRange,
            AppError::Unauthorized { .. } => ErrorCode::Unauthorized,
            AppError::ExpiredToken => ErrorCode::ExpiredToken,
            AppError::Forbidden { .. } => ErrorCode::Forbidden,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::ExhibitionNotFound { .. } => ErrorCode::ExhibitionNotFound,
            AppError::FavouriteNotFound { .. } => ErrorCode::FavouriteNotFound,
            AppError::Duplicate { .. } => ErrorCode::Conflict,
            AppError::RateLimited => ErrorCode::RateLimited,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::Upstream { .. } => ErrorCode::UpstreamError,
            AppError::HttpClient(_) => ErrorCode::UpstreamError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. }
            | AppError::MissingField { .. }
            | AppError::InvalidFormat { .. }
            | AppError::InvalidPagination
            | AppError::UnknownProvider { .. }
            | AppError::PageOutOfRange { .. } => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            AppError::Unauthorized { .. } | AppError::ExpiredToken => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,

            // 404 Not Found
            AppError::NotFound { .. }
            | AppError::ExhibitionNotFound { .. }
            | AppError::FavouriteNotFound { .. } => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::Duplicate { .. } => StatusCode::CONFLICT,

            // 429 Too Many Requests
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            AppError::Database(_)
            | AppError::DatabaseConnection { .. }
            | AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::Upstream { .. } | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Message safe to show to the caller.
    ///
    /// Client errors carry their own short message. Server errors only expose
    /// the message of `Internal`, which is set at the route boundary.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal { message } => message.clone(),
            e if e.is_server_error() => GENERIC_SERVER_ERROR.to_string(),
            e => e.to_string(),
        }
    }

    /// Replace a server-side failure with a short public message.
    ///
    /// Client errors are returned unchanged; anything else is logged with its
    /// full detail and becomes `Internal { message: public }`.
    pub fn or_public(self, public: &str) -> AppError {
        if self.is_client_error() {
            return self;
        }

        tracing::error!(
            error = %self,
            code = ?self.code(),
            public = public,
            "Request failed"
        );

        AppError::Internal {
            message: public.to_string(),
        }
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: ErrorCode,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %self,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %self,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            error: self.public_message(),
            code,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        let sql_err = err.sql_err();
        from_db_error(err, sql_err)
    }
}

/// Classify a database error by its SQL-level cause.
///
/// Constraint names stay in the logs.
fn from_db_error(err: sea_orm::DbErr, sql_err: Option<SqlErr>) -> AppError {
    match sql_err {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!(detail = %detail, "Unique constraint violation");
            AppError::Duplicate {
                message: DUPLICATE_MESSAGE.to_string(),
            }
        }
        _ => AppError::Database(err),
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        tracing::debug!(error = %err, "Request validation failed");

        let field = err.field_errors().keys().min().map(|f| f.to_string());
        let message = match &field {
            Some(field) => format!("Invalid {}", field.replace('_', " ")),
            None => "Invalid request".to_string(),
        };

        AppError::Validation { message, field }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        AppError::InvalidFormat {
            message: "Invalid request body".to_string(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected path parameter");
        AppError::InvalidFormat {
            message: "Invalid path parameter".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::ExhibitionNotFound { id: "test".into() };
        assert_eq!(err.code(), ErrorCode::ExhibitionNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_pagination_errors_are_client_errors() {
        for err in [
            AppError::InvalidPagination,
            AppError::UnknownProvider { provider: "louvre".into() },
            AppError::PageOutOfRange { page: 5, total_pages: 3 },
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert!(err.is_client_error());
        }

        let err = AppError::PageOutOfRange { page: 5, total_pages: 3 };
        assert_eq!(err.public_message(), "Page number out of range");
    }

    #[test]
    fn test_server_error_is_masked() {
        let err = AppError::Upstream {
            service: "aic".into(),
            message: "503 Service Unavailable: <html>...".into(),
        };
        assert!(err.is_server_error());
        assert_eq!(err.public_message(), GENERIC_SERVER_ERROR);

        let masked = err.or_public("Failed to fetch artworks");
        assert_eq!(masked.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(masked.public_message(), "Failed to fetch artworks");
    }

    #[test]
    fn test_or_public_keeps_client_errors() {
        let err = AppError::InvalidPagination.or_public("Failed to fetch artworks");
        assert_eq!(err.code(), ErrorCode::InvalidPagination);
        assert_eq!(err.public_message(), "Invalid page or limit parameter");
    }

    #[test]
    fn test_validation_error() {
        let err = AppError::Validation {
            message: "Invalid name".into(),
            field: Some("name".into()),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.is_server_error());
        assert!(err.is_client_error());
    }

    #[test]
    fn test_unique_violation_hides_constraint_detail() {
        let detail = "duplicate key value violates unique constraint \"favourites_user_id_object_id_key\"";
        let err = from_db_error(
            sea_orm::DbErr::Custom(detail.into()),
            Some(SqlErr::UniqueConstraintViolation(detail.into())),
        );

        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.public_message(), DUPLICATE_MESSAGE);
    }

    #[test]
    fn test_other_database_errors_are_masked() {
        let err = AppError::from(sea_orm::DbErr::Custom("connection refused".into()));

        assert_eq!(err.code(), ErrorCode::DatabaseError);
        assert_eq!(err.public_message(), GENERIC_SERVER_ERROR);
    }

    #[test]
    fn test_validation_errors_get_short_message() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("display_name", validator::ValidationError::new("length"));

        let err = AppError::from(errors);
        assert_eq!(err.public_message(), "Invalid display name");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
