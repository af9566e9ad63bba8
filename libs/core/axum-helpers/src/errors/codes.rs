//! Type-safe error codes for API responses.
//!
//! This module provides a single source of truth for error codes used across
//! the application. Each error code includes:
//! - String representation for client consumption (e.g., "NOT_FOUND")
//! - Integer code for logging and monitoring (e.g., 1004)
//! - Default human-readable message
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::BadRequest;
//! assert_eq!(code.as_str(), "BAD_REQUEST");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Bad request");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standardized error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request is malformed or refers to something that does not exist
    BadRequest,

    /// Invalid UUID format in path or query parameter
    InvalidUuid,

    /// JSON extraction from request body failed
    JsonExtraction,

    /// Requested resource was not found
    NotFound,

    /// HTTP method is not supported on this route
    MethodNotAllowed,

    // Server errors
    /// An unexpected internal server error occurred
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for client consumption.
    ///
    /// ```rust
    /// use axum_helpers::errors::ErrorCode;
    ///
    /// assert_eq!(ErrorCode::NotFound.as_str(), "NOT_FOUND");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidUuid => "INVALID_UUID",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Get the integer code for logging and monitoring.
    ///
    /// All codes live in the 1000-1999 range.
    pub fn code(&self) -> i32 {
        match self {
            Self::BadRequest => 1001,
            Self::InvalidUuid => 1002,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::MethodNotAllowed => 1010,
        }
    }

    /// Get the default user-facing error message.
    ///
    /// Individual handlers can override these messages with more specific details.
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad request",
            Self::InvalidUuid => "Invalid UUID format",
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::MethodNotAllowed => "The HTTP method is not allowed for this resource",
            Self::InternalError => "An internal server error occurred",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
