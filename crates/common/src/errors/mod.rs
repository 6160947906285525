//! Error types for the attendance desk
//!
//! Provides:
//! - Distinct error types for backend, validation and local failures
//! - HTTP status code mapping for the page host
//! - Structured error responses
//! - Error codes for client handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,

    // Resource errors (4xxx)
    NotFound,

    // Upstream errors (8xxx)
    UpstreamStatus,
    UpstreamUnreachable,
    UpstreamPayload,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::NotFound => 4001,
            ErrorCode::UpstreamStatus => 8001,
            ErrorCode::UpstreamUnreachable => 8002,
            ErrorCode::UpstreamPayload => 8003,
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Backend answered with a non-2xx status; the body is not inspected
    #[error("HTTP error! status: {status}")]
    Request { status: u16 },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {message}")]
    Decode { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Client-side validation, raised before any request is made
    #[error("{message}")]
    Validation { message: String },

    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation { message: message.into() }
    }

    pub fn not_found(resource_type: &str, id: impl ToString) -> Self {
        AppError::NotFound {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Request { .. } => ErrorCode::UpstreamStatus,
            AppError::Transport(_) => ErrorCode::UpstreamUnreachable,
            AppError::Decode { .. } => ErrorCode::UpstreamPayload,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code the page host answers with
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,

            AppError::Request { .. } |
            AppError::Transport(_) |
            AppError::Decode { .. } => StatusCode::BAD_GATEWAY,

            AppError::Serialization(_) |
            AppError::Configuration { .. } |
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Status reported by the backend, if it answered at all
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AppError::Request { status } => Some(*status),
            AppError::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// True when the backend reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        self.upstream_status() == Some(404)
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for the page host
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                upstream_status: self.upstream_status(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_error_display() {
        let err = AppError::Request { status: 500 };
        assert_eq!(err.to_string(), "HTTP error! status: 500");
        assert_eq!(err.code(), ErrorCode::UpstreamStatus);
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_detection() {
        assert!(AppError::Request { status: 404 }.is_not_found());
        assert!(AppError::not_found("aluno", 7).is_not_found());
        assert!(!AppError::validation("Selecione uma turma!").is_not_found());
    }

    #[test]
    fn test_validation_error() {
        let err = AppError::validation("Selecione aluno e disciplina!");
        assert_eq!(err.to_string(), "Selecione aluno e disciplina!");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_server_error() {
        let err = AppError::Internal {
            message: "lock poisoned".into(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_server_error());
        assert_eq!(err.code().as_code(), 9001);
    }
}
