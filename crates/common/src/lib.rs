//! Frequencia Common Library
//!
//! Shared code for the attendance desk crates including:
//! - Backend API client abstraction (HTTP and in-memory)
//! - Wire models for classes, subjects, students and attendance
//! - Error types and handling
//! - Configuration management
//! - Request metrics

pub mod api;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod models;

// Re-export commonly used types
pub use crate::api::{create_backend, Backend, HttpBackend, MockBackend};
pub use crate::config::AppConfig;
pub use crate::errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Path prefix of the attendance REST API
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
