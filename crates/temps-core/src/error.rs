//! Common error types used across all Temps services

use thiserror::Error;

/// Common service error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    /// Whether the caller can recover by fixing its input or the stored configuration
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ServiceError::NotFound { .. }
                | ServiceError::Validation { .. }
                | ServiceError::Configuration { .. }
        )
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
