//! # AppError
//!
//! Centralized error handling for the ThreadSpire ecosystem.
//! Every operation returns one of these kinds; adapters map them to transport codes.

use thiserror::Error;

/// The primary error type for all ts-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or oversized input (e.g., title too long, 21 segments)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Resource not found (e.g., Thread, Segment, Reaction, Collection)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// Caller is not the author/owner of the resource
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The resource is not in a state that allows the operation (e.g., publishing twice)
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A concurrent writer changed the document first
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., DB down, corrupt document)
    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        AppError::NotFound(entity, id.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError(message.into())
    }

    /// Stable machine-readable kind, safe to expose to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::NotFound(..) => "not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::InvalidState(_) => "invalid_state",
            AppError::Conflict(_) => "conflict",
            AppError::Storage(_) => "storage_error",
        }
    }
}

/// A specialized Result type for ThreadSpire logic.
pub type Result<T> = std::result::Result<T, AppError>;
