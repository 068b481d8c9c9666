//! CaptionFlow Error Definitions
//!
//! Defines error types used throughout the engine.

use thiserror::Error;

use super::CaptionId;
use crate::core::captions::ParseError;

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Caption Errors
    // =========================================================================
    #[error("Caption not found: {0}")]
    NotFound(CaptionId),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Import/Export Errors
    // =========================================================================
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Convert to a user-friendly error message for the UI layer
    pub fn to_ipc_error(&self) -> String {
        self.to_string()
    }
}
