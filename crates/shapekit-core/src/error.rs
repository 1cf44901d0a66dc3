//! Error handling for ShapeKit
//!
//! Provides the error type surfaced by the shape engine: degenerate
//! transforms, unusable paths and mode violations.
//!
//! Uses `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Shape geometry error type
///
/// Geometry queries fail fast with one of these rather than clamping.
/// Mutations such as flips or zero scales never produce them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// The inverse of a degenerate (zero-determinant) transform was requested
    #[error("Transform is singular (determinant {determinant})")]
    SingularTransform {
        /// Determinant of the linear part of the transform.
        determinant: f64,
    },

    /// An adopted or pasted path is empty or degenerate
    #[error("Invalid path: {reason}")]
    InvalidPath {
        /// Why the path was rejected.
        reason: String,
    },

    /// A distort-only operation was invoked in the wrong operation mode
    #[error("Operation '{operation}' is not supported in {mode} mode")]
    UnsupportedOperationMode {
        /// The rejected operation.
        operation: String,
        /// The operation mode that was active.
        mode: String,
    },

    /// A part code outside the known handle table
    #[error("Unknown part code: {0}")]
    UnknownPartCode(i32),

    /// Path data could not be parsed
    #[error("Path data error: {reason}")]
    PathParse {
        /// The reason parsing failed.
        reason: String,
    },
}

impl ShapeError {
    /// Shorthand for an [`ShapeError::InvalidPath`] error.
    pub fn invalid_path(reason: impl Into<String>) -> Self {
        ShapeError::InvalidPath {
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`ShapeError::UnsupportedOperationMode`] error.
    pub fn unsupported_mode(operation: impl Into<String>, mode: impl ToString) -> Self {
        ShapeError::UnsupportedOperationMode {
            operation: operation.into(),
            mode: mode.to_string(),
        }
    }

    /// Check if this is a singular transform error
    pub fn is_singular(&self) -> bool {
        matches!(self, ShapeError::SingularTransform { .. })
    }
}

/// Result type for shape geometry operations.
pub type ShapeResult<T> = std::result::Result<T, ShapeError>;
