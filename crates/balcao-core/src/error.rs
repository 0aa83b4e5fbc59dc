//! # Validation Errors
//!
//! Input validation failures for balcao-core.
//!
//! These are the `InvalidInput` half of the system's error taxonomy; the
//! engines in balcao-pos wrap them together with store and state errors.
//! Validation always runs before any mutation, so a `ValidationError`
//! guarantees nothing was written.
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, bounds)
//! 3. Errors are enum variants, never String blobs

use thiserror::Error;

/// Input validation errors.
///
/// Raised when operator input doesn't meet the business rules, before
/// any business logic runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be greater than zero")]
    MustBePositive { field: &'static str },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    MustBeNonNegative { field: &'static str },

    /// Invalid format (e.g. malformed date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: String,
    },
}

/// Convenience type alias for validation results.
pub type ValidationResult<T> = Result<T, ValidationError>;
