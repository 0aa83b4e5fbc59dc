//! # Storage Error Types
//!
//! Error types for ledger-store operations.
//!
//! ## Error Flow
//! ```text
//! SQLite error (sqlx::Error)
//!      │
//!      ▼
//! StoreError (this module)  ← adds context and categorization
//!      │
//!      ▼
//! PosError::Storage (balcao-pos)  ← what callers of the engines see
//! ```

use thiserror::Error;

/// Ledger-store operation errors.
///
/// Wraps sqlx errors with enough context for the UI to render an
/// actionable message. A `StoreError` mid-operation always aborts the
/// surrounding transaction, so no half-applied writes leak out.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Row expected but not present.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Unique constraint violation (e.g. duplicate product name).
    #[error("duplicate {field}: already exists")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database file could not be opened or created (permissions,
    /// disk full, corruption).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// In-place schema upgrade failed.
    #[error("schema upgrade failed: {0}")]
    SchemaUpgradeFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Anything else from the storage layer.
    #[error("internal storage error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and key.
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            key: key.into(),
        }
    }
}

/// Convert sqlx errors to StoreError.
///
/// SQLite reports constraint failures only through the message text:
/// `UNIQUE constraint failed: <table>.<column>` and
/// `FOREIGN KEY constraint failed`.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity: "record",
                key: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    StoreError::UniqueViolation { field }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    StoreError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    StoreError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,

            sqlx::Error::PoolClosed => {
                StoreError::ConnectionFailed("pool is closed".to_string())
            }

            _ => StoreError::Internal(err.to_string()),
        }
    }
}

/// Result type for ledger-store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message() {
        let err = StoreError::not_found("product", "Coffee");
        assert_eq!(err.to_string(), "product not found: Coffee");
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
