//! Engine-level errors.
//!
//! Validation and storage failures wrap the lower-crate types; the
//! variants above them are the business rules only the engines can
//! check (duplicate products, closed drawers, settled receivables).

use thiserror::Error;

use balcao_core::ValidationError;
use balcao_db::StoreError;

/// Errors surfaced by the counter engines.
#[derive(Debug, Error)]
pub enum PosError {
    /// No active product with that (normalized) name.
    #[error("product not found: {name}")]
    ProductNotFound { name: String },

    /// The name is already taken, by an active or retired product.
    #[error("product already exists: {name}")]
    DuplicateProduct { name: String },

    /// Strict stock policy refused a sale that would go negative.
    #[error("insufficient stock for {name}: {available} on hand, {requested} requested")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// No receivable with that sequence number.
    #[error("receivable not found: {id}")]
    ReceivableNotFound { id: i64 },

    /// Tried to open a drawer session while one is already open.
    #[error("cash session {id} is already open")]
    SessionAlreadyOpen { id: i64 },

    /// Drawer operation with no open session to apply it to.
    #[error("no open cash session")]
    NoOpenSession,

    /// Input failed a business rule before any mutation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The ledger store failed underneath.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl From<sqlx::Error> for PosError {
    fn from(err: sqlx::Error) -> Self {
        PosError::Storage(StoreError::from(err))
    }
}

pub type PosResult<T> = Result<T, PosError>;
