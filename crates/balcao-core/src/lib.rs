//! # balcao-core: Pure Business Logic for Balcão POS
//!
//! This crate is the heart of the system. It contains the domain types and
//! business rules for a single-store food-service counter as pure, I/O-free
//! code.
//!
//! ## Architecture Position
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  UI / report collaborators (out of scope for this workspace)  │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼────────────────────────────────┐
//! │  balcao-pos: InventoryManager, SalesEngine,                   │
//! │              CashSessionManager, ReceivablesTracker           │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼────────────────────────────────┐
//! │  ★ balcao-core (THIS CRATE) ★                                 │
//! │    money • types • validation                                 │
//! │    NO I/O • NO DATABASE • PURE FUNCTIONS                      │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼────────────────────────────────┐
//! │  balcao-db: SQLite ledger store (schema, repositories)        │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entity types (Product, SaleRecord, Receivable, CashSession,
//!   CashMovement)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Input validation errors
//! - [`validation`] - Name normalization and business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: same input, same output, no side effects
//! 2. **Integer money**: all monetary values are cents (i64)
//! 3. **Value snapshots**: sale and receivable rows capture quantity and
//!    unit price at write time; later product edits never rewrite history
//! 4. **Explicit errors**: typed errors, never strings or panics

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

pub use error::ValidationError;
pub use money::Money;
pub use types::*;

/// Default product category when the operator leaves it blank.
///
/// Matches the catch-all bucket the store actually uses; callers can
/// always pass an explicit category.
pub const DEFAULT_CATEGORY: &str = "General";
