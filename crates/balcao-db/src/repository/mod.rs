//! # Repository Module
//!
//! One repository per entity kind. This is the typed-row boundary of
//! the system: every row leaves the store as one of the balcao-core
//! structs, never as a positional tuple.
//!
//! ## Two Call Forms
//! ```text
//! repo.get("Coffee")                      convenience, runs on the pool
//! ProductRepository::get_with(&mut *tx, "Coffee")
//!                                         executor form, composes into a
//!                                         caller-owned transaction
//! ```
//! The engines in balcao-pos use the `*_with` form whenever several
//! writes must commit together (sale + stock update, session +
//! opening movement, ...). SQL lives only in this module.
//!
//! ## Available Repositories
//! - [`product::ProductRepository`] - catalog rows
//! - [`sale::SaleRepository`] - append-only cash-sale ledger
//! - [`receivable::ReceivableRepository`] - store-credit entries
//! - [`cash::CashRepository`] - sessions and drawer movements
//! - [`settings::SettingsRepository`] - persisted key/value settings

pub mod cash;
pub mod product;
pub mod receivable;
pub mod sale;
pub mod settings;
