//! # balcao-db: Ledger Store for Balcão POS
//!
//! Durable record-keeper for the five entity kinds of the ledger:
//! products, sale records, receivables, cash sessions and their
//! movements (plus a small persisted settings table).
//!
//! ## Data Flow
//! ```text
//! balcao-pos engine call
//!      │
//!      ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  balcao-db (THIS CRATE)                     │
//! │                                                             │
//! │   ┌───────────┐    ┌──────────────┐    ┌───────────────┐   │
//! │   │  Ledger   │    │ Repositories │    │    Schema     │   │
//! │   │(store.rs) │◄───│ product.rs   │    │ (create + in- │   │
//! │   │ pool +    │    │ sale.rs ...  │    │ place column  │   │
//! │   │ write lock│    │              │    │ upgrades)     │   │
//! │   └───────────┘    └──────────────┘    └───────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//!      │
//!      ▼
//! SQLite database file (WAL mode)
//! ```
//!
//! ## Durability Contract
//! Every write is committed before the call returns; nothing is
//! buffered across calls. Any storage failure surfaces as a
//! [`StoreError`] - no operation silently drops data.
//!
//! ## Module Organization
//! - [`store`] - pool configuration, the [`Ledger`](store::Ledger)
//!   handle and its single-writer lock
//! - [`schema`] - table creation and idempotent in-place upgrades
//! - [`error`] - storage error types
//! - [`repository`] - typed repositories, one per entity kind

pub mod error;
pub mod repository;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{Ledger, StoreConfig};

pub use repository::cash::CashRepository;
pub use repository::product::ProductRepository;
pub use repository::receivable::ReceivableRepository;
pub use repository::sale::{ProductSalesStats, SaleRepository};
pub use repository::settings::SettingsRepository;
