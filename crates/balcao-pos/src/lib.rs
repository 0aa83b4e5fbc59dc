//! # balcao-pos: Counter Engines for Balcão POS
//!
//! The operations layer of the system: everything an operator does at
//! the counter goes through one of the four engines in this crate.
//!
//! ## Architecture Position
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  UI / report collaborators (out of scope for this workspace)  │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼────────────────────────────────┐
//! │  ★ balcao-pos (THIS CRATE) ★                                  │
//! │    InventoryManager   catalog and stock levels                │
//! │    SalesEngine        cash and credit tickets                 │
//! │    CashSessionManager drawer open / move / close              │
//! │    ReceivablesTracker store credit to settlement              │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼────────────────────────────────┐
//! │  balcao-core (validation, money, types)                       │
//! │  balcao-db   (SQLite ledger store)                            │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Engine Contract
//! Every engine method follows the same shape:
//! 1. Validate input with balcao-core - failures guarantee no side
//!    effects.
//! 2. For read-modify-write spans, take the store write lock.
//! 3. Commit multi-row writes in one SQLite transaction.
//!
//! The engines are cheap to clone and share one [`Ledger`]
//! (`balcao_db::Ledger`) handle.
//!
//! ## Example
//! ```rust,ignore
//! let ledger = Ledger::new(StoreConfig::new("./balcao.db")).await?;
//!
//! let inventory = InventoryManager::new(ledger.clone());
//! let sales = SalesEngine::new(ledger.clone());
//! let cash = CashSessionManager::new(ledger.clone());
//!
//! inventory.add_product("Coffee", 100, Money::from_cents(350), Some("Drinks"), None).await?;
//! cash.open_session(Money::from_cents(10_000), "Ana", None).await?;
//! sales.sell_cash("coffee", 2, Money::from_cents(350), None, None).await?;
//! let (session, discrepancy) = cash.close_session(Money::from_cents(10_700), "Ana", None).await?;
//! ```

pub mod cash;
pub mod error;
pub mod inventory;
pub mod receivables;
pub mod sales;

pub use cash::CashSessionManager;
pub use error::{PosError, PosResult};
pub use inventory::InventoryManager;
pub use receivables::{PendingReceivable, ReceivablesTracker};
pub use sales::{SalesEngine, StockPolicy};

pub use balcao_db::{Ledger, StoreConfig};
