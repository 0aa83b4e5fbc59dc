//! # Domain Types
//!
//! The five entity kinds of the ledger, as typed records.
//!
//! ## Type Hierarchy
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  Product        catalog row, mutated by the inventory manager     │
//! │  SaleRecord     append-only cash sale, immutable once written     │
//! │  Receivable     store-credit sale, mutated only by settlement     │
//! │  CashSession    one interval of drawer custody (OPEN → CLOSED)    │
//! │  CashMovement   append-only drawer movement within a session      │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Identity Pattern
//! Sale and receivable rows reference a product **by name, by value**.
//! They capture the unit price and quantity at the moment of sale, so a
//! later price change or product retirement never rewrites history.
//!
//! The rows decode straight from the store as these structs (via the
//! optional `sqlx` feature); downstream code never sees positional
//! tuples.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Status Enums
// =============================================================================

/// Lifecycle state of a cash session. Persisted as uppercase TEXT.
///
/// Global invariant: at most one session is `Open` at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Open,
    Closed,
}

/// Kind of a cash-drawer movement. Persisted as uppercase TEXT.
///
/// `Opening` and `Closing` record the opening float and the counted
/// closing amount respectively; `Withdrawal` and `Deposit` are the
/// manual mid-session movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementKind {
    Opening,
    Withdrawal,
    Deposit,
    Closing,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
///
/// Identity is the **normalized name** (trimmed, title-cased); there is
/// no surrogate key. Quantity on hand and price are never negative.
/// Products referenced by historical sales are retired with
/// `is_active = false`, never physically deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Normalized product name, unique across the catalog.
    pub name: String,
    /// Units on hand. Invariant: `>= 0`.
    pub quantity: i64,
    /// Current unit price. Invariant: non-negative.
    pub price: Money,
    /// Free-text category ("Drinks", "Snacks", ...).
    pub category: String,
    /// Optional barcode for scanner lookups.
    pub barcode: Option<String>,
    /// Logical-delete flag; retired products stay on disk.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale Record
// =============================================================================

/// One cash sale, appended to the sales ledger.
///
/// Immutable once written. `total` is computed as
/// `quantity * unit_price` at write time and never edited afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleRecord {
    /// Auto-incrementing sequence number assigned by the store.
    pub id: i64,
    /// Product name snapshot (by value, not a live reference).
    pub product: String,
    /// Units sold. Invariant: `> 0`.
    pub quantity: i64,
    /// Unit price captured at the time of sale.
    pub unit_price: Money,
    /// `quantity * unit_price`, captured at write time.
    pub total: Money,
    pub sold_at: DateTime<Utc>,
    /// Operator who rang the sale, if recorded.
    pub operator: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Receivable
// =============================================================================

/// A store-credit sale, owed by a named customer until settled.
///
/// Created by the sales engine on a credit sale; mutated only by the
/// settlement operation. Invariant: `settled_at` is set if and only if
/// `settled` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Receivable {
    /// Auto-incrementing sequence number assigned by the store.
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    /// Product name snapshot.
    pub product: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total: Money,
    pub sold_at: DateTime<Utc>,
    /// When payment is due; open-ended credit when absent.
    pub due_date: Option<NaiveDate>,
    pub settled: bool,
    pub settled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Receivable {
    /// Whether this entry is overdue as of the given date: unsettled
    /// and strictly past its due date. Entries without a due date are
    /// never overdue.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        !self.settled && self.due_date.map_or(false, |due| due < as_of)
    }
}

// =============================================================================
// Cash Session
// =============================================================================

/// One continuous interval of cash-drawer custody, open to close.
///
/// The withdrawal/deposit totals are running sums maintained alongside
/// the movement rows; the counted amount stays `None` until close.
/// Sessions are historical records and are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashSession {
    /// Auto-incrementing sequence number assigned by the store.
    pub id: i64,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Cash placed in the drawer at open. Invariant: non-negative.
    pub opening_float: Money,
    /// Accumulated manual withdrawals.
    pub withdrawal_total: Money,
    /// Accumulated manual deposits.
    pub deposit_total: Money,
    /// Physically counted amount, set at close.
    pub counted: Option<Money>,
    pub operator: String,
    pub status: SessionStatus,
    pub notes: Option<String>,
}

impl CashSession {
    /// The balance the drawer *should* contain given the recorded
    /// movements and the cash revenue taken during the session:
    ///
    /// ```text
    /// opening_float + revenue - withdrawals + deposits
    /// ```
    ///
    /// `revenue` is the sum of cash-sale totals timestamped within the
    /// session window; credit sales never enter this figure (no cash
    /// changed hands). The store lookup for `revenue` lives in
    /// balcao-db; this arithmetic stays pure.
    pub fn theoretical_balance(&self, revenue: Money) -> Money {
        self.opening_float + revenue - self.withdrawal_total + self.deposit_total
    }

    /// Counted minus theoretical. Positive means surplus cash in the
    /// drawer, negative means missing cash. Reported, never corrected.
    pub fn discrepancy(&self, counted: Money, revenue: Money) -> Money {
        counted - self.theoretical_balance(revenue)
    }

    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }
}

// =============================================================================
// Cash Movement
// =============================================================================

/// A single recorded change to a cash session's balance.
///
/// Append-only and immutable once written. Amounts are positive for
/// every kind; `Opening`/`Closing` carry the float and counted values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashMovement {
    /// Auto-incrementing sequence number assigned by the store.
    pub id: i64,
    /// Owning session.
    pub session_id: i64,
    pub kind: MovementKind,
    pub amount: Money,
    pub description: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub operator: String,
}
