//! # Receivable Repository
//!
//! Store-credit entries: created by the sales engine on a credit sale,
//! mutated only by settlement, removed only by the explicit
//! administrative delete.
//!
//! Settlement is expressed as a conditional UPDATE (`... AND settled =
//! 0`) so the flag and its timestamp flip together exactly once; a
//! repeat attempt affects zero rows and the tracker reports it as a
//! no-op.

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::StoreResult;
use balcao_core::Receivable;

const RECEIVABLE_COLUMNS: &str = "id, customer_name, customer_phone, product, quantity, \
     unit_price, total, sold_at, due_date, settled, settled_at, notes";

/// Repository for store-credit entries.
#[derive(Debug, Clone)]
pub struct ReceivableRepository {
    pool: SqlitePool,
}

impl ReceivableRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReceivableRepository { pool }
    }

    /// Inserts a credit entry, ignoring `entry.id`, and returns the
    /// assigned sequence number.
    pub async fn insert(&self, entry: &Receivable) -> StoreResult<i64> {
        Self::insert_with(&self.pool, entry).await
    }

    /// Executor form of [`insert`](Self::insert); the sales engine
    /// writes the entry and the stock update in one transaction.
    pub async fn insert_with<'e, E>(executor: E, entry: &Receivable) -> StoreResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(
            customer = %entry.customer_name,
            product = %entry.product,
            total = %entry.total,
            "Recording store-credit entry"
        );

        let result = sqlx::query(
            "INSERT INTO receivables
                 (customer_name, customer_phone, product, quantity, unit_price,
                  total, sold_at, due_date, settled, settled_at, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&entry.customer_name)
        .bind(&entry.customer_phone)
        .bind(&entry.product)
        .bind(entry.quantity)
        .bind(entry.unit_price)
        .bind(entry.total)
        .bind(entry.sold_at)
        .bind(entry.due_date)
        .bind(entry.settled)
        .bind(entry.settled_at)
        .bind(&entry.notes)
        .execute(executor)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Gets one entry by sequence number.
    pub async fn get(&self, id: i64) -> StoreResult<Option<Receivable>> {
        let entry = sqlx::query_as::<_, Receivable>(&format!(
            "SELECT {RECEIVABLE_COLUMNS} FROM receivables WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Flips an unsettled entry to settled, stamping the settlement
    /// time. Returns false when the entry was already settled (or the
    /// id doesn't exist - callers distinguish via [`get`](Self::get)).
    pub async fn mark_settled(&self, id: i64, settled_at: DateTime<Utc>) -> StoreResult<bool> {
        debug!(id, "Settling receivable");

        let result = sqlx::query(
            "UPDATE receivables SET settled = 1, settled_at = ?2
             WHERE id = ?1 AND settled = 0",
        )
        .bind(id)
        .bind(settled_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Unsettled entries, earliest due date first. Open-ended entries
    /// (no due date) sort last.
    pub async fn list_pending(&self) -> StoreResult<Vec<Receivable>> {
        let entries = sqlx::query_as::<_, Receivable>(&format!(
            "SELECT {RECEIVABLE_COLUMNS} FROM receivables
             WHERE settled = 0
             ORDER BY due_date IS NULL, due_date, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Settled entries, most recently settled first.
    pub async fn list_settled(&self) -> StoreResult<Vec<Receivable>> {
        let entries = sqlx::query_as::<_, Receivable>(&format!(
            "SELECT {RECEIVABLE_COLUMNS} FROM receivables
             WHERE settled = 1
             ORDER BY settled_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Every entry, pending first, newest sale first within each group.
    pub async fn list_all(&self) -> StoreResult<Vec<Receivable>> {
        let entries = sqlx::query_as::<_, Receivable>(&format!(
            "SELECT {RECEIVABLE_COLUMNS} FROM receivables
             ORDER BY settled, sold_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Physically removes an entry regardless of settlement state.
    /// Administrative override only; returns false when absent.
    pub async fn delete(&self, id: i64) -> StoreResult<bool> {
        debug!(id, "Deleting receivable (administrative)");

        let result = sqlx::query("DELETE FROM receivables WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
