//! # Cash Repository
//!
//! Sessions and drawer movements.
//!
//! The session row carries running `withdrawal_total` / `deposit_total`
//! columns so the theoretical balance never needs a movement scan; the
//! movements table is the append-only audit trail behind those totals.
//! Every mutating statement here is the executor form: the session
//! manager always pairs a session update with its movement row in one
//! transaction.
//!
//! The "at most one open session" rule is not a schema constraint; the
//! session manager enforces it under the store write lock before
//! inserting.

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::StoreResult;
use balcao_core::{CashMovement, CashSession, Money};

const SESSION_COLUMNS: &str = "id, opened_at, closed_at, opening_float, withdrawal_total, \
     deposit_total, counted, operator, status, notes";

const MOVEMENT_COLUMNS: &str = "id, session_id, kind, amount, description, recorded_at, operator";

/// Repository for cash sessions and their movement audit trail.
#[derive(Debug, Clone)]
pub struct CashRepository {
    pool: SqlitePool,
}

impl CashRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CashRepository { pool }
    }

    /// Inserts a session row, ignoring `session.id`, and returns the
    /// assigned sequence number.
    pub async fn insert_session_with<'e, E>(executor: E, session: &CashSession) -> StoreResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(
            operator = %session.operator,
            opening_float = %session.opening_float,
            "Opening cash session"
        );

        let result = sqlx::query(
            "INSERT INTO cash_sessions
                 (opened_at, closed_at, opening_float, withdrawal_total, deposit_total,
                  counted, operator, status, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(session.opened_at)
        .bind(session.closed_at)
        .bind(session.opening_float)
        .bind(session.withdrawal_total)
        .bind(session.deposit_total)
        .bind(session.counted)
        .bind(&session.operator)
        .bind(session.status)
        .bind(&session.notes)
        .execute(executor)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Gets one session by sequence number.
    pub async fn get(&self, id: i64) -> StoreResult<Option<CashSession>> {
        let session = sqlx::query_as::<_, CashSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM cash_sessions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// The currently open session, if any.
    pub async fn find_open(&self) -> StoreResult<Option<CashSession>> {
        Self::find_open_with(&self.pool).await
    }

    /// Executor form of [`find_open`](Self::find_open); the session
    /// manager checks for an open session inside the transaction that
    /// would open a new one.
    pub async fn find_open_with<'e, E>(executor: E) -> StoreResult<Option<CashSession>>
    where
        E: SqliteExecutor<'e>,
    {
        let session = sqlx::query_as::<_, CashSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM cash_sessions WHERE status = 'OPEN' ORDER BY id DESC"
        ))
        .fetch_optional(executor)
        .await?;

        Ok(session)
    }

    /// Adds to the open session's withdrawal total. Returns false when
    /// the session is missing or already closed.
    pub async fn add_withdrawal_with<'e, E>(
        executor: E,
        session_id: i64,
        amount: Money,
    ) -> StoreResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(session_id, amount = %amount, "Recording withdrawal");

        let result = sqlx::query(
            "UPDATE cash_sessions SET withdrawal_total = withdrawal_total + ?2
             WHERE id = ?1 AND status = 'OPEN'",
        )
        .bind(session_id)
        .bind(amount)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Adds to the open session's deposit total. Returns false when
    /// the session is missing or already closed.
    pub async fn add_deposit_with<'e, E>(
        executor: E,
        session_id: i64,
        amount: Money,
    ) -> StoreResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(session_id, amount = %amount, "Recording deposit");

        let result = sqlx::query(
            "UPDATE cash_sessions SET deposit_total = deposit_total + ?2
             WHERE id = ?1 AND status = 'OPEN'",
        )
        .bind(session_id)
        .bind(amount)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Closes an open session, recording the counted amount. Returns
    /// false when the session is missing or already closed.
    pub async fn close_with<'e, E>(
        executor: E,
        session_id: i64,
        counted: Money,
        closed_at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> StoreResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(session_id, counted = %counted, "Closing cash session");

        let result = sqlx::query(
            "UPDATE cash_sessions
             SET closed_at = ?2, counted = ?3, status = 'CLOSED',
                 notes = COALESCE(?4, notes)
             WHERE id = ?1 AND status = 'OPEN'",
        )
        .bind(session_id)
        .bind(closed_at)
        .bind(counted)
        .bind(notes)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Appends a movement to the audit trail and returns its sequence
    /// number.
    pub async fn insert_movement_with<'e, E>(
        executor: E,
        movement: &CashMovement,
    ) -> StoreResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            "INSERT INTO cash_movements
                 (session_id, kind, amount, description, recorded_at, operator)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(movement.session_id)
        .bind(movement.kind)
        .bind(movement.amount)
        .bind(&movement.description)
        .bind(movement.recorded_at)
        .bind(&movement.operator)
        .execute(executor)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// A session's movements, in the order they were recorded.
    pub async fn movements(&self, session_id: i64) -> StoreResult<Vec<CashMovement>> {
        let movements = sqlx::query_as::<_, CashMovement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM cash_movements
             WHERE session_id = ?1
             ORDER BY id"
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Every session, newest first.
    pub async fn list_sessions(&self) -> StoreResult<Vec<CashSession>> {
        let sessions = sqlx::query_as::<_, CashSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM cash_sessions ORDER BY id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }
}
