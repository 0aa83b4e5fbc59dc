//! # Cash Session Manager
//!
//! The drawer state machine: open, move cash, close.
//!
//! ## Reconciliation
//! ```text
//! theoretical = opening_float + cash revenue - withdrawals + deposits
//! discrepancy = counted - theoretical
//! ```
//! Cash revenue is the sum of cash-sale totals timestamped within the
//! session window; credit sales never count. The discrepancy is
//! reported and recorded, never corrected.
//!
//! ## One Open Session
//! At most one session is open at any time. The check and the insert
//! run under the store write lock in one transaction, so two
//! concurrent opens can never both succeed.

use chrono::Utc;
use tracing::info;

use balcao_core::validation::{
    validate_counted_amount, validate_movement_amount, validate_opening_float,
};
use balcao_core::{CashMovement, CashSession, Money, MovementKind, SessionStatus};
use balcao_db::{CashRepository, Ledger, SaleRepository};

use crate::error::{PosError, PosResult};

/// Drawer session engine.
#[derive(Debug, Clone)]
pub struct CashSessionManager {
    ledger: Ledger,
}

impl CashSessionManager {
    pub fn new(ledger: Ledger) -> Self {
        CashSessionManager { ledger }
    }

    /// Opens a session with the given float, recording an `Opening`
    /// movement. Fails with [`PosError::SessionAlreadyOpen`] while a
    /// previous session is still open.
    pub async fn open_session(
        &self,
        opening_float: Money,
        operator: &str,
        notes: Option<String>,
    ) -> PosResult<CashSession> {
        validate_opening_float(opening_float.cents())?;

        let _guard = self.ledger.write_guard().await;
        let mut tx = self.ledger.pool().begin().await?;

        if let Some(open) = CashRepository::find_open_with(&mut *tx).await? {
            return Err(PosError::SessionAlreadyOpen { id: open.id });
        }

        let mut session = CashSession {
            id: 0,
            opened_at: Utc::now(),
            closed_at: None,
            opening_float,
            withdrawal_total: Money::zero(),
            deposit_total: Money::zero(),
            counted: None,
            operator: operator.to_string(),
            status: SessionStatus::Open,
            notes,
        };
        session.id = CashRepository::insert_session_with(&mut *tx, &session).await?;

        let opening = CashMovement {
            id: 0,
            session_id: session.id,
            kind: MovementKind::Opening,
            amount: opening_float,
            description: None,
            recorded_at: session.opened_at,
            operator: operator.to_string(),
        };
        CashRepository::insert_movement_with(&mut *tx, &opening).await?;

        tx.commit().await?;

        info!(id = session.id, float = %opening_float, operator, "Session opened");
        Ok(session)
    }

    /// Records cash taken out of the drawer mid-session.
    pub async fn record_withdrawal(
        &self,
        amount: Money,
        description: Option<String>,
        operator: &str,
    ) -> PosResult<CashMovement> {
        self.record_movement(MovementKind::Withdrawal, amount, description, operator)
            .await
    }

    /// Records cash added to the drawer mid-session.
    pub async fn record_deposit(
        &self,
        amount: Money,
        description: Option<String>,
        operator: &str,
    ) -> PosResult<CashMovement> {
        self.record_movement(MovementKind::Deposit, amount, description, operator)
            .await
    }

    /// The balance the open (or closed) session's drawer should hold
    /// right now, from the recorded movements and the session-window
    /// cash revenue.
    pub async fn theoretical_balance(&self, session: &CashSession) -> PosResult<Money> {
        let window_end = session.closed_at.unwrap_or_else(Utc::now);
        let revenue = self
            .ledger
            .sales()
            .revenue_between(session.opened_at, window_end)
            .await?;

        Ok(session.theoretical_balance(revenue))
    }

    /// Closes the open session against a physically counted amount.
    ///
    /// Returns the closed session and the discrepancy
    /// (`counted - theoretical`; positive is surplus cash). A
    /// `Closing` movement carrying the counted amount completes the
    /// audit trail.
    pub async fn close_session(
        &self,
        counted: Money,
        operator: &str,
        notes: Option<String>,
    ) -> PosResult<(CashSession, Money)> {
        validate_counted_amount(counted.cents())?;

        let _guard = self.ledger.write_guard().await;
        let mut tx = self.ledger.pool().begin().await?;

        let session = CashRepository::find_open_with(&mut *tx)
            .await?
            .ok_or(PosError::NoOpenSession)?;

        let closed_at = Utc::now();
        let revenue =
            SaleRepository::revenue_between_with(&mut *tx, session.opened_at, closed_at).await?;
        let discrepancy = session.discrepancy(counted, revenue);

        CashRepository::close_with(&mut *tx, session.id, counted, closed_at, notes.as_deref())
            .await?;

        let closing = CashMovement {
            id: 0,
            session_id: session.id,
            kind: MovementKind::Closing,
            amount: counted,
            description: None,
            recorded_at: closed_at,
            operator: operator.to_string(),
        };
        CashRepository::insert_movement_with(&mut *tx, &closing).await?;

        tx.commit().await?;

        info!(
            id = session.id,
            counted = %counted,
            discrepancy = %discrepancy,
            "Session closed"
        );

        let closed = self
            .ledger
            .cash()
            .get(session.id)
            .await?
            .ok_or_else(|| PosError::Storage(balcao_db::StoreError::not_found(
                "cash_session",
                session.id.to_string(),
            )))?;
        Ok((closed, discrepancy))
    }

    /// The open session, if any.
    pub async fn current_session(&self) -> PosResult<Option<CashSession>> {
        Ok(self.ledger.cash().find_open().await?)
    }

    /// A session's audit trail, in recording order.
    pub async fn movements(&self, session_id: i64) -> PosResult<Vec<CashMovement>> {
        Ok(self.ledger.cash().movements(session_id).await?)
    }

    /// Every session, newest first.
    pub async fn list_sessions(&self) -> PosResult<Vec<CashSession>> {
        Ok(self.ledger.cash().list_sessions().await?)
    }

    async fn record_movement(
        &self,
        kind: MovementKind,
        amount: Money,
        description: Option<String>,
        operator: &str,
    ) -> PosResult<CashMovement> {
        validate_movement_amount(amount.cents())?;

        let _guard = self.ledger.write_guard().await;
        let mut tx = self.ledger.pool().begin().await?;

        let session = CashRepository::find_open_with(&mut *tx)
            .await?
            .ok_or(PosError::NoOpenSession)?;

        match kind {
            MovementKind::Withdrawal => {
                CashRepository::add_withdrawal_with(&mut *tx, session.id, amount).await?;
            }
            MovementKind::Deposit => {
                CashRepository::add_deposit_with(&mut *tx, session.id, amount).await?;
            }
            // Opening/Closing movements are written by open/close.
            MovementKind::Opening | MovementKind::Closing => unreachable!(),
        }

        let mut movement = CashMovement {
            id: 0,
            session_id: session.id,
            kind,
            amount,
            description,
            recorded_at: Utc::now(),
            operator: operator.to_string(),
        };
        movement.id = CashRepository::insert_movement_with(&mut *tx, &movement).await?;

        tx.commit().await?;

        info!(session = session.id, kind = ?kind, amount = %amount, "Drawer movement");
        Ok(movement)
    }
}
