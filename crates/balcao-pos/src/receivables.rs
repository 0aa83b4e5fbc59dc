//! # Receivables Tracker
//!
//! Follows store-credit entries from creation (by the sales engine)
//! to settlement. Settlement is idempotent: settling an
//! already-settled entry reports `false` and changes nothing, so a
//! double-tap at the counter is harmless.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use balcao_core::{Money, Receivable};
use balcao_db::Ledger;

use crate::error::{PosError, PosResult};

/// A pending entry with its overdue tag resolved against a reference
/// date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingReceivable {
    pub receivable: Receivable,
    pub overdue: bool,
}

/// Store-credit engine.
#[derive(Debug, Clone)]
pub struct ReceivablesTracker {
    ledger: Ledger,
}

impl ReceivablesTracker {
    pub fn new(ledger: Ledger) -> Self {
        ReceivablesTracker { ledger }
    }

    /// Marks an entry settled, stamping the settlement time.
    ///
    /// Returns `true` on the first settlement and `false` on a repeat;
    /// an unknown id is [`PosError::ReceivableNotFound`].
    pub async fn settle(&self, id: i64) -> PosResult<bool> {
        let _guard = self.ledger.write_guard().await;

        if self.ledger.receivables().mark_settled(id, Utc::now()).await? {
            info!(id, "Receivable settled");
            return Ok(true);
        }

        match self.ledger.receivables().get(id).await? {
            Some(_) => Ok(false), // already settled
            None => Err(PosError::ReceivableNotFound { id }),
        }
    }

    /// Unsettled entries, earliest due date first, each tagged overdue
    /// relative to `as_of`.
    pub async fn list_pending(&self, as_of: NaiveDate) -> PosResult<Vec<PendingReceivable>> {
        let pending = self
            .ledger
            .receivables()
            .list_pending()
            .await?
            .into_iter()
            .map(|receivable| PendingReceivable {
                overdue: receivable.is_overdue(as_of),
                receivable,
            })
            .collect();

        Ok(pending)
    }

    /// Settled entries, most recently settled first.
    pub async fn list_settled(&self) -> PosResult<Vec<Receivable>> {
        Ok(self.ledger.receivables().list_settled().await?)
    }

    /// Every entry, pending first.
    pub async fn list_all(&self) -> PosResult<Vec<Receivable>> {
        Ok(self.ledger.receivables().list_all().await?)
    }

    /// Total owed across all pending entries.
    pub async fn total_outstanding(&self) -> PosResult<Money> {
        let total = self
            .ledger
            .receivables()
            .list_pending()
            .await?
            .iter()
            .map(|r| r.total)
            .sum();

        Ok(total)
    }

    /// Physically removes an entry (administrative override; a mistyped
    /// ticket, for instance). Returns whether anything was removed.
    pub async fn delete(&self, id: i64) -> PosResult<bool> {
        let _guard = self.ledger.write_guard().await;
        let removed = self.ledger.receivables().delete(id).await?;

        if removed {
            info!(id, "Receivable deleted");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use balcao_db::StoreConfig;
    use chrono::{DateTime, Utc};

    fn entry(customer: &str, due: Option<NaiveDate>, total_cents: i64) -> Receivable {
        Receivable {
            id: 0,
            customer_name: customer.to_string(),
            customer_phone: None,
            product: "Pie".to_string(),
            quantity: 1,
            unit_price: Money::from_cents(total_cents),
            total: Money::from_cents(total_cents),
            sold_at: Utc::now(),
            due_date: due,
            settled: false,
            settled_at: None,
            notes: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn tracker() -> (ReceivablesTracker, Ledger) {
        let ledger = Ledger::new(StoreConfig::in_memory()).await.unwrap();
        (ReceivablesTracker::new(ledger.clone()), ledger)
    }

    #[tokio::test]
    async fn settle_is_idempotent() {
        let (tracker, ledger) = tracker().await;
        let id = ledger
            .receivables()
            .insert(&entry("Alice", None, 1_000))
            .await
            .unwrap();

        assert!(tracker.settle(id).await.unwrap());
        assert!(!tracker.settle(id).await.unwrap());

        let err = tracker.settle(9_999).await.unwrap_err();
        assert!(matches!(err, PosError::ReceivableNotFound { id: 9_999 }));
    }

    #[tokio::test]
    async fn pending_list_tags_overdue_entries() {
        let (tracker, ledger) = tracker().await;
        ledger
            .receivables()
            .insert(&entry("Past", Some(date(2025, 3, 1)), 1_000))
            .await
            .unwrap();
        ledger
            .receivables()
            .insert(&entry("Future", Some(date(2025, 5, 1)), 2_000))
            .await
            .unwrap();
        ledger
            .receivables()
            .insert(&entry("OpenEnded", None, 3_000))
            .await
            .unwrap();

        let pending = tracker.list_pending(date(2025, 4, 1)).await.unwrap();
        assert_eq!(pending.len(), 3);
        assert_eq!(pending[0].receivable.customer_name, "Past");
        assert!(pending[0].overdue);
        assert!(!pending[1].overdue);
        assert!(!pending[2].overdue); // no due date, never overdue

        assert_eq!(tracker.total_outstanding().await.unwrap().cents(), 6_000);
    }

    #[tokio::test]
    async fn settlement_moves_entries_between_lists() {
        let (tracker, ledger) = tracker().await;
        let id = ledger
            .receivables()
            .insert(&entry("Alice", Some(date(2025, 3, 1)), 1_000))
            .await
            .unwrap();

        let before: DateTime<Utc> = Utc::now();
        tracker.settle(id).await.unwrap();

        assert!(tracker.list_pending(date(2025, 4, 1)).await.unwrap().is_empty());
        let settled = tracker.list_settled().await.unwrap();
        assert_eq!(settled.len(), 1);
        assert!(settled[0].settled_at.unwrap() >= before);
        assert_eq!(tracker.total_outstanding().await.unwrap(), Money::zero());
    }

    #[tokio::test]
    async fn delete_removes_regardless_of_state() {
        let (tracker, ledger) = tracker().await;
        let id = ledger
            .receivables()
            .insert(&entry("Alice", None, 1_000))
            .await
            .unwrap();
        tracker.settle(id).await.unwrap();

        assert!(tracker.delete(id).await.unwrap());
        assert!(!tracker.delete(id).await.unwrap());
        assert!(tracker.list_all().await.unwrap().is_empty());
    }
}
