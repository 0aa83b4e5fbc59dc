//! # Sale Repository
//!
//! The append-only cash-sale ledger.
//!
//! ## Snapshot Pattern
//! A sale row captures the product name, quantity and unit price at
//! the moment of sale; `total` is written once as `quantity *
//! unit_price` and never edited. Later catalog changes cannot touch
//! history. There are deliberately no UPDATE or DELETE statements in
//! this module.

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::StoreResult;
use balcao_core::{Money, SaleRecord};

const SALE_COLUMNS: &str = "id, product, quantity, unit_price, total, sold_at, operator, notes";

/// Per-product sales aggregate (units moved, revenue, ticket count).
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProductSalesStats {
    pub product: String,
    pub units_sold: i64,
    pub revenue: Money,
    pub sale_count: i64,
}

/// Repository for the cash-sale ledger.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Appends a sale record, ignoring `record.id`, and returns the
    /// assigned sequence number.
    pub async fn insert(&self, record: &SaleRecord) -> StoreResult<i64> {
        Self::insert_with(&self.pool, record).await
    }

    /// Executor form of [`insert`](Self::insert); the sales engine
    /// appends the sale and updates stock in one transaction.
    pub async fn insert_with<'e, E>(executor: E, record: &SaleRecord) -> StoreResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(
            product = %record.product,
            quantity = record.quantity,
            total = %record.total,
            "Appending sale record"
        );

        let result = sqlx::query(
            "INSERT INTO sales (product, quantity, unit_price, total, sold_at, operator, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&record.product)
        .bind(record.quantity)
        .bind(record.unit_price)
        .bind(record.total)
        .bind(record.sold_at)
        .bind(&record.operator)
        .bind(&record.notes)
        .execute(executor)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Gets one sale by sequence number.
    pub async fn get(&self, id: i64) -> StoreResult<Option<SaleRecord>> {
        let sale = sqlx::query_as::<_, SaleRecord>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Most recent sales first.
    pub async fn list_recent(&self, limit: u32) -> StoreResult<Vec<SaleRecord>> {
        let sales = sqlx::query_as::<_, SaleRecord>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY id DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Full ledger, oldest first.
    pub async fn list_all(&self) -> StoreResult<Vec<SaleRecord>> {
        let sales = sqlx::query_as::<_, SaleRecord>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Sum of cash-sale totals timestamped within `[from, to]`. This is
    /// the `revenue_in_session` figure of the theoretical drawer
    /// balance; credit sales live in a different table and never count.
    pub async fn revenue_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Money> {
        Self::revenue_between_with(&self.pool, from, to).await
    }

    /// Executor form of [`revenue_between`](Self::revenue_between).
    pub async fn revenue_between_with<'e, E>(
        executor: E,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> StoreResult<Money>
    where
        E: SqliteExecutor<'e>,
    {
        let cents: Option<i64> = sqlx::query_scalar(
            "SELECT SUM(total) FROM sales WHERE sold_at >= ?1 AND sold_at <= ?2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(executor)
        .await?;

        Ok(Money::from_cents(cents.unwrap_or(0)))
    }

    /// All-time cash revenue.
    pub async fn total_revenue(&self) -> StoreResult<Money> {
        let cents: Option<i64> = sqlx::query_scalar("SELECT SUM(total) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(Money::from_cents(cents.unwrap_or(0)))
    }

    /// Sales aggregates per product, best seller (by revenue) first.
    pub async fn stats_by_product(&self) -> StoreResult<Vec<ProductSalesStats>> {
        let stats = sqlx::query_as::<_, ProductSalesStats>(
            "SELECT product,
                    SUM(quantity) AS units_sold,
                    SUM(total)    AS revenue,
                    COUNT(*)      AS sale_count
             FROM sales
             GROUP BY product
             ORDER BY revenue DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Ledger, StoreConfig};

    fn record(product: &str, quantity: i64, unit_price_cents: i64) -> SaleRecord {
        let unit_price = Money::from_cents(unit_price_cents);
        SaleRecord {
            id: 0,
            product: product.to_string(),
            quantity,
            unit_price,
            total: unit_price.multiply_quantity(quantity),
            sold_at: Utc::now(),
            operator: None,
            notes: None,
        }
    }

    async fn repo() -> SaleRepository {
        let ledger = Ledger::new(StoreConfig::in_memory()).await.unwrap();
        ledger.sales()
    }

    #[tokio::test]
    async fn ids_are_sequential_and_totals_captured() {
        let repo = repo().await;

        let first = repo.insert(&record("Coffee", 2, 350)).await.unwrap();
        let second = repo.insert(&record("Soda", 1, 200)).await.unwrap();
        assert_eq!(second, first + 1);

        let coffee = repo.get(first).await.unwrap().unwrap();
        assert_eq!(coffee.total.cents(), 700);
        assert_eq!(coffee.unit_price.cents(), 350);
    }

    #[tokio::test]
    async fn revenue_between_honors_the_window() {
        let repo = repo().await;

        let before = Utc::now();
        repo.insert(&record("Coffee", 2, 350)).await.unwrap();
        repo.insert(&record("Soda", 3, 200)).await.unwrap();
        let after = Utc::now();

        let revenue = repo.revenue_between(before, after).await.unwrap();
        assert_eq!(revenue.cents(), 1300);

        // Window ending before the sales captures nothing.
        let none = repo
            .revenue_between(before - chrono::Duration::hours(2), before)
            .await
            .unwrap();
        assert_eq!(none.cents(), 0);
    }

    #[tokio::test]
    async fn empty_ledger_revenue_is_zero() {
        let repo = repo().await;
        assert_eq!(repo.total_revenue().await.unwrap(), Money::zero());
    }

    #[tokio::test]
    async fn stats_group_by_product() {
        let repo = repo().await;
        repo.insert(&record("Coffee", 2, 350)).await.unwrap();
        repo.insert(&record("Coffee", 1, 350)).await.unwrap();
        repo.insert(&record("Soda", 10, 200)).await.unwrap();

        let stats = repo.stats_by_product().await.unwrap();
        assert_eq!(stats.len(), 2);
        // Soda earned 20.00, coffee 10.50 - revenue ordering.
        assert_eq!(stats[0].product, "Soda");
        assert_eq!(stats[0].units_sold, 10);
        assert_eq!(stats[1].product, "Coffee");
        assert_eq!(stats[1].sale_count, 2);
        assert_eq!(stats[1].revenue.cents(), 1050);
    }

    #[tokio::test]
    async fn recent_list_is_newest_first() {
        let repo = repo().await;
        repo.insert(&record("Coffee", 1, 350)).await.unwrap();
        repo.insert(&record("Soda", 1, 200)).await.unwrap();

        let recent = repo.list_recent(1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].product, "Soda");

        assert_eq!(repo.list_all().await.unwrap().len(), 2);
    }
}
