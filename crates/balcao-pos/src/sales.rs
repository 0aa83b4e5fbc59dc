//! # Sales Engine
//!
//! Rings up cash and credit sales.
//!
//! ## Transaction Shape
//! A sale is a read-modify-write span: read stock, append the sale (or
//! receivable) row, write the new stock level. The engine holds the
//! store write lock across the span and commits the two writes in one
//! SQLite transaction, so a crash mid-sale leaves either both rows or
//! neither.
//!
//! ## Stock Policy
//! The drawer keeps ringing even when the count is off: under the
//! default [`StockPolicy::Lenient`], overselling clamps stock at zero
//! and logs a warning instead of blocking the customer. Stores that
//! prefer a hard stop opt into [`StockPolicy::Strict`].

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use balcao_core::validation::{
    validate_customer_name, validate_product_name, validate_sale_quantity, validate_unit_price,
};
use balcao_core::{Money, Receivable, SaleRecord};
use balcao_db::{Ledger, ProductRepository, ProductSalesStats, ReceivableRepository, SaleRepository};

use crate::error::{PosError, PosResult};

/// What to do when a sale asks for more units than are on hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockPolicy {
    /// Sell anyway, clamp stock at zero, log a warning.
    #[default]
    Lenient,
    /// Refuse the sale with [`PosError::InsufficientStock`].
    Strict,
}

/// Sale engine for cash and credit tickets.
#[derive(Debug, Clone)]
pub struct SalesEngine {
    ledger: Ledger,
    policy: StockPolicy,
}

impl SalesEngine {
    pub fn new(ledger: Ledger) -> Self {
        SalesEngine {
            ledger,
            policy: StockPolicy::default(),
        }
    }

    pub fn with_policy(ledger: Ledger, policy: StockPolicy) -> Self {
        SalesEngine { ledger, policy }
    }

    /// Rings a cash sale: appends the sale record and decrements stock
    /// atomically. The unit price is the price charged, which may
    /// differ from the catalog price (promotions, price overrides).
    pub async fn sell_cash(
        &self,
        product: &str,
        quantity: i64,
        unit_price: Money,
        operator: Option<String>,
        notes: Option<String>,
    ) -> PosResult<SaleRecord> {
        let product = validate_product_name(product)?;
        validate_sale_quantity(quantity)?;
        validate_unit_price(unit_price.cents())?;

        let _guard = self.ledger.write_guard().await;
        let mut tx = self.ledger.pool().begin().await?;

        let new_quantity = self
            .remaining_stock(&mut tx, &product, quantity)
            .await?;

        let mut record = SaleRecord {
            id: 0,
            product: product.clone(),
            quantity,
            unit_price,
            total: unit_price.multiply_quantity(quantity),
            sold_at: Utc::now(),
            operator,
            notes,
        };
        record.id = SaleRepository::insert_with(&mut *tx, &record).await?;
        ProductRepository::update_quantity_with(&mut *tx, &product, new_quantity).await?;

        tx.commit().await?;

        info!(
            id = record.id,
            product = %record.product,
            quantity,
            total = %record.total,
            "Cash sale"
        );
        Ok(record)
    }

    /// Rings a credit sale: appends a receivable owed by `customer` and
    /// decrements stock atomically. No cash enters the drawer, so the
    /// total never counts toward session revenue.
    #[allow(clippy::too_many_arguments)]
    pub async fn sell_credit(
        &self,
        customer: &str,
        customer_phone: Option<String>,
        product: &str,
        quantity: i64,
        unit_price: Money,
        due_date: Option<NaiveDate>,
        notes: Option<String>,
    ) -> PosResult<Receivable> {
        let customer = validate_customer_name(customer)?;
        let product = validate_product_name(product)?;
        validate_sale_quantity(quantity)?;
        validate_unit_price(unit_price.cents())?;

        let _guard = self.ledger.write_guard().await;
        let mut tx = self.ledger.pool().begin().await?;

        let new_quantity = self
            .remaining_stock(&mut tx, &product, quantity)
            .await?;

        let mut entry = Receivable {
            id: 0,
            customer_name: customer,
            customer_phone,
            product: product.clone(),
            quantity,
            unit_price,
            total: unit_price.multiply_quantity(quantity),
            sold_at: Utc::now(),
            due_date,
            settled: false,
            settled_at: None,
            notes,
        };
        entry.id = ReceivableRepository::insert_with(&mut *tx, &entry).await?;
        ProductRepository::update_quantity_with(&mut *tx, &product, new_quantity).await?;

        tx.commit().await?;

        info!(
            id = entry.id,
            customer = %entry.customer_name,
            product = %entry.product,
            total = %entry.total,
            "Credit sale"
        );
        Ok(entry)
    }

    /// Most recent sales first.
    pub async fn recent_sales(&self, limit: u32) -> PosResult<Vec<SaleRecord>> {
        Ok(self.ledger.sales().list_recent(limit).await?)
    }

    /// All-time cash revenue.
    pub async fn total_revenue(&self) -> PosResult<Money> {
        Ok(self.ledger.sales().total_revenue().await?)
    }

    /// Sales aggregates per product, best seller first.
    pub async fn sales_by_product(&self) -> PosResult<Vec<ProductSalesStats>> {
        Ok(self.ledger.sales().stats_by_product().await?)
    }

    /// Reads the stock level inside the caller's transaction and
    /// resolves the post-sale quantity under the engine's policy.
    async fn remaining_stock(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        product: &str,
        quantity: i64,
    ) -> PosResult<i64> {
        let on_hand = ProductRepository::get_with(&mut **tx, product)
            .await?
            .ok_or_else(|| PosError::ProductNotFound {
                name: product.to_string(),
            })?
            .quantity;

        if on_hand < quantity {
            match self.policy {
                StockPolicy::Strict => {
                    return Err(PosError::InsufficientStock {
                        name: product.to_string(),
                        available: on_hand,
                        requested: quantity,
                    });
                }
                StockPolicy::Lenient => {
                    warn!(
                        product = %product,
                        on_hand,
                        requested = quantity,
                        "Oversold; clamping stock at zero"
                    );
                    return Ok(0);
                }
            }
        }

        Ok(on_hand - quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::InventoryManager;
    use balcao_db::StoreConfig;

    async fn engines() -> (InventoryManager, SalesEngine, Ledger) {
        let ledger = Ledger::new(StoreConfig::in_memory()).await.unwrap();
        (
            InventoryManager::new(ledger.clone()),
            SalesEngine::new(ledger.clone()),
            ledger,
        )
    }

    #[tokio::test]
    async fn cash_sale_decrements_stock_and_snapshots_the_price() {
        let (inv, sales, _ledger) = engines().await;
        inv.add_product("Coffee", 10, Money::from_cents(350), None, None)
            .await
            .unwrap();

        let record = sales
            .sell_cash("coffee", 2, Money::from_cents(350), None, None)
            .await
            .unwrap();
        assert_eq!(record.total.cents(), 700);

        // A later price change leaves the record untouched.
        inv.adjust_price("Coffee", Money::from_cents(999)).await.unwrap();
        let again = sales.recent_sales(1).await.unwrap();
        assert_eq!(again[0].unit_price.cents(), 350);

        let coffee = inv.find("Coffee").await.unwrap().unwrap();
        assert_eq!(coffee.quantity, 8);
    }

    #[tokio::test]
    async fn lenient_policy_clamps_stock_at_zero() {
        let (inv, sales, _ledger) = engines().await;
        inv.add_product("Soda", 5, Money::from_cents(200), None, None)
            .await
            .unwrap();

        let record = sales
            .sell_cash("Soda", 8, Money::from_cents(200), None, None)
            .await
            .unwrap();
        // The full requested quantity is charged.
        assert_eq!(record.quantity, 8);
        assert_eq!(record.total.cents(), 1_600);

        let soda = inv.find("Soda").await.unwrap().unwrap();
        assert_eq!(soda.quantity, 0);
    }

    #[tokio::test]
    async fn strict_policy_refuses_overselling() {
        let ledger = Ledger::new(StoreConfig::in_memory()).await.unwrap();
        let inv = InventoryManager::new(ledger.clone());
        let sales = SalesEngine::with_policy(ledger, StockPolicy::Strict);

        inv.add_product("Soda", 5, Money::from_cents(200), None, None)
            .await
            .unwrap();

        let err = sales
            .sell_cash("Soda", 8, Money::from_cents(200), None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PosError::InsufficientStock {
                available: 5,
                requested: 8,
                ..
            }
        ));

        // Nothing moved: no ledger row, stock intact.
        assert!(sales.recent_sales(10).await.unwrap().is_empty());
        assert_eq!(inv.find("Soda").await.unwrap().unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn credit_sale_creates_a_pending_receivable() {
        let (inv, sales, ledger) = engines().await;
        inv.add_product("Pie", 3, Money::from_cents(550), None, None)
            .await
            .unwrap();

        let entry = sales
            .sell_credit(
                " Alice ",
                Some("555-0101".to_string()),
                "pie",
                1,
                Money::from_cents(550),
                NaiveDate::from_ymd_opt(2025, 4, 1),
                None,
            )
            .await
            .unwrap();
        assert_eq!(entry.customer_name, "Alice");
        assert!(!entry.settled);

        // Stock moved, but the cash ledger did not.
        assert_eq!(inv.find("Pie").await.unwrap().unwrap().quantity, 2);
        assert_eq!(sales.total_revenue().await.unwrap(), Money::zero());
        assert_eq!(ledger.receivables().list_pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_product_fails_without_side_effects() {
        let (_inv, sales, ledger) = engines().await;

        let err = sales
            .sell_cash("Ghost", 1, Money::from_cents(100), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::ProductNotFound { .. }));
        assert!(ledger.sales().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sale_input_rules() {
        let (inv, sales, _ledger) = engines().await;
        inv.add_product("Soda", 5, Money::from_cents(200), None, None)
            .await
            .unwrap();

        assert!(matches!(
            sales
                .sell_cash("Soda", 0, Money::from_cents(200), None, None)
                .await
                .unwrap_err(),
            PosError::Validation(_)
        ));
        assert!(matches!(
            sales
                .sell_cash("Soda", 1, Money::zero(), None, None)
                .await
                .unwrap_err(),
            PosError::Validation(_)
        ));
        assert!(matches!(
            sales
                .sell_credit("", None, "Soda", 1, Money::from_cents(200), None, None)
                .await
                .unwrap_err(),
            PosError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn product_stats_aggregate_across_sales() {
        let (inv, sales, _ledger) = engines().await;
        inv.add_product("Coffee", 50, Money::from_cents(350), None, None)
            .await
            .unwrap();
        inv.add_product("Soda", 50, Money::from_cents(200), None, None)
            .await
            .unwrap();

        sales.sell_cash("Coffee", 2, Money::from_cents(350), None, None).await.unwrap();
        sales.sell_cash("Coffee", 1, Money::from_cents(350), None, None).await.unwrap();
        sales.sell_cash("Soda", 10, Money::from_cents(200), None, None).await.unwrap();

        let stats = sales.sales_by_product().await.unwrap();
        assert_eq!(stats[0].product, "Soda");
        assert_eq!(stats[0].revenue.cents(), 2_000);
        assert_eq!(stats[1].units_sold, 3);

        assert_eq!(sales.total_revenue().await.unwrap().cents(), 3_050);
    }
}
