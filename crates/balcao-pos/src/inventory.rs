//! # Inventory Manager
//!
//! Catalog operations: add, adjust, retire, look up.
//!
//! Every name crossing this boundary goes through
//! [`normalize_product_name`](balcao_core::validation::normalize_product_name)
//! first, so "  coca COLA " and "Coca Cola" are the same product on
//! every path. Mutations that read before they write hold the store
//! write lock for the whole span.

use chrono::Utc;
use tracing::info;

use balcao_core::validation::{
    validate_initial_quantity, validate_price, validate_product_name,
};
use balcao_core::{Money, Product, DEFAULT_CATEGORY};
use balcao_db::Ledger;

use crate::error::{PosError, PosResult};

/// Catalog engine.
#[derive(Debug, Clone)]
pub struct InventoryManager {
    ledger: Ledger,
}

impl InventoryManager {
    pub fn new(ledger: Ledger) -> Self {
        InventoryManager { ledger }
    }

    /// Adds a product to the catalog.
    ///
    /// The name is normalized before the duplicate check; a retired
    /// product still occupies its name (history references it), so
    /// re-adding one is a [`PosError::DuplicateProduct`].
    pub async fn add_product(
        &self,
        name: &str,
        quantity: i64,
        price: Money,
        category: Option<&str>,
        barcode: Option<String>,
    ) -> PosResult<Product> {
        let name = validate_product_name(name)?;
        validate_initial_quantity(quantity)?;
        validate_price(price.cents())?;

        let _guard = self.ledger.write_guard().await;

        if self.ledger.products().get_any(&name).await?.is_some() {
            return Err(PosError::DuplicateProduct { name });
        }

        let now = Utc::now();
        let product = Product {
            name,
            quantity,
            price,
            category: category.unwrap_or(DEFAULT_CATEGORY).to_string(),
            barcode,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.ledger.products().insert(&product).await?;

        info!(name = %product.name, quantity, price = %price, "Product added");
        Ok(product)
    }

    /// Overwrites the quantity on hand.
    pub async fn adjust_quantity(&self, name: &str, quantity: i64) -> PosResult<Product> {
        let name = validate_product_name(name)?;
        validate_initial_quantity(quantity)?;

        let _guard = self.ledger.write_guard().await;

        if !self.ledger.products().update_quantity(&name, quantity).await? {
            return Err(PosError::ProductNotFound { name });
        }

        info!(name = %name, quantity, "Stock adjusted");
        self.require(&name).await
    }

    /// Overwrites the unit price.
    pub async fn adjust_price(&self, name: &str, price: Money) -> PosResult<Product> {
        let name = validate_product_name(name)?;
        validate_price(price.cents())?;

        let _guard = self.ledger.write_guard().await;

        if !self.ledger.products().update_price(&name, price).await? {
            return Err(PosError::ProductNotFound { name });
        }

        info!(name = %name, price = %price, "Price adjusted");
        self.require(&name).await
    }

    /// Retires a product. Returns whether anything was retired; a miss
    /// is a no-op, not an error (operators probe for existence through
    /// this path).
    pub async fn remove_product(&self, name: &str) -> PosResult<bool> {
        let name = validate_product_name(name)?;

        let _guard = self.ledger.write_guard().await;
        let retired = self.ledger.products().deactivate(&name).await?;

        if retired {
            info!(name = %name, "Product retired");
        }
        Ok(retired)
    }

    /// Looks up an active product by (normalized) name.
    pub async fn find(&self, name: &str) -> PosResult<Option<Product>> {
        let name = validate_product_name(name)?;
        Ok(self.ledger.products().get(&name).await?)
    }

    /// Active catalog, ordered by name.
    pub async fn list(&self) -> PosResult<Vec<Product>> {
        Ok(self.ledger.products().list().await?)
    }

    /// Active products whose name contains `term`, any casing. A blank
    /// term returns the whole catalog.
    pub async fn search(&self, term: &str) -> PosResult<Vec<Product>> {
        let term = term.trim();
        if term.is_empty() {
            return self.list().await;
        }
        Ok(self.ledger.products().search(term).await?)
    }

    /// Current value of the stock on hand, summed across the active
    /// catalog at today's prices.
    pub async fn total_stock_value(&self) -> PosResult<Money> {
        Ok(self.ledger.products().total_value().await?)
    }

    /// Active products at or below `threshold` units on hand.
    pub async fn low_stock(&self, threshold: i64) -> PosResult<Vec<Product>> {
        Ok(self.ledger.products().list_below(threshold).await?)
    }

    async fn require(&self, name: &str) -> PosResult<Product> {
        self.ledger
            .products()
            .get(name)
            .await?
            .ok_or_else(|| PosError::ProductNotFound {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use balcao_db::StoreConfig;

    async fn manager() -> InventoryManager {
        let ledger = Ledger::new(StoreConfig::in_memory()).await.unwrap();
        InventoryManager::new(ledger)
    }

    #[tokio::test]
    async fn add_normalizes_and_defaults_the_category() {
        let inv = manager().await;

        let product = inv
            .add_product("  coca COLA ", 10, Money::from_cents(250), None, None)
            .await
            .unwrap();
        assert_eq!(product.name, "Coca Cola");
        assert_eq!(product.category, "General");

        // Any casing finds the same row.
        assert!(inv.find("COCA cola").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected_even_after_retirement() {
        let inv = manager().await;
        inv.add_product("Pie", 3, Money::from_cents(550), Some("Desserts"), None)
            .await
            .unwrap();

        let err = inv
            .add_product("pie", 1, Money::from_cents(500), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::DuplicateProduct { .. }));

        assert!(inv.remove_product("Pie").await.unwrap());
        let err = inv
            .add_product("Pie", 1, Money::from_cents(500), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::DuplicateProduct { .. }));
    }

    #[tokio::test]
    async fn adjustments_hit_only_existing_products() {
        let inv = manager().await;
        inv.add_product("Soda", 5, Money::from_cents(200), Some("Drinks"), None)
            .await
            .unwrap();

        let updated = inv.adjust_quantity("soda", 12).await.unwrap();
        assert_eq!(updated.quantity, 12);

        let updated = inv.adjust_price("soda", Money::from_cents(225)).await.unwrap();
        assert_eq!(updated.price.cents(), 225);

        let err = inv.adjust_quantity("Ghost", 1).await.unwrap_err();
        assert!(matches!(err, PosError::ProductNotFound { .. }));
        let err = inv.adjust_price("Ghost", Money::zero()).await.unwrap_err();
        assert!(matches!(err, PosError::ProductNotFound { .. }));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_store() {
        let inv = manager().await;

        assert!(matches!(
            inv.add_product("  ", 1, Money::from_cents(100), None, None)
                .await
                .unwrap_err(),
            PosError::Validation(_)
        ));
        assert!(matches!(
            inv.add_product("Soda", -1, Money::from_cents(100), None, None)
                .await
                .unwrap_err(),
            PosError::Validation(_)
        ));
        assert!(matches!(
            inv.add_product("Soda", 1, Money::from_cents(-100), None, None)
                .await
                .unwrap_err(),
            PosError::Validation(_)
        ));
        assert_eq!(inv.list().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn remove_is_a_noop_on_missing_names() {
        let inv = manager().await;
        assert!(!inv.remove_product("Ghost").await.unwrap());
    }

    #[tokio::test]
    async fn search_is_substring_and_casing_insensitive() {
        let inv = manager().await;
        inv.add_product("Coca Cola", 10, Money::from_cents(250), None, None)
            .await
            .unwrap();
        inv.add_product("Coffee", 10, Money::from_cents(350), None, None)
            .await
            .unwrap();

        let hits = inv.search("  COLA ").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Coca Cola");

        // A blank term is the full catalog, not an error.
        assert_eq!(inv.search("   ").await.unwrap().len(), 2);
        assert!(inv.search("ghost").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stock_valuation_tracks_quantity_and_price() {
        let inv = manager().await;
        inv.add_product("Soda", 5, Money::from_cents(200), None, None)
            .await
            .unwrap();
        inv.add_product("Coffee", 10, Money::from_cents(350), None, None)
            .await
            .unwrap();

        assert_eq!(inv.total_stock_value().await.unwrap().cents(), 4_500);

        inv.adjust_quantity("Soda", 0).await.unwrap();
        assert_eq!(inv.total_stock_value().await.unwrap().cents(), 3_500);

        inv.remove_product("Coffee").await.unwrap();
        assert_eq!(inv.total_stock_value().await.unwrap(), Money::zero());
    }

    #[tokio::test]
    async fn low_stock_threshold_is_inclusive() {
        let inv = manager().await;
        inv.add_product("Soda", 2, Money::from_cents(200), None, None)
            .await
            .unwrap();
        inv.add_product("Coffee", 50, Money::from_cents(350), None, None)
            .await
            .unwrap();

        let low = inv.low_stock(2).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Soda");
    }
}
