//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! Names arriving here are already normalized by balcao-core; this
//! module just moves typed rows. Retirement is a logical delete:
//! historical sales reference products by name, so catalog rows are
//! never physically removed.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::StoreResult;
use balcao_core::{Money, Product};

/// Every catalog column, in struct-field order.
const PRODUCT_COLUMNS: &str =
    "name, quantity, price, category, barcode, is_active, created_at, updated_at";

/// Repository for product catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new catalog row.
    ///
    /// The name is the primary key, so re-adding an existing product
    /// (active or retired) surfaces as a
    /// [`StoreError::UniqueViolation`](crate::StoreError::UniqueViolation).
    pub async fn insert(&self, product: &Product) -> StoreResult<()> {
        debug!(name = %product.name, "Inserting product");

        sqlx::query(
            "INSERT INTO products (name, quantity, price, category, barcode, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&product.name)
        .bind(product.quantity)
        .bind(product.price)
        .bind(&product.category)
        .bind(&product.barcode)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an active product by normalized name.
    pub async fn get(&self, name: &str) -> StoreResult<Option<Product>> {
        Self::get_with(&self.pool, name).await
    }

    /// Executor form of [`get`](Self::get), for caller-owned
    /// transactions (the sales engine reads stock inside the same
    /// transaction that updates it).
    pub async fn get_with<'e, E>(executor: E, name: &str) -> StoreResult<Option<Product>>
    where
        E: SqliteExecutor<'e>,
    {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE name = ?1 AND is_active = 1"
        ))
        .bind(name)
        .fetch_optional(executor)
        .await?;

        Ok(product)
    }

    /// Gets a product regardless of its active flag. Used for
    /// duplicate checks: a retired product still occupies its name.
    pub async fn get_any(&self, name: &str) -> StoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE name = ?1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products ordered by name.
    pub async fn list(&self) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Active products whose name contains `term`, ordered by name.
    /// LIKE is case-insensitive for ASCII, so "cola" finds "Coca Cola".
    pub async fn search(&self, term: &str) -> StoreResult<Vec<Product>> {
        let pattern = format!("%{}%", term.replace('%', "\\%").replace('_', "\\_"));

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE is_active = 1 AND name LIKE ?1 ESCAPE '\\'
             ORDER BY name"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists active products at or below a stock threshold (the
    /// low-stock report).
    pub async fn list_below(&self, threshold: i64) -> StoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE is_active = 1 AND quantity <= ?1
             ORDER BY quantity, name"
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Overwrites the quantity on hand. Returns false when no active
    /// product has that name.
    pub async fn update_quantity(&self, name: &str, quantity: i64) -> StoreResult<bool> {
        Self::update_quantity_with(&self.pool, name, quantity).await
    }

    /// Executor form of [`update_quantity`](Self::update_quantity).
    pub async fn update_quantity_with<'e, E>(
        executor: E,
        name: &str,
        quantity: i64,
    ) -> StoreResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(name = %name, quantity, "Updating product quantity");

        let result = sqlx::query(
            "UPDATE products SET quantity = ?2, updated_at = ?3
             WHERE name = ?1 AND is_active = 1",
        )
        .bind(name)
        .bind(quantity)
        .bind(Utc::now())
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Overwrites the unit price. Returns false when no active product
    /// has that name.
    pub async fn update_price(&self, name: &str, price: Money) -> StoreResult<bool> {
        debug!(name = %name, price = %price, "Updating product price");

        let result = sqlx::query(
            "UPDATE products SET price = ?2, updated_at = ?3
             WHERE name = ?1 AND is_active = 1",
        )
        .bind(name)
        .bind(price)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Retires a product (logical delete). Returns false when no
    /// active product has that name; callers routinely probe for
    /// existence through this path, so a miss is not an error.
    pub async fn deactivate(&self, name: &str) -> StoreResult<bool> {
        debug!(name = %name, "Retiring product");

        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2
             WHERE name = ?1 AND is_active = 1",
        )
        .bind(name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts active products.
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Total value of the stock on hand: SUM(quantity * price) over the
    /// active catalog.
    pub async fn total_value(&self) -> StoreResult<Money> {
        let cents: Option<i64> =
            sqlx::query_scalar("SELECT SUM(quantity * price) FROM products WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;

        Ok(Money::from_cents(cents.unwrap_or(0)))
    }
}
