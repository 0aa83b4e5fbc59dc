//! # Schema Management
//!
//! Table creation and in-place upgrades for the ledger store.
//!
//! ## How Upgrades Work
//! ```text
//! Store open
//!      │
//!      ▼
//! CREATE TABLE IF NOT EXISTS ... (current definitions, no-ops on an
//!      │                          existing store)
//!      ▼
//! For each column added after the first release:
//!      ├── PRAGMA table_info(<table>)  → column present? skip
//!      └── ALTER TABLE ADD COLUMN ... DEFAULT ...  (existing rows keep
//!          their data and pick up the default)
//!      │
//!      ▼
//! INSERT OR IGNORE default settings rows
//! ```
//!
//! The whole pass is idempotent: running it against an already-upgraded
//! store changes nothing. **Never** drop or rewrite an existing column
//! here - history tables are append-only records.

use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// Current table definitions. Executed with IF NOT EXISTS on every
/// store open.
const CREATE_TABLES: &[&str] = &[
    // Product catalog. Identity is the normalized name; retired
    // products keep their row (is_active = 0) because historical sales
    // reference them by name.
    r#"
    CREATE TABLE IF NOT EXISTS products (
        name       TEXT PRIMARY KEY,
        quantity   INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0),
        price      INTEGER NOT NULL DEFAULT 0 CHECK (price >= 0),
        category   TEXT NOT NULL DEFAULT 'General',
        barcode    TEXT,
        is_active  INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    // Append-only cash-sale ledger. Rows are never updated or deleted.
    r#"
    CREATE TABLE IF NOT EXISTS sales (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        product    TEXT NOT NULL,
        quantity   INTEGER NOT NULL CHECK (quantity > 0),
        unit_price INTEGER NOT NULL,
        total      INTEGER NOT NULL,
        sold_at    TEXT NOT NULL,
        operator   TEXT,
        notes      TEXT
    )
    "#,
    r#"CREATE INDEX IF NOT EXISTS idx_sales_sold_at ON sales (sold_at)"#,
    // Store-credit entries. Only the settlement fields ever change.
    r#"
    CREATE TABLE IF NOT EXISTS receivables (
        id             INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_name  TEXT NOT NULL,
        customer_phone TEXT,
        product        TEXT NOT NULL,
        quantity       INTEGER NOT NULL CHECK (quantity > 0),
        unit_price     INTEGER NOT NULL,
        total          INTEGER NOT NULL,
        sold_at        TEXT NOT NULL,
        due_date       TEXT,
        settled        INTEGER NOT NULL DEFAULT 0,
        settled_at     TEXT,
        notes          TEXT
    )
    "#,
    r#"CREATE INDEX IF NOT EXISTS idx_receivables_due ON receivables (settled, due_date)"#,
    // Cash-drawer sessions. Historical records, never deleted.
    r#"
    CREATE TABLE IF NOT EXISTS cash_sessions (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        opened_at        TEXT NOT NULL,
        closed_at        TEXT,
        opening_float    INTEGER NOT NULL CHECK (opening_float >= 0),
        withdrawal_total INTEGER NOT NULL DEFAULT 0,
        deposit_total    INTEGER NOT NULL DEFAULT 0,
        counted          INTEGER,
        operator         TEXT NOT NULL,
        status           TEXT NOT NULL DEFAULT 'OPEN',
        notes            TEXT
    )
    "#,
    // Movements are append-only; amount 0 is legal only for the
    // OPENING/CLOSING bookkeeping rows (empty drawer).
    r#"
    CREATE TABLE IF NOT EXISTS cash_movements (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id  INTEGER NOT NULL REFERENCES cash_sessions (id),
        kind        TEXT NOT NULL,
        amount      INTEGER NOT NULL CHECK (amount >= 0),
        description TEXT,
        recorded_at TEXT NOT NULL,
        operator    TEXT NOT NULL
    )
    "#,
    r#"CREATE INDEX IF NOT EXISTS idx_movements_session ON cash_movements (session_id)"#,
    // Persisted key/value settings (store name, currency symbol, ...).
    r#"
    CREATE TABLE IF NOT EXISTS settings (
        key        TEXT PRIMARY KEY,
        value      TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
];

/// Columns added after the first release, checked against
/// `PRAGMA table_info` on every open. `(table, column, definition)`.
///
/// Defaults must be constants (SQLite ALTER TABLE restriction) and must
/// decode as the column's Rust type, so legacy rows stay readable.
const COLUMN_UPGRADES: &[(&str, &str, &str)] = &[
    ("products", "category", "TEXT NOT NULL DEFAULT 'General'"),
    ("products", "barcode", "TEXT"),
    ("products", "is_active", "INTEGER NOT NULL DEFAULT 1"),
    ("sales", "operator", "TEXT"),
    ("sales", "notes", "TEXT"),
    ("receivables", "customer_phone", "TEXT"),
    ("receivables", "notes", "TEXT"),
    ("cash_sessions", "notes", "TEXT"),
];

/// Default settings rows, seeded once with INSERT OR IGNORE.
const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("schema_version", "1"),
    ("store_name", "Balcao POS"),
    ("currency_symbol", "$"),
];

/// Creates missing tables, applies pending column upgrades and seeds
/// default settings. Runs once at store open; safe to run again.
pub async fn ensure_schema(pool: &SqlitePool) -> StoreResult<()> {
    info!("Ensuring ledger schema");

    for ddl in CREATE_TABLES {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| StoreError::SchemaUpgradeFailed(e.to_string()))?;
    }

    upgrade_columns(pool).await?;
    seed_settings(pool).await?;

    info!("Ledger schema up to date");
    Ok(())
}

/// Adds any column from [`COLUMN_UPGRADES`] that an older store is
/// missing, without discarding existing rows.
async fn upgrade_columns(pool: &SqlitePool) -> StoreResult<()> {
    for (table, column, definition) in COLUMN_UPGRADES {
        if column_exists(pool, table, column).await? {
            continue;
        }

        info!(table, column, "Upgrading store: adding missing column");
        let ddl = format!("ALTER TABLE {table} ADD COLUMN {column} {definition}");
        sqlx::query(&ddl)
            .execute(pool)
            .await
            .map_err(|e| StoreError::SchemaUpgradeFailed(e.to_string()))?;
    }

    Ok(())
}

/// Checks `PRAGMA table_info` for a column.
async fn column_exists(pool: &SqlitePool, table: &str, column: &str) -> StoreResult<bool> {
    let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
        .fetch_all(pool)
        .await
        .map_err(|e| StoreError::SchemaUpgradeFailed(e.to_string()))?;

    Ok(rows
        .iter()
        .any(|row| row.get::<String, _>("name") == column))
}

async fn seed_settings(pool: &SqlitePool) -> StoreResult<()> {
    let now = chrono::Utc::now();
    for (key, value) in DEFAULT_SETTINGS {
        let inserted =
            sqlx::query("INSERT OR IGNORE INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)")
                .bind(key)
                .bind(value)
                .bind(now)
                .execute(pool)
                .await?
                .rows_affected();
        if inserted > 0 {
            debug!(key, value, "Seeded default setting");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Ledger, StoreConfig};
    use sqlx::Row;

    #[tokio::test]
    async fn schema_pass_is_idempotent() {
        let ledger = Ledger::new(StoreConfig::in_memory()).await.unwrap();

        // Second and third passes must be no-ops, not errors.
        ensure_schema(ledger.pool()).await.unwrap();
        ensure_schema(ledger.pool()).await.unwrap();
        assert!(ledger.health_check().await);
    }

    #[tokio::test]
    async fn legacy_store_gains_missing_columns_without_losing_rows() {
        // Simulate a store created by the first release: products had
        // no category/barcode/is_active yet.
        let config = StoreConfig::in_memory().run_schema_upgrade(false);
        let ledger = Ledger::new(config).await.unwrap();

        sqlx::query(
            "CREATE TABLE products (
                name TEXT PRIMARY KEY,
                quantity INTEGER NOT NULL DEFAULT 0,
                price INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(ledger.pool())
        .await
        .unwrap();

        let now = chrono::Utc::now();
        sqlx::query("INSERT INTO products (name, quantity, price, created_at, updated_at) VALUES ('Coffee', 10, 350, ?1, ?1)")
            .bind(now)
            .execute(ledger.pool())
            .await
            .unwrap();

        ensure_schema(ledger.pool()).await.unwrap();

        // The legacy row survived and picked up the defaults.
        let row = sqlx::query("SELECT name, quantity, category, is_active FROM products")
            .fetch_one(ledger.pool())
            .await
            .unwrap();
        assert_eq!(row.get::<String, _>("name"), "Coffee");
        assert_eq!(row.get::<i64, _>("quantity"), 10);
        assert_eq!(row.get::<String, _>("category"), "General");
        assert_eq!(row.get::<bool, _>("is_active"), true);
    }

    #[tokio::test]
    async fn default_settings_are_seeded_once() {
        let ledger = Ledger::new(StoreConfig::in_memory()).await.unwrap();

        sqlx::query("UPDATE settings SET value = 'Lanchonete da Ana' WHERE key = 'store_name'")
            .execute(ledger.pool())
            .await
            .unwrap();

        // Re-running the schema pass must not clobber operator edits.
        ensure_schema(ledger.pool()).await.unwrap();

        let value: String =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = 'store_name'")
                .fetch_one(ledger.pool())
                .await
                .unwrap();
        assert_eq!(value, "Lanchonete da Ana");
    }
}
