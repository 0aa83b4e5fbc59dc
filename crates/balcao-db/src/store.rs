//! # Store Handle and Pool Management
//!
//! Connection pool configuration for SQLite plus the [`Ledger`] handle
//! the engines work through.
//!
//! ## WAL Mode
//! WAL (Write-Ahead Logging) is enabled so readers don't block the
//! writer and crash recovery is cheap. SQLite itself serializes
//! writers, which is the storage-layer half of the single-writer
//! discipline; the other half is the [`Ledger`] write lock below.
//!
//! ## The Write Lock
//! Several engine operations are read-modify-write spans ("check
//! stock, then write new quantity"). Two such spans must never
//! interleave, so the `Ledger` exposes one `tokio::sync::Mutex` that
//! every mutating engine operation holds from its first read to its
//! final commit. Reads that don't feed a write skip the lock.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::repository::cash::CashRepository;
use crate::repository::product::ProductRepository;
use crate::repository::receivable::ReceivableRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::settings::SettingsRepository;
use crate::schema;

// =============================================================================
// Configuration
// =============================================================================

/// Ledger store configuration.
///
/// ```rust,ignore
/// let config = StoreConfig::new("/path/to/ledger.db").max_connections(5);
/// let ledger = Ledger::new(config).await?;
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file. Created if missing.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (plenty for a single-terminal store)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    pub min_connections: u32,

    /// Timeout for acquiring a connection from the pool.
    pub connect_timeout: Duration,

    /// Idle timeout before a connection above the minimum is closed.
    pub idle_timeout: Duration,

    /// Whether to run the schema pass (create + upgrade) on open.
    pub run_schema_upgrade: bool,
}

impl StoreConfig {
    /// Creates a configuration pointing at the given database file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_schema_upgrade: true,
        }
    }

    /// In-memory store for tests. A single connection is mandatory:
    /// every `:memory:` connection is its own database.
    pub fn in_memory() -> Self {
        StoreConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            run_schema_upgrade: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection acquire timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether the schema pass runs on open.
    pub fn run_schema_upgrade(mut self, run: bool) -> Self {
        self.run_schema_upgrade = run;
        self
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// Main store handle: the pool, the write lock and repository access.
///
/// Cheap to clone; clones share the pool and the lock.
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl Ledger {
    /// Opens (or creates) the store.
    ///
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite: WAL journal, NORMAL synchronous, foreign
    ///    keys on
    /// 3. Builds the connection pool
    /// 4. Runs the schema pass (unless disabled in the config)
    pub async fn new(config: StoreConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening ledger store"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Ledger pool created"
        );

        let ledger = Ledger {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        };

        if config.run_schema_upgrade {
            schema::ensure_schema(&ledger.pool).await?;
        }

        Ok(ledger)
    }

    /// Acquires the store-wide write lock.
    ///
    /// Every mutating engine operation holds this guard across its
    /// whole read-modify-write span, so "check stock then write new
    /// quantity" can never interleave with another mutation of the
    /// same row. Held only for sub-second spans; nothing blocks
    /// indefinitely.
    pub async fn write_guard(&self) -> OwnedMutexGuard<()> {
        self.write_lock.clone().lock_owned().await
    }

    /// Returns the underlying connection pool, for transactions and
    /// queries not covered by the repositories.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Product catalog repository.
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    /// Cash-sale ledger repository.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Store-credit repository.
    pub fn receivables(&self) -> ReceivableRepository {
        ReceivableRepository::new(self.pool.clone())
    }

    /// Cash session / movement repository.
    pub fn cash(&self) -> CashRepository {
        CashRepository::new(self.pool.clone())
    }

    /// Persisted key/value settings repository.
    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.pool.clone())
    }

    /// Closes the connection pool. Call on shutdown; all repository
    /// operations fail afterwards.
    pub async fn close(&self) {
        info!("Closing ledger store");
        self.pool.close().await;
    }

    /// Checks the store can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_store_opens_and_answers() {
        let ledger = Ledger::new(StoreConfig::in_memory()).await.unwrap();
        assert!(ledger.health_check().await);
    }

    #[tokio::test]
    async fn config_builder() {
        let config = StoreConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .run_schema_upgrade(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_schema_upgrade);
    }

    #[tokio::test]
    async fn write_guard_serializes() {
        let ledger = Ledger::new(StoreConfig::in_memory()).await.unwrap();

        let guard = ledger.write_guard().await;
        // A second acquisition attempt must block while the first span
        // is still in flight.
        assert!(ledger.write_lock.try_lock().is_err());
        drop(guard);
        assert!(ledger.write_lock.try_lock().is_ok());
    }
}
