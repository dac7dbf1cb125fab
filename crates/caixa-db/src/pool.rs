//! # Database Handle
//!
//! Opens the single SQLite connection the ledger uses for its whole lifetime.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Lifecycle                                 │
//! │                                                                         │
//! │  Startup                                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Historico.db by default                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await                                           │
//! │       ├── open exactly one connection                                  │
//! │       └── schema::bootstrap (create-if-absent, detect layout)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.sales() ... every operation runs on that one connection            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.close().await ← once, on shutdown                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::sale::SaleRepository;
use crate::schema::{self, SchemaLayout};

/// File name of the ledger store, relative to the working directory unless
/// configured otherwise.
pub const DEFAULT_DATABASE_FILE: &str = "Historico.db";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/Historico.db")
///     .connect_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// How long to wait for the connection to open.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Whether to create the `saidas` table on connect.
    /// Default: true
    pub bootstrap_schema: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// The file is created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            connect_timeout: Duration::from_secs(30),
            bootstrap_schema: true,
        }
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to create the schema on connect.
    pub fn bootstrap_schema(mut self, bootstrap: bool) -> Self {
        self.bootstrap_schema = bootstrap;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// Every call yields an isolated database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            connect_timeout: Duration::from_secs(5),
            bootstrap_schema: true,
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig::new(DEFAULT_DATABASE_FILE)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Owned handle to the ledger store.
///
/// Holds a pool capped at one connection, so the connection is opened once and
/// reused by every operation until [`Database::close`]. Nothing is global:
/// tests open as many isolated in-memory handles as they like.
#[derive(Debug, Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
    pub(crate) layout: SchemaLayout,
}

impl Database {
    /// Opens the store and prepares the `saidas` table.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite:
    ///    - WAL journal
    ///    - NORMAL synchronous (each committed write survives a crash of the app)
    /// 3. Opens the single connection
    /// 4. Creates the table if absent and detects its layout
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);

        debug!("Connection options configured");

        // One connection for the life of the process. No idle reaping, so an
        // in-memory database is never dropped between operations.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        let layout = if config.bootstrap_schema {
            schema::bootstrap(&pool).await?
        } else {
            schema::detect_layout(&pool).await?
        };

        info!(has_day_column = layout.has_day_column, "Database ready");

        Ok(Database { pool, layout })
    }

    /// Returns the sale repository.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone(), self.layout)
    }

    /// Closes the connection.
    ///
    /// After calling close, all repository operations fail.
    pub async fn close(&self) {
        info!("Closing database connection");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert_eq!(db.sales().count().await.unwrap(), 0);
        assert!(db.layout.has_day_column);
    }

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let a = Database::new(DbConfig::in_memory()).await.unwrap();
        let b = Database::new(DbConfig::in_memory()).await.unwrap();

        sqlx::query("INSERT INTO saidas (nome, quantidade, valor, data, dia) VALUES ('Betta', 1, 15.0, '2024-06-15 10:00:00', '2024-06-15')")
            .execute(&a.pool)
            .await
            .unwrap();

        assert_eq!(a.sales().count().await.unwrap(), 1);
        assert_eq!(b.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_close_makes_operations_fail() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(db.sales().count().await.is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/caixa.db")
            .connect_timeout(Duration::from_secs(2))
            .bootstrap_schema(false);

        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert!(!config.bootstrap_schema);
        assert_eq!(DbConfig::default().database_path, PathBuf::from("Historico.db"));
    }
}
