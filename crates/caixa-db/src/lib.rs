//! # caixa-db: Storage Layer for Caixa
//!
//! SQLite storage of sale records, CSV interchange and the [`Ledger`] facade
//! the front end drives.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caixa Data Flow                                  │
//! │                                                                         │
//! │  CLI command (caixa record Guppy 3 4,50)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     caixa-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Ledger     │    │ SaleRepository│    │ interchange  │  │   │
//! │  │   │ (ledger.rs)   │───►│  (sale.rs)    │    │ (CSV files)  │  │   │
//! │  │   │               │───────────────────────►│              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                                │   │
//! │  │                        ┌───────┴───────┐                        │   │
//! │  │                        │   Database    │  one connection,       │   │
//! │  │                        │   (pool.rs)   │  schema bootstrap      │   │
//! │  │                        └───────────────┘                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                SQLite file (Historico.db)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Opening and closing the store
//! - [`schema`] - Create-if-absent table setup and layout detection
//! - [`repository`] - SQL for the `saidas` table
//! - [`interchange`] - CSV export/import
//! - [`ledger`] - The operations a front end calls
//! - [`error`] - Error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caixa_db::{DbConfig, Ledger};
//! use caixa_core::SaleFilter;
//!
//! let ledger = Ledger::open(DbConfig::default()).await?;
//!
//! ledger.create("Guppy", "3", "4,50").await?;
//! let guppies = ledger.list(&SaleFilter::all().with_name("guppy")).await?;
//! let today = ledger.sum_for_today().await?;
//!
//! ledger.close().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod error;
pub mod interchange;
pub mod ledger;
pub mod pool;
pub mod repository;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use clock::SystemClock;
pub use error::{DbError, DbResult, ErrorKind, LedgerError, LedgerResult};
pub use interchange::{ExportOptions, ExportOutcome, ImportedSale};
pub use ledger::{CloseOutcome, DaySummary, ImportSummary, Ledger};
pub use pool::{Database, DbConfig, DEFAULT_DATABASE_FILE};
pub use schema::SchemaLayout;

// Repository re-exports for convenience
pub use repository::sale::{ClosedDay, SaleRepository};
