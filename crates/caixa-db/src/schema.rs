//! # Schema Bootstrap
//!
//! Create-if-absent setup of the `saidas` table. There are no migrations.
//!
//! ## Layout Detection
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Startup                                            │
//! │                                                                         │
//! │  CREATE TABLE IF NOT EXISTS saidas (... dia TEXT NOT NULL)             │
//! │       │                                                                 │
//! │       ├── new file           → canonical table, with `dia`             │
//! │       └── existing ledger    → left untouched                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  pragma_table_info('saidas')                                           │
//! │       │                                                                 │
//! │       ├── has `dia`   → filter on the column (indexed)                 │
//! │       └── no `dia`    → filter on substr(data, 1, 10)                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{DbError, DbResult};

/// Name of the sales table.
pub const SALES_TABLE: &str = "saidas";

const CREATE_SALES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS saidas (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        nome TEXT NOT NULL,
        quantidade INTEGER NOT NULL,
        valor REAL NOT NULL,
        data TEXT NOT NULL,
        dia TEXT NOT NULL
    )
"#;

const CREATE_DAY_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_saidas_dia ON saidas (dia)";

/// Columns every layout must have.
const REQUIRED_COLUMNS: [&str; 5] = ["id", "nome", "quantidade", "valor", "data"];

/// How the `saidas` table in this file is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaLayout {
    /// Whether the day is persisted in its own `dia` column.
    pub has_day_column: bool,
}

impl SchemaLayout {
    /// SQL expression yielding the `YYYY-MM-DD` day of a row.
    pub fn day_expr(&self) -> &'static str {
        if self.has_day_column {
            "dia"
        } else {
            "substr(data, 1, 10)"
        }
    }
}

/// Creates the table when absent, then detects its layout.
pub async fn bootstrap(pool: &SqlitePool) -> DbResult<SchemaLayout> {
    sqlx::query(CREATE_SALES_TABLE)
        .execute(pool)
        .await
        .map_err(|e| DbError::SchemaFailed(e.to_string()))?;

    let layout = detect_layout(pool).await?;

    if layout.has_day_column {
        sqlx::query(CREATE_DAY_INDEX)
            .execute(pool)
            .await
            .map_err(|e| DbError::SchemaFailed(e.to_string()))?;
    } else {
        warn!("Table saidas has no dia column; days are derived from data");
    }

    Ok(layout)
}

/// Inspects the existing `saidas` table.
pub async fn detect_layout(pool: &SqlitePool) -> DbResult<SchemaLayout> {
    let columns: Vec<String> =
        sqlx::query_scalar("SELECT name FROM pragma_table_info('saidas')")
            .fetch_all(pool)
            .await
            .map_err(|e| DbError::SchemaFailed(e.to_string()))?;

    if columns.is_empty() {
        return Err(DbError::SchemaFailed(format!(
            "table {} does not exist",
            SALES_TABLE
        )));
    }

    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|required| !columns.iter().any(|c| c == *required))
    {
        return Err(DbError::SchemaFailed(format!(
            "table {} is missing column {}",
            SALES_TABLE, missing
        )));
    }

    let layout = SchemaLayout {
        has_day_column: columns.iter().any(|c| c == "dia"),
    };

    info!(?layout, "Detected saidas layout");
    Ok(layout)
}
