//! # Ledger
//!
//! The operations a front end calls. Every one returns [`LedgerResult`].
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Ledger                                         │
//! │                                                                         │
//! │  create(name, qty, price) ── validate ──► insert (stamped by Clock)    │
//! │  list(filter) / projection(filter)                                      │
//! │  delete(ids)                                                            │
//! │  sum_for_day(day) / sum_for_today()                                     │
//! │  export(rows, path)     ── projection rows ──► CSV                      │
//! │  import(path)           ── CSV ──► parse all ──► one transaction        │
//! │  close_register(path)   ── today ──► write report ──► purge            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::clock::SystemClock;
use crate::error::{LedgerError, LedgerResult};
use crate::interchange::{self, ExportOptions, ExportOutcome};
use crate::pool::{Database, DbConfig};
use caixa_core::{Clock, Money, NewSale, Projection, SaleFilter, SaleId, SaleRecord};

/// Records and total of a closed day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub day: NaiveDate,
    /// Oldest first.
    pub records: Vec<SaleRecord>,
    pub total: Money,
}

/// Result of [`Ledger::import`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub path: PathBuf,
    /// Newly stored records, with fresh ids.
    pub imported: Vec<SaleRecord>,
}

impl ImportSummary {
    pub fn count(&self) -> usize {
        self.imported.len()
    }
}

/// Result of [`Ledger::close_register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The day had no records. No file was written.
    NothingToClose { day: NaiveDate },
    /// The report was written and the day purged.
    Closed { summary: DaySummary, path: PathBuf },
}

/// Sales ledger over one store.
#[derive(Debug, Clone)]
pub struct Ledger {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl Ledger {
    /// Opens the store at `config` with the system clock.
    pub async fn open(config: DbConfig) -> LedgerResult<Self> {
        let db = Database::new(config).await?;
        Ok(Ledger::new(db, Arc::new(SystemClock)))
    }

    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Ledger { db, clock }
    }

    /// Validates the raw entry-form strings and stores a sale stamped "now".
    ///
    /// ## Errors
    /// - `Validation` for a blank name, a non-numeric or out-of-range quantity
    ///   or price
    /// - `Storage` if the insert fails
    pub async fn create(&self, name: &str, quantity: &str, unit_price: &str) -> LedgerResult<SaleRecord> {
        let sale = NewSale::parse(name, quantity, unit_price)?;
        self.create_sale(sale).await
    }

    /// Same as [`Ledger::create`] for an already typed sale.
    pub async fn create_sale(&self, sale: NewSale) -> LedgerResult<SaleRecord> {
        let sale = sale.validated()?;
        let record = self.db.sales().insert(&sale, self.clock.now()).await?;

        info!(
            id = %record.id,
            name = %record.name,
            quantity = record.quantity,
            price = %record.unit_price,
            "Recorded sale"
        );
        Ok(record)
    }

    /// Records matching `filter`, newest first.
    pub async fn list(&self, filter: &SaleFilter) -> LedgerResult<Vec<SaleRecord>> {
        Ok(self.db.sales().list(filter).await?)
    }

    /// [`Ledger::list`] wrapped for sorting and totalling.
    pub async fn projection(&self, filter: &SaleFilter) -> LedgerResult<Projection> {
        Ok(Projection::new(self.list(filter).await?))
    }

    pub async fn get(&self, id: SaleId) -> LedgerResult<Option<SaleRecord>> {
        Ok(self.db.sales().get(id).await?)
    }

    /// Deletes the given ids. Unknown ids are skipped.
    ///
    /// ## Returns
    /// Number of records removed.
    pub async fn delete(&self, ids: &[SaleId]) -> LedgerResult<u64> {
        Ok(self.db.sales().delete(ids).await?)
    }

    /// Σ quantity × unit price over every stored record of `day`.
    pub async fn sum_for_day(&self, day: NaiveDate) -> LedgerResult<Money> {
        Ok(self.db.sales().sum_for_day(day).await?)
    }

    pub async fn sum_for_today(&self) -> LedgerResult<Money> {
        self.sum_for_day(self.today()).await
    }

    /// The local date the ledger treats as today.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Writes `rows` (normally the current projection) to `path`.
    pub fn export(
        &self,
        rows: &[SaleRecord],
        path: &Path,
        options: ExportOptions,
    ) -> LedgerResult<ExportOutcome> {
        let outcome = interchange::export(rows, path, options)?;
        if outcome == ExportOutcome::NothingToExport {
            warn!(path = %path.display(), "Nothing to export");
        }
        Ok(outcome)
    }

    /// Imports a previously exported file.
    ///
    /// Every row is parsed first and all inserts share one transaction, so a
    /// bad row or a failed insert leaves the store unchanged.
    pub async fn import(&self, path: &Path) -> LedgerResult<ImportSummary> {
        let rows = interchange::read_file(path)?;

        let batch: Vec<(NewSale, NaiveDateTime)> = rows
            .into_iter()
            .map(|row| (row.sale, row.timestamp))
            .collect();

        let imported = self.db.sales().insert_batch(&batch).await?;

        info!(path = %path.display(), count = imported.len(), "Imported sales");

        Ok(ImportSummary {
            path: path.to_path_buf(),
            imported,
        })
    }

    /// Closes the register for today: writes the day's report to `path`, then
    /// deletes the day's records.
    ///
    /// If the report can't be written nothing is deleted.
    pub async fn close_register(&self, path: &Path) -> LedgerResult<CloseOutcome> {
        self.close_day(self.clock.today(), path).await
    }

    async fn close_day(&self, day: NaiveDate, path: &Path) -> LedgerResult<CloseOutcome> {
        let closed = self
            .db
            .sales()
            .close_day(day, |records, total| -> LedgerResult<()> {
                let bytes = interchange::encode_close_report(records, total, day)
                    .map_err(|e| LedgerError::csv(path, e))?;
                interchange::write_file(path, &bytes)
            })
            .await?;

        let Some(closed) = closed else {
            warn!(%day, "Nothing to close");
            return Ok(CloseOutcome::NothingToClose { day });
        };

        info!(
            %day,
            path = %path.display(),
            count = closed.records.len(),
            total = %closed.total,
            "Register closed"
        );

        Ok(CloseOutcome::Closed {
            summary: DaySummary {
                day: closed.day,
                records: closed.records,
                total: closed.total,
            },
            path: path.to_path_buf(),
        })
    }

    /// Closes the store. Call once on shutdown.
    pub async fn close(&self) {
        self.db.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
