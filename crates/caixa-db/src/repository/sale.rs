//! # Sale Repository
//!
//! Database operations for the `saidas` table.
//!
//! ## Record Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Record Lifecycle                                  │
//! │                                                                         │
//! │  1. INSERT                                                             │
//! │     └── insert() / insert_batch() → SaleRecord { id: next rowid }      │
//! │                                                                         │
//! │  2. READ                                                               │
//! │     └── list(filter) / get(id) / day_records(day) / sum_for_day(day)   │
//! │                                                                         │
//! │  3. DELETE (records are never updated)                                 │
//! │     ├── delete(ids)        → selected rows                             │
//! │     └── close_day(day, ..) → whole day, only after the export worked   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `valor` is a REAL column (kept for compatibility with existing ledger
//! files). Amounts cross it as reais and keep six decimal places on read, so a
//! price like R$ 0,125 still totals exactly. Everything above this module
//! works in [`Money`].

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use sqlx::sqlite::SqliteArguments;
use sqlx::query::Query;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::schema::SchemaLayout;
use caixa_core::{Money, NewSale, SaleFilter, SaleId, SaleRecord, DAY_FORMAT, TIMESTAMP_FORMAT};

const INSERT_WITH_DAY: &str =
    "INSERT INTO saidas (nome, quantidade, valor, data, dia) VALUES (?1, ?2, ?3, ?4, ?5)";

const INSERT_WITHOUT_DAY: &str =
    "INSERT INTO saidas (nome, quantidade, valor, data) VALUES (?1, ?2, ?3, ?4)";

/// Raw `saidas` row.
#[derive(Debug, sqlx::FromRow)]
struct SaidaRow {
    id: i64,
    nome: String,
    quantidade: i64,
    valor: f64,
    data: String,
    dia: String,
}

impl SaidaRow {
    fn into_record(self) -> DbResult<SaleRecord> {
        let timestamp = NaiveDateTime::parse_from_str(&self.data, TIMESTAMP_FORMAT).map_err(|e| {
            DbError::CorruptRow {
                id: self.id,
                reason: format!("data '{}': {}", self.data, e),
            }
        })?;
        let day = NaiveDate::parse_from_str(&self.dia, DAY_FORMAT).map_err(|e| {
            DbError::CorruptRow {
                id: self.id,
                reason: format!("dia '{}': {}", self.dia, e),
            }
        })?;
        let unit_price = Money::from_reais_f64(self.valor).ok_or_else(|| DbError::CorruptRow {
            id: self.id,
            reason: format!("valor {} is out of range", self.valor),
        })?;

        Ok(SaleRecord {
            id: SaleId(self.id),
            name: self.nome,
            quantity: self.quantidade,
            unit_price,
            timestamp,
            day,
        })
    }
}

/// Result of a successful [`SaleRepository::close_day`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedDay {
    pub day: NaiveDate,
    /// The purged records, oldest first.
    pub records: Vec<SaleRecord>,
    /// Σ quantity × unit price of `records`.
    pub total: Money,
    /// Rows actually deleted.
    pub removed: u64,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    layout: SchemaLayout,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool, layout: SchemaLayout) -> Self {
        SaleRepository { pool, layout }
    }

    fn select_sql(&self) -> String {
        format!(
            "SELECT id, nome, quantidade, valor, data, {} AS dia FROM saidas",
            self.layout.day_expr()
        )
    }

    fn insert_query(
        &self,
        sale: &NewSale,
        timestamp: NaiveDateTime,
    ) -> Query<'static, Sqlite, SqliteArguments<'static>> {
        let sql = if self.layout.has_day_column {
            INSERT_WITH_DAY
        } else {
            INSERT_WITHOUT_DAY
        };

        let query = sqlx::query(sql)
            .bind(sale.name.clone())
            .bind(sale.quantity)
            .bind(sale.unit_price.to_reais_f64())
            .bind(timestamp.format(TIMESTAMP_FORMAT).to_string());

        if self.layout.has_day_column {
            query.bind(timestamp.date().format(DAY_FORMAT).to_string())
        } else {
            query
        }
    }

    /// Stores a validated sale stamped with `timestamp`.
    ///
    /// ## Returns
    /// The stored record, with the id SQLite assigned.
    pub async fn insert(&self, sale: &NewSale, timestamp: NaiveDateTime) -> DbResult<SaleRecord> {
        let timestamp = whole_seconds(timestamp);

        debug!(name = %sale.name, quantity = sale.quantity, "Inserting sale");

        let result = self.insert_query(sale, timestamp).execute(&self.pool).await?;

        Ok(stored_record(result.last_insert_rowid(), sale, timestamp))
    }

    /// Stores many sales in one transaction. Any failure stores none of them.
    pub async fn insert_batch(
        &self,
        sales: &[(NewSale, NaiveDateTime)],
    ) -> DbResult<Vec<SaleRecord>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut records = Vec::with_capacity(sales.len());
        for (sale, timestamp) in sales {
            let timestamp = whole_seconds(*timestamp);
            let result = self.insert_query(sale, timestamp).execute(&mut *tx).await?;
            records.push(stored_record(result.last_insert_rowid(), sale, timestamp));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(count = records.len(), "Inserted sale batch");
        Ok(records)
    }

    /// Lists records matching `filter`, newest first.
    ///
    /// Day bounds are applied in SQL. The name test runs on the decoded rows
    /// so that case folding covers accented names (SQLite's LOWER/LIKE only
    /// fold ASCII).
    pub async fn list(&self, filter: &SaleFilter) -> DbResult<Vec<SaleRecord>> {
        let day_expr = self.layout.day_expr();

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(self.select_sql());
        query.push(" WHERE 1 = 1");

        if let Some(from) = filter.day_from {
            query
                .push(format!(" AND {} >= ", day_expr))
                .push_bind(from.format(DAY_FORMAT).to_string());
        }
        if let Some(to) = filter.day_to {
            query
                .push(format!(" AND {} <= ", day_expr))
                .push_bind(to.format(DAY_FORMAT).to_string());
        }

        query.push(" ORDER BY data DESC, id DESC");

        let rows: Vec<SaidaRow> = query.build_query_as().fetch_all(&self.pool).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let record = row.into_record()?;
            if filter.matches_name(&record.name) {
                records.push(record);
            }
        }

        debug!(count = records.len(), ?filter, "Listed sales");
        Ok(records)
    }

    /// Gets a record by id.
    pub async fn get(&self, id: SaleId) -> DbResult<Option<SaleRecord>> {
        let sql = format!("{} WHERE id = ?1", self.select_sql());

        let row: Option<SaidaRow> = sqlx::query_as(&sql)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        row.map(SaidaRow::into_record).transpose()
    }

    /// Deletes the given ids in one transaction.
    ///
    /// Ids that don't exist (or were already deleted) are skipped.
    ///
    /// ## Returns
    /// Number of rows actually removed.
    pub async fn delete(&self, ids: &[SaleId]) -> DbResult<u64> {
        let unique: BTreeSet<SaleId> = ids.iter().copied().collect();
        if unique.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut removed = 0;
        for id in &unique {
            removed += sqlx::query("DELETE FROM saidas WHERE id = ?1")
                .bind(id.get())
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(requested = unique.len(), removed, "Deleted sales");
        Ok(removed)
    }

    fn day_sql(&self) -> String {
        format!(
            "{} WHERE {} = ?1 ORDER BY data ASC, id ASC",
            self.select_sql(),
            self.layout.day_expr()
        )
    }

    /// All records of one day, oldest first, ignoring any filter.
    pub async fn day_records(&self, day: NaiveDate) -> DbResult<Vec<SaleRecord>> {
        let rows: Vec<SaidaRow> = sqlx::query_as(&self.day_sql())
            .bind(day.format(DAY_FORMAT).to_string())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(SaidaRow::into_record).collect()
    }

    /// Σ quantity × unit price over one day, at full precision.
    pub async fn sum_for_day(&self, day: NaiveDate) -> DbResult<Money> {
        let records = self.day_records(day).await?;
        Ok(SaleRecord::total(&records)?)
    }

    /// Reads, exports and purges one day inside a single transaction.
    ///
    /// ## Steps
    /// ```text
    /// BEGIN
    ///   SELECT day's rows ──► none? ROLLBACK, return None (export not called)
    ///   export(records, total) ──► Err? ROLLBACK, nothing deleted
    ///   DELETE day's rows
    /// COMMIT
    /// ```
    pub async fn close_day<F, E>(&self, day: NaiveDate, export: F) -> Result<Option<ClosedDay>, E>
    where
        F: FnOnce(&[SaleRecord], Money) -> Result<(), E>,
        E: From<DbError>,
    {
        let day_text = day.format(DAY_FORMAT).to_string();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let rows: Vec<SaidaRow> = sqlx::query_as(&self.day_sql())
            .bind(&day_text)
            .fetch_all(&mut *tx)
            .await
            .map_err(DbError::from)?;

        if rows.is_empty() {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            debug!(%day, "No sales to close");
            return Ok(None);
        }

        let records = rows
            .into_iter()
            .map(SaidaRow::into_record)
            .collect::<DbResult<Vec<_>>>()?;
        let total = SaleRecord::total(&records).map_err(DbError::from)?;

        // Dropping `tx` on error rolls the transaction back.
        export(&records, total)?;

        let removed = sqlx::query(&format!(
            "DELETE FROM saidas WHERE {} = ?1",
            self.layout.day_expr()
        ))
        .bind(&day_text)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?
        .rows_affected();

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(%day, removed, total = %total, "Closed day");

        Ok(Some(ClosedDay {
            day,
            records,
            total,
            removed,
        }))
    }

    /// Counts stored records (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM saidas")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn stored_record(id: i64, sale: &NewSale, timestamp: NaiveDateTime) -> SaleRecord {
    SaleRecord {
        id: SaleId(id),
        name: sale.name.clone(),
        quantity: sale.quantity,
        unit_price: sale.unit_price,
        timestamp,
        day: timestamp.date(),
    }
}

/// Storage keeps second resolution.
fn whole_seconds(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp.with_nanosecond(0).unwrap_or(timestamp)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn sale(name: &str, quantity: i64, cents: i64) -> NewSale {
        NewSale {
            name: name.to_string(),
            quantity,
            unit_price: Money::from_cents(cents),
        }
    }

    async fn repo() -> SaleRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().sales()
    }

    async fn seeded() -> SaleRepository {
        let repo = repo().await;
        repo.insert(&sale("Guppy", 3, 450), at(14, 9, 0)).await.unwrap();
        repo.insert(&sale("Neon Tetra", 10, 350), at(15, 10, 0)).await.unwrap();
        repo.insert(&sale("Ração Alcon", 1, 2990), at(15, 16, 30)).await.unwrap();
        repo.insert(&sale("Guppy macho", 2, 600), at(16, 11, 0)).await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_insert_then_list_returns_equal_record() {
        let repo = seeded().await;
        let before = repo.list(&SaleFilter::all()).await.unwrap();
        let max_id = before.iter().map(|r| r.id).max().unwrap();

        let stored = repo.insert(&sale("Betta", 1, 1999), at(17, 8, 15)).await.unwrap();
        assert!(stored.id > max_id);

        let after = repo.list(&SaleFilter::all()).await.unwrap();
        assert_eq!(after.len(), before.len() + 1);

        let matching: Vec<_> = after.iter().filter(|r| r.id == stored.id).collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0], &stored);
        assert_eq!(matching[0].unit_price.cents(), 1999);
        assert_eq!(matching[0].day_text(), "2024-06-17");
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_deterministic() {
        let repo = seeded().await;

        let first = repo.list(&SaleFilter::all()).await.unwrap();
        let second = repo.list(&SaleFilter::all()).await.unwrap();
        assert_eq!(first, second);

        let names: Vec<&str> = first.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Guppy macho", "Ração Alcon", "Neon Tetra", "Guppy"]);
    }

    #[tokio::test]
    async fn test_same_second_ties_break_by_id() {
        let repo = repo().await;
        let a = repo.insert(&sale("A", 1, 100), at(15, 10, 0)).await.unwrap();
        let b = repo.insert(&sale("B", 1, 100), at(15, 10, 0)).await.unwrap();

        let listed = repo.list(&SaleFilter::all()).await.unwrap();
        assert_eq!(listed[0].id, b.id);
        assert_eq!(listed[1].id, a.id);
    }

    #[tokio::test]
    async fn test_name_filter_case_insensitive() {
        let repo = seeded().await;

        let filter = SaleFilter::all().with_name("upp");
        let found = repo.list(&filter).await.unwrap();
        assert_eq!(found.len(), 2);

        let filter = SaleFilter::all().with_name("RAÇÃO");
        let found = repo.list(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ração Alcon");
    }

    #[tokio::test]
    async fn test_day_range_inclusive() {
        let repo = seeded().await;
        let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();

        let filter = SaleFilter::all().between(Some(day(15)), None);
        assert_eq!(repo.list(&filter).await.unwrap().len(), 3);

        let filter = SaleFilter::all().between(Some(day(16)), None);
        assert_eq!(repo.list(&filter).await.unwrap().len(), 1);

        let filter = SaleFilter::for_day(day(15));
        assert_eq!(repo.list(&filter).await.unwrap().len(), 2);

        let filter = SaleFilter::all().between(Some(day(16)), Some(day(14)));
        assert!(repo.list(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = seeded().await;
        let all = repo.list(&SaleFilter::all()).await.unwrap();
        let target = all[0].id;

        assert_eq!(repo.delete(&[target]).await.unwrap(), 1);
        assert!(repo.get(target).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 3);

        assert_eq!(repo.delete(&[target]).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_delete_skips_missing_and_duplicate_ids() {
        let repo = seeded().await;
        let all = repo.list(&SaleFilter::all()).await.unwrap();

        let removed = repo
            .delete(&[all[1].id, SaleId(9999), all[1].id, all[2].id])
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(repo.delete(&[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sum_for_day_multiplies_quantity() {
        let repo = seeded().await;
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        // 10 × 3,50 + 1 × 29,90
        assert_eq!(repo.sum_for_day(day).await.unwrap().cents(), 6490);

        let empty = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(repo.sum_for_day(empty).await.unwrap().is_zero());
    }

    #[tokio::test]
    async fn test_close_day_purges_after_export() {
        let repo = seeded().await;
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        let mut exported = Vec::new();
        let closed = repo
            .close_day(day, |records, total| -> Result<(), DbError> {
                exported = records.to_vec();
                assert_eq!(total.cents(), 6490);
                Ok(())
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(closed.removed, 2);
        assert_eq!(closed.records, exported);
        assert_eq!(closed.records[0].name, "Neon Tetra");
        assert!(repo.day_records(day).await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_close_day_export_failure_keeps_records() {
        let repo = seeded().await;
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        let result = repo
            .close_day(day, |_, _| Err(DbError::Internal("disk full".to_string())))
            .await;
        assert!(result.is_err());

        assert_eq!(repo.day_records(day).await.unwrap().len(), 2);
        assert_eq!(repo.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_close_empty_day_skips_export() {
        let repo = seeded().await;
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let mut called = false;
        let closed = repo
            .close_day(day, |_, _| -> Result<(), DbError> {
                called = true;
                Ok(())
            })
            .await
            .unwrap();

        assert!(closed.is_none());
        assert!(!called);
        assert_eq!(repo.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_insert_batch() {
        let repo = repo().await;
        let batch = vec![
            (sale("Kinguio", 2, 800), at(15, 9, 0)),
            (sale("Cascudo", 1, 1200), at(15, 9, 5)),
        ];

        let stored = repo.insert_batch(&batch).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored[0].id < stored[1].id);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_ids_are_never_reused_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Historico.db");

        let last = {
            let db = Database::new(DbConfig::new(&path)).await.unwrap();
            let repo = db.sales();
            repo.insert(&sale("Guppy", 1, 450), at(15, 9, 0)).await.unwrap();
            let last = repo.insert(&sale("Betta", 1, 1500), at(15, 9, 1)).await.unwrap();
            assert_eq!(repo.delete(&[last.id]).await.unwrap(), 1);
            db.close().await;
            last
        };

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let next = db
            .sales()
            .insert(&sale("Platy", 1, 700), at(15, 9, 2))
            .await
            .unwrap();
        assert!(next.id > last.id);
        assert_eq!(db.sales().count().await.unwrap(), 2);
        db.close().await;
    }

    #[tokio::test]
    async fn test_legacy_layout_derives_day_from_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legado.db");

        {
            let pool = sqlx::sqlite::SqlitePoolOptions::new()
                .max_connections(1)
                .connect(&format!("sqlite://{}?mode=rwc", path.display()))
                .await
                .unwrap();
            sqlx::query(
                "CREATE TABLE saidas (id INTEGER PRIMARY KEY AUTOINCREMENT, nome TEXT NOT NULL, \
                 quantidade INTEGER NOT NULL, valor REAL NOT NULL, data TEXT NOT NULL)",
            )
            .execute(&pool)
            .await
            .unwrap();
            sqlx::query(
                "INSERT INTO saidas (nome, quantidade, valor, data) \
                 VALUES ('Molinésia', 4, 5.5, '2024-06-15 11:00:00')",
            )
            .execute(&pool)
            .await
            .unwrap();
            pool.close().await;
        }

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let repo = db.sales();
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        repo.insert(&sale("Guppy", 1, 450), at(15, 12, 0)).await.unwrap();
        repo.insert(&sale("Betta", 1, 1500), at(16, 12, 0)).await.unwrap();

        let records = repo.list(&SaleFilter::for_day(day)).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.day == day));

        // 4 × 5,50 + 1 × 4,50
        assert_eq!(repo.sum_for_day(day).await.unwrap().cents(), 2650);
        db.close().await;
    }

    async fn legacy_store(path: &std::path::Path, rows: &[(&str, i64, f64, &str)]) {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&format!("sqlite://{}?mode=rwc", path.display()))
            .await
            .unwrap();
        sqlx::query(
            "CREATE TABLE saidas (id INTEGER PRIMARY KEY AUTOINCREMENT, nome TEXT NOT NULL, \
             quantidade INTEGER NOT NULL, valor REAL NOT NULL, data TEXT NOT NULL, dia TEXT NOT NULL)",
        )
        .execute(&pool)
        .await
        .unwrap();
        for (nome, quantidade, valor, data) in rows {
            sqlx::query("INSERT INTO saidas (nome, quantidade, valor, data, dia) VALUES (?1, ?2, ?3, ?4, ?5)")
                .bind(*nome)
                .bind(*quantidade)
                .bind(*valor)
                .bind(*data)
                .bind(&data[..10])
                .execute(&pool)
                .await
                .unwrap();
        }
        pool.close().await;
    }

    #[tokio::test]
    async fn test_sub_centavo_prices_total_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Historico.db");
        legacy_store(
            &path,
            &[
                ("Artemia 1g", 8, 0.125, "2024-06-15 09:00:00"),
                ("Artemia 1g", 1, 0.125, "2024-06-15 09:30:00"),
                ("Artemia 1g", 1, 0.125, "2024-06-15 10:00:00"),
            ],
        )
        .await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let repo = db.sales();
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        let records = repo.day_records(day).await.unwrap();
        assert_eq!(records[0].unit_price, Money::from_micros(125_000));
        assert_eq!(records[0].line_amount().unwrap().cents(), 100);

        // 8 × 0,125 + 0,125 + 0,125, not 1,00 + 0,13 + 0,13
        let total = repo.sum_for_day(day).await.unwrap();
        assert_eq!(total.micros(), 1_250_000);
        assert_eq!(total.cents(), 125);

        let closed = repo
            .close_day(day, |_, _| -> Result<(), DbError> { Ok(()) })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(closed.total, total);
        db.close().await;
    }

    #[tokio::test]
    async fn test_sub_centavo_price_survives_storage() {
        let repo = repo().await;
        let feed = NewSale {
            name: "Artemia 1g".to_string(),
            quantity: 8,
            unit_price: Money::from_micros(125_000),
        };

        let stored = repo.insert(&feed, at(15, 9, 0)).await.unwrap();
        let read = repo.get(stored.id).await.unwrap().unwrap();
        assert_eq!(read.unit_price, feed.unit_price);
        assert_eq!(read, stored);
    }

    #[tokio::test]
    async fn test_totals_overflow_is_an_error() {
        let repo = repo().await;
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let largest = NewSale {
            name: "Aquário marinho".to_string(),
            quantity: caixa_core::MAX_QUANTITY,
            unit_price: Money::from_cents(caixa_core::MAX_UNIT_PRICE_CENTS),
        };
        let batch: Vec<_> = (0..93).map(|i| (largest.clone(), at(15, 9, i % 60))).collect();
        repo.insert_batch(&batch).await.unwrap();

        // Validated sales alone stay in range.
        let total = repo.sum_for_day(day).await.unwrap();
        assert_eq!(total.cents(), 93 * 100_000_000_000_i128 * 1_000_000);

        // A hand-edited valor can't.
        sqlx::query("UPDATE saidas SET valor = 1e30 WHERE id <= 2")
            .execute(&repo.pool)
            .await
            .unwrap();
        let err = repo.sum_for_day(day).await.unwrap_err();
        assert!(matches!(err, DbError::AmountOverflow(_)));

        let mut called = false;
        let result = repo
            .close_day(day, |_, _| -> Result<(), DbError> {
                called = true;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(DbError::AmountOverflow(_))));
        assert!(!called);
        assert_eq!(repo.count().await.unwrap(), 93);
    }

    #[tokio::test]
    async fn test_unreadable_valor_is_corrupt_row() {
        let repo = repo().await;
        let stored = repo.insert(&sale("Guppy", 1, 450), at(15, 9, 0)).await.unwrap();

        sqlx::query("UPDATE saidas SET valor = 1e300 WHERE id = ?1")
            .bind(stored.id.get())
            .execute(&repo.pool)
            .await
            .unwrap();

        let err = repo.get(stored.id).await.unwrap_err();
        assert!(matches!(err, DbError::CorruptRow { .. }));
    }
}
