//! # Projection Module
//!
//! The filtered and sorted subset of records currently shown to the user.
//!
//! ## Projection vs Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Storage (all rows) ──► SaleFilter ──► Projection ──► sort_by(column)  │
//! │                                            │                            │
//! │                                            ├──► running_total()        │
//! │                                            └──► export                 │
//! │                                                                         │
//! │  A projection is a transient view. It is rebuilt from storage after    │
//! │  every mutation and never written back.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::{AmountOverflow, ValidationError, ValidationResult};
use crate::money::Money;
use crate::types::SaleRecord;
use crate::validation;

// =============================================================================
// Filter
// =============================================================================

/// Name and day-range criteria. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleFilter {
    /// Case-insensitive substring of the record name.
    pub name_pattern: Option<String>,

    /// Inclusive lower bound on `day`.
    pub day_from: Option<NaiveDate>,

    /// Inclusive upper bound on `day`.
    pub day_to: Option<NaiveDate>,
}

impl SaleFilter {
    /// Matches every record.
    pub fn all() -> Self {
        SaleFilter::default()
    }

    /// Matches the records of a single day.
    pub fn for_day(day: NaiveDate) -> Self {
        SaleFilter {
            name_pattern: None,
            day_from: Some(day),
            day_to: Some(day),
        }
    }

    /// Builds a filter from the raw strings of the filter bar.
    ///
    /// Blank fields mean "no constraint".
    ///
    /// ```rust
    /// use caixa_core::SaleFilter;
    ///
    /// let filter = SaleFilter::parse(Some("upp"), Some("2024-06-15"), None).unwrap();
    /// assert_eq!(filter.name_pattern.as_deref(), Some("upp"));
    /// assert!(SaleFilter::parse(None, Some("15/06"), None).is_err());
    /// ```
    pub fn parse(
        name: Option<&str>,
        day_from: Option<&str>,
        day_to: Option<&str>,
    ) -> ValidationResult<Self> {
        Ok(SaleFilter {
            name_pattern: name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            day_from: validation::parse_optional_day("from", day_from)?,
            day_to: validation::parse_optional_day("to", day_to)?,
        })
    }

    pub fn with_name(mut self, pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        self.name_pattern = if pattern.trim().is_empty() {
            None
        } else {
            Some(pattern.trim().to_string())
        };
        self
    }

    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.day_from = from;
        self.day_to = to;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name_pattern.is_none() && self.day_from.is_none() && self.day_to.is_none()
    }

    /// Case-insensitive substring test.
    pub fn matches_name(&self, name: &str) -> bool {
        match &self.name_pattern {
            Some(pattern) => name.to_lowercase().contains(&pattern.to_lowercase()),
            None => true,
        }
    }

    /// Inclusive on both bounds.
    pub fn matches_day(&self, day: NaiveDate) -> bool {
        self.day_from.map_or(true, |from| day >= from) && self.day_to.map_or(true, |to| day <= to)
    }

    pub fn matches(&self, record: &SaleRecord) -> bool {
        self.matches_name(&record.name) && self.matches_day(record.day)
    }
}

// =============================================================================
// Sorting
// =============================================================================

/// A sortable column of the history table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    Name,
    Quantity,
    UnitPrice,
    LineAmount,
    Timestamp,
}

impl Column {
    /// Numeric columns compare by value, the others by text.
    fn compare(&self, a: &SaleRecord, b: &SaleRecord) -> Ordering {
        match self {
            Column::Id => a.id.cmp(&b.id),
            Column::Name => a.name.cmp(&b.name),
            Column::Quantity => a.quantity.cmp(&b.quantity),
            Column::UnitPrice => a.unit_price.cmp(&b.unit_price),
            // An amount too large to compute sorts first.
            Column::LineAmount => a.line_amount().ok().cmp(&b.line_amount().ok()),
            Column::Timestamp => a.timestamp.cmp(&b.timestamp),
        }
    }
}

impl std::str::FromStr for Column {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(Column::Id),
            "name" | "product" | "produto" => Ok(Column::Name),
            "quantity" | "qty" | "quantidade" => Ok(Column::Quantity),
            "price" | "value" | "valor" | "unit_price" => Ok(Column::UnitPrice),
            "amount" | "line_amount" | "total" => Ok(Column::LineAmount),
            "date" | "timestamp" | "data" => Ok(Column::Timestamp),
            _ => Err(ValidationError::NotAllowed {
                field: "column".to_string(),
                allowed: ["id", "name", "quantity", "price", "amount", "date"]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

// =============================================================================
// Projection
// =============================================================================

/// Rows currently displayed, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    rows: Vec<SaleRecord>,
}

impl Projection {
    /// Wraps rows that are already filtered (e.g. straight from storage).
    pub fn new(rows: Vec<SaleRecord>) -> Self {
        Projection { rows }
    }

    /// Keeps the records matching `filter`, preserving their order.
    pub fn filtered(records: impl IntoIterator<Item = SaleRecord>, filter: &SaleFilter) -> Self {
        Projection {
            rows: records.into_iter().filter(|r| filter.matches(r)).collect(),
        }
    }

    pub fn rows(&self) -> &[SaleRecord] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<SaleRecord> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Re-orders the displayed rows by one column. Stable.
    pub fn sort_by(&mut self, column: Column, direction: SortDirection) {
        self.rows.sort_by(|a, b| {
            let ordering = column.compare(a, b);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    /// Σ quantity × unit price over the displayed rows only.
    pub fn running_total(&self) -> Result<Money, AmountOverflow> {
        SaleRecord::total(&self.rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleId;

    fn ids(projection: &Projection) -> Vec<SaleId> {
        projection.rows().iter().map(|r| r.id).collect()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn record(id: i64, name: &str, quantity: i64, cents: i64, d: u32) -> SaleRecord {
        let timestamp = day(d).and_hms_opt(10, id as u32 % 60, 0).unwrap();
        SaleRecord {
            id: SaleId(id),
            name: name.to_string(),
            quantity,
            unit_price: Money::from_cents(cents),
            timestamp,
            day: timestamp.date(),
        }
    }

    fn sample() -> Vec<SaleRecord> {
        vec![
            record(1, "Guppy", 3, 450, 14),
            record(2, "Neon Tetra", 10, 350, 15),
            record(3, "Ração Alcon", 1, 2990, 15),
            record(4, "guppy macho", 2, 600, 16),
        ]
    }

    #[test]
    fn test_name_filter_is_case_insensitive_substring() {
        let filter = SaleFilter::all().with_name("upp");
        let projection = Projection::filtered(sample(), &filter);
        assert_eq!(ids(&projection), vec![SaleId(1), SaleId(4)]);

        let filter = SaleFilter::all().with_name("RAÇÃO");
        assert_eq!(ids(&Projection::filtered(sample(), &filter)), vec![SaleId(3)]);
    }

    #[test]
    fn test_day_range_is_inclusive() {
        let r = record(9, "Betta", 1, 1500, 15);

        let from_same_day = SaleFilter::all().between(Some(day(15)), None);
        assert!(from_same_day.matches(&r));

        let from_next_day = SaleFilter::all().between(Some(day(16)), None);
        assert!(!from_next_day.matches(&r));

        let to_same_day = SaleFilter::all().between(None, Some(day(15)));
        assert!(to_same_day.matches(&r));
    }

    #[test]
    fn test_reversed_range_matches_nothing() {
        let filter = SaleFilter::all().between(Some(day(16)), Some(day(14)));
        assert!(Projection::filtered(sample(), &filter).is_empty());
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = SaleFilter::parse(Some("  "), Some(""), None).unwrap();
        assert!(filter.is_empty());
        assert_eq!(Projection::filtered(sample(), &filter).len(), 4);
    }

    #[test]
    fn test_running_total_only_counts_displayed_rows() {
        let filter = SaleFilter::for_day(day(15));
        let projection = Projection::filtered(sample(), &filter);
        // 10 × 3,50 + 1 × 29,90
        assert_eq!(projection.running_total().unwrap().cents(), 6490);

        let mut with_outsider = sample();
        with_outsider.push(record(5, "Kinguio", 5, 1000, 20));
        let projection = Projection::filtered(with_outsider, &filter);
        assert_eq!(projection.running_total().unwrap().cents(), 6490);
    }

    #[test]
    fn test_sort_numeric_columns_by_value() {
        let mut projection = Projection::new(sample());

        projection.sort_by(Column::Quantity, SortDirection::Ascending);
        assert_eq!(
            ids(&projection),
            vec![SaleId(3), SaleId(4), SaleId(1), SaleId(2)]
        );

        // 13,50 / 35,00 / 29,90 / 12,00
        projection.sort_by(Column::LineAmount, SortDirection::Descending);
        assert_eq!(
            ids(&projection),
            vec![SaleId(2), SaleId(3), SaleId(1), SaleId(4)]
        );

        projection.sort_by(Column::UnitPrice, SortDirection::Ascending);
        assert_eq!(projection.rows()[0].unit_price.cents(), 350);
    }

    #[test]
    fn test_sort_text_columns_lexicographically() {
        let mut projection = Projection::new(sample());
        projection.sort_by(Column::Name, SortDirection::Ascending);
        let names: Vec<&str> = projection.rows().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Guppy", "Neon Tetra", "Ração Alcon", "guppy macho"]);

        projection.sort_by(Column::Timestamp, SortDirection::Descending);
        assert_eq!(projection.rows()[0].id, SaleId(4));
    }

    #[test]
    fn test_running_total_reports_overflow() {
        let mut huge = record(1, "Aquário 500L", 3, 0, 15);
        huge.unit_price = Money::from_micros(i128::MAX / 2);
        let mut projection = Projection::new(vec![huge, record(2, "Guppy", 1, 450, 15)]);

        assert_eq!(projection.running_total(), Err(AmountOverflow));

        projection.sort_by(Column::LineAmount, SortDirection::Ascending);
        assert_eq!(ids(&projection), vec![SaleId(1), SaleId(2)]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut projection = Projection::new(vec![
            record(1, "A", 2, 100, 15),
            record(2, "B", 2, 100, 15),
            record(3, "C", 1, 100, 15),
        ]);
        projection.sort_by(Column::Quantity, SortDirection::Descending);
        assert_eq!(ids(&projection), vec![SaleId(1), SaleId(2), SaleId(3)]);
    }

    #[test]
    fn test_column_from_str() {
        assert_eq!("valor".parse::<Column>().unwrap(), Column::UnitPrice);
        assert_eq!("Date".parse::<Column>().unwrap(), Column::Timestamp);
        assert!("colour".parse::<Column>().is_err());
    }
}
