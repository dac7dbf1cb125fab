//! # Domain Types
//!
//! The sale record and its input form.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        create()        ┌─────────────────┐        │
//! │  │    NewSale      │ ─────────────────────► │   SaleRecord    │        │
//! │  │  ─────────────  │   storage assigns id   │  ─────────────  │        │
//! │  │  name           │   clock stamps time    │  id (SaleId)    │        │
//! │  │  quantity       │                        │  name           │        │
//! │  │  unit_price     │                        │  quantity       │        │
//! │  └─────────────────┘                        │  unit_price     │        │
//! │                                             │  timestamp      │        │
//! │                                             │  day            │        │
//! │                                             └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records are immutable once stored: there is no update, only delete.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AmountOverflow, ValidationResult};
use crate::money::Money;
use crate::validation;

/// Storage/interchange rendering of a sale timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// ISO 8601 rendering of a calendar day.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Sale Id
// =============================================================================

/// Identifier assigned by storage. Monotonic and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleId(pub i64);

impl SaleId {
    #[inline]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SaleId {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validation::parse_sale_id(s)
    }
}

// =============================================================================
// New Sale
// =============================================================================

/// A validated sale that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSale {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl NewSale {
    /// Builds a sale from the raw strings typed in the entry form.
    ///
    /// ```rust
    /// use caixa_core::NewSale;
    ///
    /// let sale = NewSale::parse("Guppy", "3", "4,50").unwrap();
    /// assert_eq!(sale.quantity, 3);
    /// assert_eq!(sale.unit_price.cents(), 450);
    ///
    /// assert!(NewSale::parse("", "3", "4,50").is_err());
    /// assert!(NewSale::parse("Guppy", "three", "4,50").is_err());
    /// ```
    pub fn parse(name: &str, quantity: &str, unit_price: &str) -> ValidationResult<NewSale> {
        let name = validation::validate_name(name)?;
        let quantity = validation::parse_quantity(quantity)?;
        let unit_price = validation::parse_unit_price(unit_price)?;

        Ok(NewSale {
            name,
            quantity,
            unit_price,
        })
    }

    /// Re-checks an already typed sale against the same rules.
    pub fn validated(self) -> ValidationResult<NewSale> {
        let name = validation::validate_name(&self.name)?;
        validation::validate_quantity(self.quantity)?;
        validation::validate_unit_price(self.unit_price)?;

        Ok(NewSale { name, ..self })
    }

    /// Quantity × unit price.
    #[inline]
    pub fn line_amount(&self) -> Result<Money, AmountOverflow> {
        self.unit_price
            .checked_multiply_quantity(self.quantity)
            .ok_or(AmountOverflow)
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// One logged outgoing-stock transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub id: SaleId,

    /// Product or fish description.
    pub name: String,

    pub quantity: i64,

    pub unit_price: Money,

    /// Local time of the sale, second resolution.
    pub timestamp: NaiveDateTime,

    /// Calendar date of `timestamp`, persisted for range filtering.
    pub day: NaiveDate,
}

impl SaleRecord {
    /// Quantity × unit price, at full precision.
    #[inline]
    pub fn line_amount(&self) -> Result<Money, AmountOverflow> {
        self.unit_price
            .checked_multiply_quantity(self.quantity)
            .ok_or(AmountOverflow)
    }

    /// Σ quantity × unit price over `records`.
    ///
    /// Every daily, running and close-report total goes through here. Nothing
    /// is rounded before the sum.
    ///
    /// ```rust
    /// use caixa_core::{Money, SaleRecord};
    ///
    /// assert_eq!(SaleRecord::total(&[]).unwrap(), Money::zero());
    /// ```
    pub fn total<'a>(
        records: impl IntoIterator<Item = &'a SaleRecord>,
    ) -> Result<Money, AmountOverflow> {
        records.into_iter().try_fold(Money::zero(), |total, record| {
            total.checked_add(record.line_amount()?).ok_or(AmountOverflow)
        })
    }

    /// Timestamp rendered as `YYYY-MM-DD HH:MM:SS`.
    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Day rendered as `YYYY-MM-DD`.
    pub fn day_text(&self) -> String {
        self.day.format(DAY_FORMAT).to_string()
    }
}
