//! # Validation Module
//!
//! Turns raw entry-form and filter strings into typed values.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end (CLI)                                              │
//! │  └── Passes user strings through untouched                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, numeric parsing                                  │
//! │  └── Business bounds (quantity ≥ 1, price ≥ 0)                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL constraints                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::types::{SaleId, DAY_FORMAT, TIMESTAMP_FORMAT};
use crate::{MAX_NAME_LENGTH, MAX_QUANTITY, MAX_UNIT_PRICE_CENTS};

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name and returns it trimmed.
///
/// ```rust
/// use caixa_core::validation::validate_name;
///
/// assert_eq!(validate_name(" Betta ").unwrap(), "Betta");
/// assert!(validate_name("   ").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(name.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Parses a quantity typed by the user.
pub fn parse_quantity(raw: &str) -> ValidationResult<i64> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::required("quantity"));
    }

    let qty: i64 = raw
        .parse()
        .map_err(|_| ValidationError::invalid_format("quantity", "must be a whole number"))?;

    validate_quantity(qty)?;
    Ok(qty)
}

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Parses a unit price typed by the user (`4,50`, `R$ 4.50`, `4`).
pub fn parse_unit_price(raw: &str) -> ValidationResult<Money> {
    let price = Money::parse_field("price", raw)?;
    validate_unit_price(price)?;
    Ok(price)
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be non-negative (free items are allowed)
/// - Must not exceed MAX_UNIT_PRICE_CENTS
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() || price > Money::from_cents(MAX_UNIT_PRICE_CENTS) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE_CENTS / 100,
        });
    }

    Ok(())
}

/// Parses a record id (as shown in the listing).
pub fn parse_sale_id(raw: &str) -> ValidationResult<SaleId> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::required("id"));
    }

    raw.parse::<i64>()
        .map(SaleId)
        .map_err(|_| ValidationError::invalid_format("id", "must be a whole number"))
}

// =============================================================================
// Date Validators
// =============================================================================

/// Parses an ISO day (`YYYY-MM-DD`).
pub fn parse_day(field: &str, raw: &str) -> ValidationResult<NaiveDate> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::required(field));
    }

    NaiveDate::parse_from_str(raw, DAY_FORMAT)
        .map_err(|_| ValidationError::invalid_format(field, "expected YYYY-MM-DD"))
}

/// Parses an optional filter bound; blank means "no bound".
pub fn parse_optional_day(field: &str, raw: Option<&str>) -> ValidationResult<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_day(field, value).map(Some),
    }
}

/// Parses a timestamp as written in interchange files.
///
/// A bare `YYYY-MM-DD` means midnight of that day.
pub fn parse_timestamp(field: &str, raw: &str) -> ValidationResult<NaiveDateTime> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::required(field));
    }

    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
        return Ok(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(ts);
    }

    NaiveDate::parse_from_str(raw, DAY_FORMAT)
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            ValidationError::invalid_format(field, "expected YYYY-MM-DD HH:MM:SS")
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
