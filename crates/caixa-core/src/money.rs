//! # Money Module
//!
//! Provides the `Money` type for monetary values (Brazilian reais).
//!
//! ## Why Scaled Integers?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FORMATTED-STRING PROBLEM                                           │
//! │                                                                         │
//! │  Re-reading totals from display text breaks on locale:                  │
//! │    "R$ 1.234,50" → strip "," → 1.23450   ❌ WRONG!                      │
//! │                                                                         │
//! │  Rounding each price to centavos before summing drifts:                 │
//! │    8 × R$ 0,125 → 8 × 0,13 = R$ 1,04     ❌ WRONG!                      │
//! │                                                                         │
//! │  OUR SOLUTION: Millionths of a real                                     │
//! │    Every amount is held as an i128 count of 10⁻⁶ R$. Prices keep the    │
//! │    digits they were entered with, sums are exact, and rounding to       │
//! │    centavos happens only when an amount is rendered.                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use caixa_core::money::{CurrencyFormat, Money};
//!
//! let price = Money::parse("R$ 1.234,50").unwrap();
//! assert_eq!(price.cents(), 123450);
//!
//! assert_eq!(CurrencyFormat::Brazilian.format(price), "R$ 1.234,50");
//! assert_eq!(CurrencyFormat::Plain.format(price), "R$ 1234.50");
//!
//! let feed = Money::parse("0,125").unwrap();
//! let line = feed.checked_multiply_quantity(8).unwrap();
//! assert_eq!(CurrencyFormat::Plain.format(line), "R$ 1.00");
//! assert_eq!(CurrencyFormat::Plain.format_exact(feed), "R$ 0.125");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ValidationError, ValidationResult};

/// Currency symbol printed in front of every rendered amount.
pub const CURRENCY_SYMBOL: &str = "R$";

/// Fractional digits of a real that an amount keeps.
pub const FRACTION_DIGITS: usize = 6;

/// Units per real.
const SCALE: i128 = 1_000_000;

/// Units per centavo.
const PER_CENT: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in millionths of a real.
///
/// ## Where Money is Used
/// ```text
/// SaleRecord.unit_price ──► SaleRecord::line_amount() ──► running total
///                                                    └──► daily total
///                                                    └──► close-register TOTAL row
/// ```
///
/// Arithmetic is checked. Line amounts and totals report
/// [`AmountOverflow`](crate::AmountOverflow) instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i128);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ```rust
    /// use caixa_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // R$ 10,99
    /// assert_eq!(price.cents(), 1099);
    /// assert_eq!(price.micros(), 10_990_000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents as i128 * PER_CENT)
    }

    #[inline]
    pub const fn from_micros(micros: i128) -> Self {
        Money(micros)
    }

    /// Returns the exact value in millionths of a real.
    #[inline]
    pub const fn micros(&self) -> i128 {
        self.0
    }

    /// Returns the value rounded to the nearest centavo (halves away from zero).
    #[inline]
    pub const fn cents(&self) -> i128 {
        let whole = self.0 / PER_CENT;
        let rest = self.0 % PER_CENT;
        if rest.abs() * 2 >= PER_CENT {
            whole + self.0.signum()
        } else {
            whole
        }
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Money(sum)),
            None => None,
        }
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ```rust
    /// use caixa_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.checked_multiply_quantity(3).unwrap().cents(), 897);
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty as i128) {
            Some(product) => Some(Money(product)),
            None => None,
        }
    }

    /// Converts reais held as a float, as in the `valor` column.
    ///
    /// Keeps [`FRACTION_DIGITS`] digits. `None` for NaN, infinities and
    /// magnitudes Money can't hold.
    pub fn from_reais_f64(value: f64) -> Option<Money> {
        let scaled = (value * SCALE as f64).round();
        if !scaled.is_finite() || scaled.abs() >= i128::MAX as f64 {
            return None;
        }
        Some(Money(scaled as i128))
    }

    /// The value in reais as a float, for the `valor` column.
    pub fn to_reais_f64(&self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Parses an amount typed by a user or read from an interchange file.
    ///
    /// Accepts both renderings produced by [`CurrencyFormat`], bare numbers,
    /// an optional `R$` prefix and a leading minus sign.
    ///
    /// ## Separator Rule
    /// ```text
    /// "1.234,50"   both present  → right-most is decimal    → 1234.50
    /// "1,234.50"   both present  → right-most is decimal    → 1234.50
    /// "12,5"       one, once     → decimal                  → 12.50
    /// "0.125"      one, once     → decimal                  → 0.125
    /// "1.234.567"  one, repeated → thousands                → 1234567.00
    /// ```
    /// Digits past the sixth decimal place are rounded (halves away from zero).
    pub fn parse(input: &str) -> ValidationResult<Money> {
        Money::parse_field("amount", input)
    }

    /// Same as [`Money::parse`], naming `field` in validation errors.
    pub fn parse_field(field: &str, input: &str) -> ValidationResult<Money> {
        let mut text = input.trim();
        if text.is_empty() {
            return Err(ValidationError::required(field));
        }

        let mut negative = false;
        if let Some(rest) = text.strip_prefix('-') {
            negative = true;
            text = rest.trim_start();
        }
        if let Some(rest) = text.strip_prefix(CURRENCY_SYMBOL) {
            text = rest.trim_start();
        }
        if !negative {
            if let Some(rest) = text.strip_prefix('-') {
                negative = true;
                text = rest.trim_start();
            }
        }

        let decimal = decimal_separator(text);
        let thousands = match decimal {
            Some('.') => ',',
            Some(_) => '.',
            None if text.contains('.') => '.',
            None => ',',
        };

        let (integer_part, fraction_part) = match decimal.and_then(|sep| text.rsplit_once(sep)) {
            Some((integer, fraction)) => (integer, fraction),
            None => (text, ""),
        };

        let digits: String = integer_part.chars().filter(|c| *c != thousands).collect();

        if digits.is_empty() && fraction_part.is_empty() {
            return Err(ValidationError::invalid_format(field, "no digits"));
        }
        if !digits.chars().all(|c| c.is_ascii_digit())
            || !fraction_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ValidationError::invalid_format(
                field,
                format!("'{}' is not a number", input.trim()),
            ));
        }

        let too_large = || ValidationError::invalid_format(field, "amount is too large");

        let units: i128 = if digits.is_empty() {
            0
        } else {
            digits.parse().map_err(|_| too_large())?
        };

        // ASCII digits only, so splitting on a byte index is safe.
        let (kept, dropped) = fraction_part.split_at(fraction_part.len().min(FRACTION_DIGITS));
        let mut fraction: i128 = if kept.is_empty() {
            0
        } else {
            let padding = 10_i128.pow((FRACTION_DIGITS - kept.len()) as u32);
            kept.parse::<i128>().map_err(|_| too_large())? * padding
        };
        if dropped.as_bytes().first().is_some_and(|d| *d >= b'5') {
            fraction += 1;
        }

        let micros = units
            .checked_mul(SCALE)
            .and_then(|m| m.checked_add(fraction))
            .ok_or_else(too_large)?;

        Ok(Money(if negative { -micros } else { micros }))
    }
}

/// Picks the decimal separator of a numeric string, if any.
fn decimal_separator(text: &str) -> Option<char> {
    match (text.rfind('.'), text.rfind(',')) {
        (Some(dot), Some(comma)) => Some(if dot > comma { '.' } else { ',' }),
        (Some(_), None) => (text.matches('.').count() == 1).then_some('.'),
        (None, Some(_)) => (text.matches(',').count() == 1).then_some(','),
        (None, None) => None,
    }
}

// =============================================================================
// Currency Format
// =============================================================================

/// The two rendering conventions used by the shop.
///
/// - `Brazilian`: `R$ 1.234,50` (screen display)
/// - `Plain`: `R$ 1234.50` (interchange files)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyFormat {
    #[default]
    Brazilian,
    Plain,
}

impl CurrencyFormat {
    /// Renders an amount rounded to two decimal places.
    pub fn format(&self, amount: Money) -> String {
        let cents = amount.cents();
        let sign = if cents < 0 { "-" } else { "" };
        let units = (cents / 100).unsigned_abs();
        let fraction = format!("{:02}", (cents % 100).unsigned_abs());

        self.render(sign, units, &fraction)
    }

    /// Renders every stored decimal place, never fewer than two.
    ///
    /// Used where a price is written to be read back (`R$ 0.125`).
    pub fn format_exact(&self, amount: Money) -> String {
        let micros = amount.micros();
        let sign = if micros < 0 { "-" } else { "" };
        let units = (micros / SCALE).unsigned_abs();

        let mut fraction = format!(
            "{:0width$}",
            (micros % SCALE).unsigned_abs(),
            width = FRACTION_DIGITS
        );
        while fraction.len() > 2 && fraction.ends_with('0') {
            fraction.pop();
        }

        self.render(sign, units, &fraction)
    }

    fn render(&self, sign: &str, units: u128, fraction: &str) -> String {
        match self {
            CurrencyFormat::Plain => {
                format!("{}{} {}.{}", sign, CURRENCY_SYMBOL, units, fraction)
            }
            CurrencyFormat::Brazilian => {
                format!(
                    "{}{} {},{}",
                    sign,
                    CURRENCY_SYMBOL,
                    group_thousands(units),
                    fraction
                )
            }
        }
    }
}

impl std::str::FromStr for CurrencyFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "brazilian" | "br" | "pt-br" => Ok(CurrencyFormat::Brazilian),
            "plain" => Ok(CurrencyFormat::Plain),
            _ => Err(ValidationError::NotAllowed {
                field: "currency format".to_string(),
                allowed: vec!["brazilian".to_string(), "plain".to_string()],
            }),
        }
    }
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders in the plain interchange format, e.g. `R$ 1234.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&CurrencyFormat::Plain.format(*self))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
