//! # caixa-core: Pure Business Logic for the Caixa Sales Ledger
//!
//! Everything the shop's ledger decides without touching a disk: the sale
//! record, money, input validation, filtering, sorting and totals.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caixa Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    caixa CLI (presentation)                     │   │
//! │  │    record ─ list ─ delete ─ total ─ export ─ import ─ close     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 caixa-db (Ledger, SQLite, CSV)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ caixa-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌──────────┐  │   │
//! │  │   │   types   │  │   money   │  │ projection │  │validation│  │   │
//! │  │   │SaleRecord │  │   Money   │  │ SaleFilter │  │  rules   │  │   │
//! │  │   │  NewSale  │  │ Currency  │  │ Projection │  │          │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO FILES • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - SaleRecord, NewSale, SaleId
//! - [`money`] - Scaled-integer Money and the two currency renderings
//! - [`validation`] - Raw-string parsing and business bounds
//! - [`projection`] - Filters, column sort, running total
//! - [`clock`] - Injectable source of "now"
//! - [`error`] - ValidationError, AmountOverflow
//!
//! ## Example Usage
//!
//! ```rust
//! use caixa_core::{NewSale, Projection, SaleFilter};
//!
//! let sale = NewSale::parse("Guppy", "3", "R$ 4,50").unwrap();
//! assert_eq!(sale.line_amount().unwrap().cents(), 1350);
//!
//! let projection = Projection::filtered(Vec::new(), &SaleFilter::all());
//! assert!(projection.running_total().unwrap().is_zero());
//! ```

pub mod clock;
pub mod error;
pub mod money;
pub mod projection;
pub mod types;
pub mod validation;

pub use clock::{Clock, FixedClock};
pub use error::{AmountOverflow, ValidationError, ValidationResult};
pub use money::{CurrencyFormat, Money};
pub use projection::{Column, Projection, SaleFilter, SortDirection};
pub use types::*;

/// Longest accepted product name, in characters.
pub const MAX_NAME_LENGTH: usize = 200;

/// Largest quantity accepted for a single sale.
///
/// With [`MAX_UNIT_PRICE_CENTS`] this keeps `quantity × unit price` far
/// below the range of [`Money`].
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Largest unit price accepted, in centavos (R$ 1.000.000.000,00).
pub const MAX_UNIT_PRICE_CENTS: i64 = 100_000_000_000;
