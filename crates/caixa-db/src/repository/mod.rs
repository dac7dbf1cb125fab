//! # Repository Module
//!
//! Database repository implementations for Caixa.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Ledger operation                                                       │
//! │       │                                                                 │
//! │       │  db.sales().list(&filter)                                      │
//! │       ▼                                                                 │
//! │  SaleRepository                                                        │
//! │  ├── insert / insert_batch                                             │
//! │  ├── list / get / count                                                │
//! │  ├── delete                                                            │
//! │  ├── day_records / sum_for_day                                         │
//! │  └── close_day                                                         │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite `saidas` table                                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod sale;
