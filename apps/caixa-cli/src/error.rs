//! # CLI Error Type
//!
//! Unified error type for commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Caixa                                  │
//! │                                                                         │
//! │  caixa record "" 3 4,50                                                │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<String, AppError>                                        │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  LedgerError::Validation ──┐                                    │  │
//! │  │  LedgerError::Storage ─────┼── AppError { operation, code } ───►│  │
//! │  │  LedgerError::Io ──────────┘                                    │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr: "error: record failed: name is required"                      │
//! │  exit status 1                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use crate::config::ConfigError;
use caixa_core::{AmountOverflow, ValidationError};
use caixa_db::{DbError, ErrorKind, LedgerError};

/// Error returned from a command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// What was being attempted ("record", "close register", ...)
    pub operation: String,

    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable cause
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Blank or malformed input
    ValidationError,

    /// The ledger store failed
    DatabaseError,

    /// An interchange file can't be read or written
    FileError,

    /// caixa.toml can't be read
    ConfigError,

    /// A total is too large to compute
    AmountOverflow,

    /// Anything else
    Internal,
}

impl AppError {
    pub fn new(operation: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            operation: operation.into(),
            code,
            message: message.into(),
        }
    }

    pub fn validation(operation: &str, err: ValidationError) -> Self {
        AppError::new(operation, ErrorCode::ValidationError, err.to_string())
    }

    pub fn internal(operation: &str, message: impl Into<String>) -> Self {
        AppError::new(operation, ErrorCode::Internal, message)
    }

    pub fn amount(operation: &str, err: AmountOverflow) -> Self {
        AppError::new(operation, ErrorCode::AmountOverflow, err.to_string())
    }

    pub fn config(err: ConfigError) -> Self {
        AppError::new("load configuration", ErrorCode::ConfigError, err.to_string())
    }

    /// Wraps a ledger failure of `operation`.
    pub fn ledger(operation: &str, err: LedgerError) -> Self {
        let code = match (&err, err.kind()) {
            (LedgerError::Storage(DbError::AmountOverflow(_)), _) => ErrorCode::AmountOverflow,
            (_, ErrorKind::Validation) => ErrorCode::ValidationError,
            (_, ErrorKind::Storage) => ErrorCode::DatabaseError,
            (_, ErrorKind::Io) => ErrorCode::FileError,
        };

        let message = match err {
            LedgerError::Storage(DbError::QueryFailed(e)) => {
                tracing::error!(operation, "Database query failed: {}", e);
                "database operation failed".to_string()
            }
            LedgerError::Storage(DbError::Internal(e)) => {
                tracing::error!(operation, "Internal database error: {}", e);
                "database operation failed".to_string()
            }
            other => other.to_string(),
        };

        AppError::new(operation, code, message)
    }

    /// `map_err` adapter: `.map_err(AppError::during("import"))`.
    pub fn during(operation: &'static str) -> impl Fn(LedgerError) -> AppError {
        move |err| AppError::ledger(operation, err)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.operation, self.message)
    }
}

impl std::error::Error for AppError {}
