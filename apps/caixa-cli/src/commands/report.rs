//! # Report Commands
//!
//! CSV export/import and closing the register.

use std::path::Path;
use tracing::debug;

use super::FilterArgs;
use crate::config::AppConfig;
use crate::error::AppError;
use caixa_db::{CloseOutcome, ExportOptions, ExportOutcome, Ledger};

/// `export <path> [filters] [--with-id]`
///
/// Writes the filtered history, newest first, as shown by `list`.
pub async fn export(
    ledger: &Ledger,
    config: &AppConfig,
    path: &Path,
    filter: &FilterArgs,
    with_id: bool,
) -> Result<String, AppError> {
    let filter = filter.to_filter("export")?;
    let rows = ledger
        .list(&filter)
        .await
        .map_err(AppError::during("export"))?;

    let options = ExportOptions {
        include_id: with_id || config.export_with_id,
    };
    debug!(?options, rows = rows.len(), "export command");

    let outcome = ledger
        .export(&rows, path, options)
        .map_err(AppError::during("export"))?;

    Ok(match outcome {
        ExportOutcome::NothingToExport => "Nothing to export; no file written.".to_string(),
        ExportOutcome::Written { rows, path } => {
            format!("Exported {} sales to {}", rows, path.display())
        }
    })
}

/// `import <path>`
pub async fn import(ledger: &Ledger, path: &Path) -> Result<String, AppError> {
    let summary = ledger
        .import(path)
        .await
        .map_err(AppError::during("import"))?;

    Ok(format!(
        "Imported {} sales from {}",
        summary.count(),
        summary.path.display()
    ))
}

/// `close <path>`: closes the register for today.
pub async fn close(ledger: &Ledger, config: &AppConfig, path: &Path) -> Result<String, AppError> {
    let outcome = ledger
        .close_register(path)
        .await
        .map_err(AppError::during("close register"))?;

    Ok(match outcome {
        CloseOutcome::NothingToClose { day } => {
            format!("No sales on {}; register not closed.", day)
        }
        CloseOutcome::Closed { summary, path } => format!(
            "Closed {}: {} sales, total {}. Report written to {}",
            summary.day,
            summary.records.len(),
            config.format_money(summary.total),
            path.display()
        ),
    })
}
