//! # Commands
//!
//! One function per subcommand. Each takes the open [`Ledger`], runs one
//! ledger operation and returns the text to print.
//!
//! ## Command Categories
//!
//! ### Sale Commands ([`sale`])
//! - `record` - Store a sale stamped "now"
//! - `list` - Filtered, optionally sorted history with its running total
//! - `delete` - Remove sales by id
//! - `total` - Running total of a filter, or the total of one day
//!
//! ### Report Commands ([`report`])
//! - `export` - Write the filtered history to CSV
//! - `import` - Load a previously exported CSV
//! - `close` - Close the register for today
//!
//! [`Ledger`]: caixa_db::Ledger

pub mod report;
pub mod sale;

use clap::Args;

use crate::config::AppConfig;
use crate::error::AppError;
use caixa_core::{AmountOverflow, SaleFilter, SaleRecord};

/// `--name`, `--from`, `--to`, shared by the commands that read a projection.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Case-insensitive part of the product name
    #[arg(long)]
    pub name: Option<String>,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self, operation: &str) -> Result<SaleFilter, AppError> {
        SaleFilter::parse(
            self.name.as_deref(),
            self.from.as_deref(),
            self.to.as_deref(),
        )
        .map_err(|e| AppError::validation(operation, e))
    }
}

/// Renders rows as a fixed-width table.
pub fn render_table(rows: &[SaleRecord], config: &AppConfig) -> Result<String, AmountOverflow> {
    let name_width = rows
        .iter()
        .map(|r| r.name.chars().count())
        .chain(std::iter::once("Product".len()))
        .max()
        .unwrap_or(0);

    let mut out = format!(
        "{:>6}  {:<name_width$}  {:>8}  {:>14}  {:>14}  {}\n",
        "ID", "Product", "Quantity", "Unit price", "Amount", "Date",
    );

    for record in rows {
        out.push_str(&format!(
            "{:>6}  {:<name_width$}  {:>8}  {:>14}  {:>14}  {}\n",
            record.id.get(),
            record.name,
            record.quantity,
            config.format_money(record.unit_price),
            config.format_money(record.line_amount()?),
            record.timestamp_text(),
        ));
    }

    Ok(out)
}
