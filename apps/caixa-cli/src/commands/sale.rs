//! # Sale Commands

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use super::{render_table, FilterArgs};
use crate::config::AppConfig;
use crate::error::AppError;
use caixa_core::{validation, Column, SaleId, SaleRecord, SortDirection};
use caixa_db::Ledger;

/// `list --json` payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub rows: Vec<SaleRecord>,
    pub total_cents: i128,
}

/// `record <name> <quantity> <price>`
pub async fn record(
    ledger: &Ledger,
    config: &AppConfig,
    name: &str,
    quantity: &str,
    price: &str,
) -> Result<String, AppError> {
    debug!(name, quantity, price, "record command");

    let record = ledger
        .create(name, quantity, price)
        .await
        .map_err(AppError::during("record"))?;

    Ok(format!(
        "Recorded #{}: {} × {} at {} = {}",
        record.id,
        record.quantity,
        record.name,
        config.format_money(record.unit_price),
        config.format_money(record.line_amount().map_err(|e| AppError::amount("record", e))?),
    ))
}

/// `list [filters] [--sort COL] [--desc] [--json]`
pub async fn list(
    ledger: &Ledger,
    config: &AppConfig,
    filter: &FilterArgs,
    sort: Option<&str>,
    descending: bool,
    json: bool,
) -> Result<String, AppError> {
    let filter = filter.to_filter("list")?;

    let column = sort
        .map(str::parse::<Column>)
        .transpose()
        .map_err(|e| AppError::validation("list", e))?;

    let mut projection = ledger
        .projection(&filter)
        .await
        .map_err(AppError::during("list"))?;

    if let Some(column) = column {
        let direction = if descending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        projection.sort_by(column, direction);
    }

    let total = projection
        .running_total()
        .map_err(|e| AppError::amount("list", e))?;

    if json {
        let response = ListResponse {
            rows: projection.into_rows(),
            total_cents: total.cents(),
        };
        return serde_json::to_string_pretty(&response)
            .map_err(|e| AppError::internal("list", e.to_string()));
    }

    if projection.is_empty() {
        return Ok("No sales.".to_string());
    }

    let mut out =
        render_table(projection.rows(), config).map_err(|e| AppError::amount("list", e))?;
    out.push_str(&format!(
        "\n{} sales, total {}",
        projection.len(),
        config.format_money(total)
    ));
    Ok(out)
}

/// `delete <id>...`
pub async fn delete(ledger: &Ledger, ids: &[String]) -> Result<String, AppError> {
    let mut ids = ids
        .iter()
        .map(|raw| raw.parse::<SaleId>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::validation("delete", e))?;

    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));

    // The lookup only names what goes; an unreadable row is still deleted.
    let mut found = Vec::new();
    for id in &ids {
        match ledger.get(*id).await {
            Ok(Some(record)) => found.push(format!("#{} {}", record.id, record.name)),
            Ok(None) => {}
            Err(e) => {
                warn!(id = id.get(), error = %e, "Could not read sale before deleting it");
                found.push(format!("#{}", id));
            }
        }
    }

    let removed = ledger
        .delete(&ids)
        .await
        .map_err(AppError::during("delete"))?;

    let mut out = format!("Deleted {} of {} sales.", removed, ids.len());
    for line in &found {
        out.push_str("\n  ");
        out.push_str(line);
    }
    Ok(out)
}

/// `total [filters]`, `total --day YYYY-MM-DD` or `total --today`.
///
/// The day forms sum storage directly and ignore any filter.
pub async fn total(
    ledger: &Ledger,
    config: &AppConfig,
    filter: &FilterArgs,
    day: Option<&str>,
    today: bool,
) -> Result<String, AppError> {
    if today {
        let total = ledger
            .sum_for_today()
            .await
            .map_err(AppError::during("total"))?;
        return Ok(format!(
            "Total {}: {}",
            ledger.today().format(caixa_core::DAY_FORMAT),
            config.format_money(total)
        ));
    }

    if let Some(raw) = day {
        let day = validation::parse_day("day", raw).map_err(|e| AppError::validation("total", e))?;
        let total = ledger
            .sum_for_day(day)
            .await
            .map_err(AppError::during("total"))?;
        return Ok(format!(
            "Total {}: {}",
            day.format(caixa_core::DAY_FORMAT),
            config.format_money(total)
        ));
    }

    let filter = filter.to_filter("total")?;
    let projection = ledger
        .projection(&filter)
        .await
        .map_err(AppError::during("total"))?;
    let total = projection
        .running_total()
        .map_err(|e| AppError::amount("total", e))?;

    Ok(format!(
        "Total: {} ({} sales)",
        config.format_money(total),
        projection.len()
    ))
}
