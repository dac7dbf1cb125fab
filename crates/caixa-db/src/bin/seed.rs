//! # Seed Data Generator
//!
//! Fills a ledger file with demo sales for development.
//!
//! ## Usage
//! ```bash
//! # Two weeks of sales ending today (default)
//! cargo run -p caixa-db --bin seed
//!
//! # Custom span
//! cargo run -p caixa-db --bin seed -- --days 30
//!
//! # Specify database path
//! cargo run -p caixa-db --bin seed -- --db ./data/Historico.db
//! ```
//!
//! Every day gets 4-11 sales between 09:00 and 18:00, drawn from the catalog
//! below. Output is deterministic for a given `--days`.

use caixa_core::{Clock, CurrencyFormat, Money, NewSale, SaleRecord};
use caixa_db::{Database, DbConfig, SystemClock};
use chrono::{NaiveDateTime, TimeDelta};
use std::env;

/// Demo catalog: (name, unit price in centavos).
const CATALOG: &[(&str, i64)] = &[
    ("Guppy", 450),
    ("Guppy macho", 600),
    ("Neon Tetra", 350),
    ("Betta", 1500),
    ("Kinguio", 800),
    ("Platy", 700),
    ("Molinésia", 550),
    ("Cascudo", 1200),
    ("Coridora", 900),
    ("Acará Bandeira", 1800),
    ("Ração Alcon 50g", 2990),
    ("Ração Tetra Min 20g", 1990),
    ("Condicionador de água", 2450),
    ("Planta Anúbia", 1650),
    ("Cascalho 1kg", 1200),
];

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut days: i64 = 14;
    let mut db_path = String::from("./Historico_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--days" | "-n" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(14);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Caixa Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -n, --days <N>     Days of sales to generate (default: 14)");
                println!("  -d, --db <PATH>    Database file path (default: ./Historico_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Caixa Seed Data Generator");
    println!("=========================");
    println!("Database: {}", db_path);
    println!("Days:     {}", days);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");

    let existing = db.sales().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} sales", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        db.close().await;
        return Ok(());
    }

    let today = SystemClock.today();
    let mut batch = Vec::new();

    for offset in (0..days.max(1)).rev() {
        let day = today - TimeDelta::days(offset);
        let Some(opening) = day.and_hms_opt(9, 0, 0) else {
            continue;
        };
        batch.extend(day_of_sales(opening, offset as usize));
    }

    let start = std::time::Instant::now();
    let stored = db.sales().insert_batch(&batch).await?;
    let elapsed = start.elapsed();

    let total = SaleRecord::total(&stored)?;

    println!();
    println!("✓ Generated {} sales in {:?}", stored.len(), elapsed);
    println!("  Total: {}", CurrencyFormat::Brazilian.format(total));
    println!(
        "  Today: {}",
        CurrencyFormat::Brazilian.format(db.sales().sum_for_day(today).await?)
    );

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates one day of sales starting at `opening`.
fn day_of_sales(opening: NaiveDateTime, seed: usize) -> Vec<(NewSale, NaiveDateTime)> {
    let count = 4 + (seed * 7) % 8;
    let mut at = opening;

    (0..count)
        .map(|n| {
            let pick = (seed * 31 + n * 17) % CATALOG.len();
            let (name, cents) = CATALOG[pick];

            // Spread across the 9 opening hours.
            at += TimeDelta::minutes((540 / count as i64).max(1) - (n as i64 % 5));

            let sale = NewSale {
                name: name.to_string(),
                quantity: 1 + ((seed + n * 3) % 6) as i64,
                unit_price: Money::from_cents(cents),
            };
            (sale, at)
        })
        .collect()
}
