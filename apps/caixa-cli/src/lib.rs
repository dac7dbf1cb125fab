//! # Caixa CLI Library
//!
//! Argument parsing, startup and dispatch for the `caixa` binary.
//!
//! ## Module Organization
//! ```text
//! caixa_cli/
//! ├── lib.rs          ◄─── You are here (Cli, startup & dispatch)
//! ├── config.rs       ◄─── caixa.toml
//! ├── commands/
//! │   ├── mod.rs      ◄─── Shared filter args, table rendering
//! │   ├── sale.rs     ◄─── record / list / delete / total
//! │   └── report.rs   ◄─── export / import / close
//! └── error.rs        ◄─── AppError
//! ```

pub mod commands;
pub mod config;
pub mod error;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use caixa_db::{DbConfig, Ledger};
use commands::FilterArgs;
use config::AppConfig;
use error::AppError;

/// Sales ledger for the aquarium shop.
#[derive(Debug, Parser)]
#[command(name = "caixa", version, about = "Sales ledger (controle de saída)")]
pub struct Cli {
    /// Ledger database file (overrides caixa.toml)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file location (default: platform config dir/caixa.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a sale stamped with the current time
    Record {
        /// Product or fish
        name: String,
        quantity: String,
        /// Unit price, e.g. 4,50 or "R$ 1.234,50"
        price: String,
    },

    /// Show the history, newest first, with its running total
    List {
        #[command(flatten)]
        filter: FilterArgs,

        /// Sort by column: id, name, quantity, price, amount, date
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Delete sales by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Total of the filtered history, or of one day
    Total {
        #[command(flatten)]
        filter: FilterArgs,

        /// Total of every sale on this day (YYYY-MM-DD), ignoring filters
        #[arg(long, conflicts_with = "today")]
        day: Option<String>,

        /// Total of every sale today, ignoring filters
        #[arg(long)]
        today: bool,
    },

    /// Export the filtered history to CSV
    Export {
        path: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,

        /// Include the ID column
        #[arg(long)]
        with_id: bool,
    },

    /// Import sales from a CSV written by `export` or `close`
    Import { path: PathBuf },

    /// Close the register: write today's report to PATH, then clear today
    Close { path: PathBuf },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Record { .. } => "record",
            Command::List { .. } => "list",
            Command::Delete { .. } => "delete",
            Command::Total { .. } => "total",
            Command::Export { .. } => "export",
            Command::Import { .. } => "import",
            Command::Close { .. } => "close",
        }
    }
}

/// Runs one command against an open ledger and returns the text to print.
pub async fn execute(ledger: &Ledger, config: &AppConfig, command: Command) -> Result<String, AppError> {
    debug!(command = command.name(), "Dispatching");

    match command {
        Command::Record {
            name,
            quantity,
            price,
        } => commands::sale::record(ledger, config, &name, &quantity, &price).await,
        Command::List {
            filter,
            sort,
            desc,
            json,
        } => commands::sale::list(ledger, config, &filter, sort.as_deref(), desc, json).await,
        Command::Delete { ids } => commands::sale::delete(ledger, &ids).await,
        Command::Total { filter, day, today } => {
            commands::sale::total(ledger, config, &filter, day.as_deref(), today).await
        }
        Command::Export {
            path,
            filter,
            with_id,
        } => commands::report::export(ledger, config, &path, &filter, with_id).await,
        Command::Import { path } => commands::report::import(ledger, &path).await,
        Command::Close { path } => commands::report::close(ledger, config, &path).await,
    }
}

/// Entry point of the `caixa` binary.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Parse arguments (clap exits on --help / usage errors)              │
/// │  2. Initialize logging (stderr, RUST_LOG)                              │
/// │  3. Load caixa.toml (or defaults)                                      │
/// │  4. Open the ledger: one SQLite connection, table created if absent    │
/// │  5. Run the command                                                    │
/// │  6. Close the connection                                               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    init_tracing();

    match run_cli(cli).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run_cli(cli: Cli) -> Result<String, AppError> {
    let config = AppConfig::load(cli.config).map_err(AppError::config)?;

    let database_path = cli.db.unwrap_or_else(|| config.database_path.clone());
    info!(path = %database_path.display(), "Opening ledger");

    let ledger = Ledger::open(DbConfig::new(database_path))
        .await
        .map_err(AppError::during("open ledger"))?;

    let result = execute(&ledger, &config, cli.command).await;

    ledger.close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so command output stays clean.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=caixa_db=trace` - Trace the storage layer only
/// - Default: warnings, plus info from the caixa crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,caixa_cli=info,caixa_db=info,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
