//! # Caixa Entry Point
//!
//! ```text
//! caixa record Guppy 3 4,50
//! caixa list --from 2024-06-01 --sort amount --desc
//! caixa total --today
//! caixa close fechamento-2024-06-15.csv
//! ```
//!
//! The actual setup is in lib.rs for better testability.

use std::process::ExitCode;

// A current-thread runtime: every ledger operation finishes before the next
// one starts.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    caixa_cli::run().await
}
