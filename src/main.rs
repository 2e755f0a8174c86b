//! Transaction Gateway CLI
//!
//! Starts the TCP gateway in front of an in-process ledger.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --accounts accounts.csv
//! cargo run -- 127.0.0.1 9000 --accounts accounts.csv
//! cargo run -- --framing line --buffer-size 4096 --worker-threads 4
//! RUST_LOG=debug cargo run -- --accounts accounts.csv
//! ```
//!
//! The gateway runs until interrupted with Ctrl-C, then stops accepting,
//! closes every connection and exits.
//!
//! # Exit Codes
//!
//! - 0: Clean shutdown
//! - 1: Error (seed file not found or invalid, address cannot be bound, etc.)

use rust_transaction_gateway::cli::{self, CliArgs};
use rust_transaction_gateway::{load_ledger, Gatekeeper, GatewayError, Ledger, Server};
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = cli::parse_args();

    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), GatewayError> {
    let ledger = match &args.accounts {
        Some(path) => load_ledger(path)?,
        None => {
            warn!("No --accounts file given, starting with an empty ledger");
            Ledger::new()
        }
    };
    let config = args.to_server_config();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(args.worker_threads())
        .enable_all()
        .build()
        .map_err(|e| GatewayError::Runtime {
            message: format!("Failed to create tokio runtime: {}", e),
        })?;

    runtime.block_on(async {
        let gatekeeper = Arc::new(Gatekeeper::new(ledger));
        let mut server = Server::with_gatekeeper(config, gatekeeper);
        server.start().await?;

        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("interrupt received, shutting down"),
            Err(e) => warn!(error = %e, "cannot listen for Ctrl-C, shutting down"),
        }

        server.stop().await;
        Ok::<(), GatewayError>(())
    })
}
