use crate::protocol::FramingMode;
use crate::server::config::{
    ConnectionConfig, ServerConfig, DEFAULT_BACKLOG, DEFAULT_BUFFER_SIZE, DEFAULT_HOST,
    DEFAULT_PORT,
};
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

/// Line-oriented TCP gateway for balance lookups and money transfers
#[derive(Parser, Debug)]
#[command(name = "transaction-gateway")]
#[command(
    about = "Line-oriented TCP gateway for balance lookups and money transfers",
    long_about = None
)]
pub struct CliArgs {
    /// Host name or address to bind
    #[arg(value_name = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// TCP port to listen on
    #[arg(
        value_name = "PORT",
        default_value_t = DEFAULT_PORT,
        value_parser = clap::value_parser!(u16).range(1..),
        help = "TCP port to listen on (1-65535)"
    )]
    pub port: u16,

    /// Seed CSV with the ledger's accounts
    #[arg(
        long = "accounts",
        value_name = "FILE",
        help = "CSV file with the starting accounts (empty ledger if omitted)"
    )]
    pub accounts: Option<PathBuf>,

    /// How connection bytes are cut into commands
    #[arg(
        long = "framing",
        value_name = "MODE",
        default_value = "read",
        help = "Framing: 'read' treats each read as one command, 'line' buffers until newline"
    )]
    pub framing: FramingMode,

    /// Per-connection read buffer size
    #[arg(
        long = "buffer-size",
        value_name = "BYTES",
        help = "Bytes per read and maximum line length (default: 1024)"
    )]
    pub buffer_size: Option<usize>,

    /// Listen backlog
    #[arg(
        long = "backlog",
        value_name = "COUNT",
        help = "Pending connection queue length (default: 128)"
    )]
    pub backlog: Option<u32>,

    /// Runtime worker threads
    #[arg(
        long = "worker-threads",
        value_name = "COUNT",
        help = "Number of runtime worker threads (default: CPU cores)"
    )]
    pub worker_threads: Option<usize>,
}

impl CliArgs {
    /// Create a ServerConfig from CLI arguments
    ///
    /// Options that were not given take their default value. Zero values are
    /// replaced by the default with a warning.
    pub fn to_server_config(&self) -> ServerConfig {
        let connection = ConnectionConfig::new(
            self.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE),
            self.framing,
        );
        ServerConfig::new(
            self.host.clone(),
            self.port,
            self.backlog.unwrap_or(DEFAULT_BACKLOG),
            connection,
        )
    }

    /// Number of runtime worker threads to start
    pub fn worker_threads(&self) -> usize {
        let default = num_cpus::get();
        match self.worker_threads {
            Some(0) => {
                warn!("Invalid worker_threads (0), using default ({})", default);
                default
            }
            Some(threads) => threads,
            None => default,
        }
    }
}
