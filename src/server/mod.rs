//! Network server module
//!
//! # Components
//!
//! - `config` - Listener and connection settings
//! - `listener` - Socket setup, accept loop and start/stop lifecycle
//! - `connection` - Per-connection read/dispatch/write loop
//! - `registry` - Live connection bookkeeping

pub mod config;
pub mod connection;
pub mod listener;
pub mod registry;

pub use config::{ConnectionConfig, ServerConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use connection::{serve_connection, CloseReason};
pub use listener::Server;
pub use registry::{ConnectionId, ConnectionInfo, ConnectionRegistry};
