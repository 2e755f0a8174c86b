//! Rust Transaction Gateway Library
//! # Overview
//!
//! This library provides a TCP gateway that lets many concurrent clients run
//! banking operations against one shared transactional ledger, using a small
//! line-oriented text protocol.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Command, Response, errors)
//! - [`store`] - In-process transactional ledger and the transfer procedure
//! - [`core`] - Business logic components:
//!   - [`core::gatekeeper`] - Exclusive access to the single ledger handle
//!   - [`core::account_service`] / [`core::transaction_service`] - Lookups and transfers
//!   - [`core::dispatcher`] - Command to response mapping
//! - [`protocol`] - Framing, command parsing and response formatting
//! - [`server`] - Listener, accept loop and per-connection workers
//! - [`io`] - Seed CSV loading
//! - [`cli`] - CLI arguments parsing
//!
//! # Protocol
//!
//! Each request is one line; each response is one line.
//!
//! | Request                                 | Success                  |
//! |-----------------------------------------|--------------------------|
//! | `PING`                                  | `PONG`                   |
//! | `BALANCE <id>`                          | `BALANCE <id> <amount>`  |
//! | `TRANSFER <from> <to> <amount> [desc]`  | `OK`                     |
//!
//! Any failure is answered with `ERROR <message>` and the connection stays
//! open. Empty lines are ignored.
//!
//! # Concurrency
//!
//! Every connection is served by its own task, but all ledger transactions go
//! through the [`Gatekeeper`] lock, so at most one of them is in flight at any
//! instant.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod protocol;
pub mod server;
pub mod store;
pub mod types;

pub use core::{
    AccountLookup, AccountService, Dispatcher, Gatekeeper, MoneyTransfer, TransactionService,
};
pub use io::load_ledger;
pub use server::{Server, ServerConfig};
pub use store::Ledger;
pub use types::{Account, AccountId, Command, CommandError, GatewayError, Response};
