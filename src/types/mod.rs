//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account rows and identifiers
//! - `command`: Parsed commands and their responses
//! - `transfer`: Transfer journal records
//! - `error`: Error types for the gateway

pub mod account;
pub mod command;
pub mod error;
pub mod transfer;

pub use account::{Account, AccountId, CustomerId, BALANCE_SCALE};
pub use command::{Command, Response};
pub use error::{CommandError, GatewayError};
pub use transfer::{TransferId, TransferRecord, DEFAULT_TRANSFER_DESCRIPTION};
