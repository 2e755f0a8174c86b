//! Core business logic module
//!
//! This module contains the components between the protocol and the ledger:
//! - `gatekeeper` - Exclusive access to the single shared ledger
//! - `traits` - Collaborator abstractions consumed by the dispatcher
//! - `account_service` - Balance and account lookups
//! - `transaction_service` - Money transfers
//! - `dispatcher` - Command to response mapping

pub mod account_service;
pub mod dispatcher;
pub mod gatekeeper;
pub mod traits;
pub mod transaction_service;

pub use account_service::AccountService;
pub use dispatcher::Dispatcher;
pub use gatekeeper::{Gatekeeper, LedgerGuard};
pub use traits::{AccountLookup, MoneyTransfer};
pub use transaction_service::TransactionService;
