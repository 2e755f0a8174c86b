//! Backing store module
//!
//! An in-process stand-in for the transactional database the gateway fronts:
//! - `ledger` - Accounts table and transfer journal
//! - `transaction` - Read-only and read-write transaction scopes
//! - `procedure` - Transfer rules applied by `transfer_money`
//!
//! The ledger is not synchronized. Share it between tasks only through
//! [`crate::core::Gatekeeper`].

pub mod ledger;
pub mod procedure;
pub mod transaction;

pub use ledger::Ledger;
pub use transaction::{Transaction, TransactionMode};
