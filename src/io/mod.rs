//! I/O module
//!
//! Handles loading the ledger's starting state from disk.
//!
//! # Components
//!
//! - `seed` - Account seed CSV parsing and ledger construction

pub mod seed;

pub use seed::{convert_account_record, load_accounts, load_ledger, AccountRecord};
