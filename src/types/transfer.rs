//! Transfer journal types
//!
//! Every successful `transfer_money` call appends one [`TransferRecord`] to the
//! ledger journal when its transaction commits.

use super::account::AccountId;
use rust_decimal::Decimal;

/// Journal row identifier
///
/// Assigned sequentially by the ledger at commit time.
pub type TransferId = u64;

/// Placeholder used when a TRANSFER command carries no description
pub const DEFAULT_TRANSFER_DESCRIPTION: &str = "Server transfer";

/// A committed money transfer between two accounts
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRecord {
    /// Sequential journal identifier
    pub transfer_id: TransferId,

    /// Debited account
    pub from: AccountId,

    /// Credited account
    pub to: AccountId,

    /// Amount moved (always positive)
    pub amount: Decimal,

    /// Free-form description supplied by the client
    pub description: String,
}
