//! Wire-level command and response types
//!
//! A [`Command`] is produced by the command parser from one line of client
//! input and consumed by the dispatcher, which answers with a [`Response`].
//! Both are plain immutable values; rendering a response to text is the job
//! of the protocol formatter.

use super::account::AccountId;
use rust_decimal::Decimal;

/// A parsed client request
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Liveness probe, answered with `PONG`
    Ping,

    /// Look up the balance of one account
    Balance {
        /// Account to look up
        account_id: AccountId,
    },

    /// Move money between two accounts
    Transfer {
        /// Debited account
        from: AccountId,
        /// Credited account
        to: AccountId,
        /// Amount to move, as sent by the client (validated by the ledger)
        amount: Decimal,
        /// Description stored in the transfer journal
        description: String,
    },

    /// Any verb the gateway does not know
    Unknown {
        /// The verb as received (may be empty for a whitespace-only line)
        verb: String,
    },
}

impl Command {
    /// Wire name of the command, used for logging
    pub fn verb(&self) -> &str {
        match self {
            Command::Ping => "PING",
            Command::Balance { .. } => "BALANCE",
            Command::Transfer { .. } => "TRANSFER",
            Command::Unknown { verb } => verb,
        }
    }
}

/// A reply to one command
///
/// Every variant renders to exactly one line of text.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Reply to `PING`
    Pong,

    /// Successful balance lookup
    Balance {
        /// Account that was looked up (echoes the request)
        account_id: AccountId,
        /// Its current balance
        amount: Decimal,
    },

    /// Successful transfer
    Ok,

    /// Any failure: protocol, application, or internal
    Error {
        /// Human-readable description sent after `ERROR `
        message: String,
    },
}

impl Response {
    /// Create an Error response from anything displayable
    pub fn error(message: impl ToString) -> Self {
        Response::Error {
            message: message.to_string(),
        }
    }

    /// Whether this response reports a failure
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}
