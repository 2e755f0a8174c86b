//! Error types for the Transaction Gateway
//!
//! This module defines every error that can occur while serving clients.
//! Errors carry enough context to be sent verbatim to a client after
//! `ERROR `, so their messages are short, single-line and descriptive.
//!
//! # Error Categories
//!
//! - **Protocol Errors** ([`CommandError`]): malformed command arguments
//! - **Application Errors**: rejected transfers, unknown accounts
//! - **Transaction Errors**: misuse of a transaction scope
//! - **Startup Errors**: seed file problems, bind/listen failures

use super::account::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the gateway
///
/// Returned by the ledger, the business services and the server lifecycle.
/// The dispatcher turns any of these into an `ERROR <message>` response, so
/// the `Display` text is part of the wire protocol.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// No account exists with the requested id
    #[error("Account not found: {account_id}")]
    AccountNotFound {
        /// The id that was looked up
        account_id: AccountId,
    },

    /// The source account cannot cover the transfer
    ///
    /// The transfer is rejected and no balance changes.
    #[error("Insufficient funds in account {account_id}: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Debited account
        account_id: AccountId,
        /// Its balance at the time of the transfer
        available: Decimal,
        /// Requested amount
        requested: Decimal,
    },

    /// Source and target accounts hold different currencies
    #[error("Currency mismatch: account {from} is {from_currency}, account {to} is {to_currency}")]
    CurrencyMismatch {
        /// Debited account
        from: AccountId,
        /// Its currency
        from_currency: String,
        /// Credited account
        to: AccountId,
        /// Its currency
        to_currency: String,
    },

    /// Transfer amount is zero, negative, or too precise
    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount {
        /// The rejected amount as received
        amount: String,
        /// Why it was rejected
        reason: String,
    },

    /// Source and target are the same account
    #[error("Cannot transfer from account {account_id} to itself")]
    SameAccount {
        /// The account named twice
        account_id: AccountId,
    },

    /// Arithmetic overflow would occur
    ///
    /// The operation is rejected to maintain account integrity.
    #[error("Arithmetic overflow in {operation} for account {account_id}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account whose balance would overflow
        account_id: AccountId,
    },

    /// A write was attempted inside a read-only transaction
    #[error("Cannot execute {operation} in a read-only transaction")]
    ReadOnlyTransaction {
        /// Operation that was refused
        operation: String,
    },

    /// A previous statement in this transaction failed
    ///
    /// Every further statement and the commit are refused; the transaction
    /// can only be rolled back.
    #[error("Current transaction is aborted, commands ignored until end of transaction block")]
    TransactionAborted,

    /// A transfer was rejected by the ledger
    ///
    /// Wraps the underlying reason; no balance changed.
    #[error("Transfer failed: {source}")]
    TransferFailed {
        /// The ledger's reason
        source: Box<GatewayError>,
    },

    /// The same account id appears twice in a seed
    #[error("Duplicate account id {account_id}")]
    DuplicateAccount {
        /// The duplicated id
        account_id: AccountId,
    },

    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents the gateway from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error outside of a client connection
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// Seed CSV parsing error
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// The listening socket could not be set up
    #[error("Failed to bind {addr}: {message}")]
    BindFailed {
        /// Address that was requested
        addr: String,
        /// Description of the socket error
        message: String,
    },

    /// The async runtime could not be created
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the runtime error
        message: String,
    },
}

// Conversion from io::Error to GatewayError
impl From<std::io::Error> for GatewayError {
    fn from(error: std::io::Error) -> Self {
        GatewayError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to GatewayError
impl From<csv::Error> for GatewayError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        GatewayError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl GatewayError {
    /// Create an AccountNotFound error
    pub fn account_not_found(account_id: AccountId) -> Self {
        GatewayError::AccountNotFound { account_id }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(
        account_id: AccountId,
        available: Decimal,
        requested: Decimal,
    ) -> Self {
        GatewayError::InsufficientFunds {
            account_id,
            available,
            requested,
        }
    }

    /// Create a CurrencyMismatch error
    pub fn currency_mismatch(
        from: AccountId,
        from_currency: &str,
        to: AccountId,
        to_currency: &str,
    ) -> Self {
        GatewayError::CurrencyMismatch {
            from,
            from_currency: from_currency.to_string(),
            to,
            to_currency: to_currency.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal, reason: &str) -> Self {
        GatewayError::InvalidAmount {
            amount: amount.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account_id: AccountId) -> Self {
        GatewayError::ArithmeticOverflow {
            operation: operation.to_string(),
            account_id,
        }
    }

    /// Create a ReadOnlyTransaction error
    pub fn read_only(operation: &str) -> Self {
        GatewayError::ReadOnlyTransaction {
            operation: operation.to_string(),
        }
    }

    /// Wrap a ledger rejection into a TransferFailed error
    pub fn transfer_failed(source: GatewayError) -> Self {
        GatewayError::TransferFailed {
            source: Box::new(source),
        }
    }

    /// Create a BindFailed error
    pub fn bind_failed(addr: impl ToString, error: &std::io::Error) -> Self {
        GatewayError::BindFailed {
            addr: addr.to_string(),
            message: error.to_string(),
        }
    }
}

/// Malformed command arguments
///
/// Produced by the command parser. Never closes the connection: the
/// dispatcher answers with `ERROR <message>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    /// `BALANCE` without a valid integer account id
    #[error("Invalid BALANCE arguments")]
    InvalidBalanceArguments,

    /// `TRANSFER` with a missing or malformed id or amount
    #[error("Invalid TRANSFER arguments")]
    InvalidTransferArguments,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case::account_not_found(
        GatewayError::AccountNotFound { account_id: 7 },
        "Account not found: 7"
    )]
    #[case::insufficient_funds(
        GatewayError::insufficient_funds(1, Decimal::new(500, 2), Decimal::new(1000, 2)),
        "Insufficient funds in account 1: available 5.00, requested 10.00"
    )]
    #[case::currency_mismatch(
        GatewayError::currency_mismatch(1, "USD", 3, "EUR"),
        "Currency mismatch: account 1 is USD, account 3 is EUR"
    )]
    #[case::invalid_amount(
        GatewayError::invalid_amount(Decimal::new(-5, 0), "amount must be positive"),
        "Invalid amount -5: amount must be positive"
    )]
    #[case::same_account(
        GatewayError::SameAccount { account_id: 4 },
        "Cannot transfer from account 4 to itself"
    )]
    #[case::transfer_failed(
        GatewayError::transfer_failed(GatewayError::account_not_found(99)),
        "Transfer failed: Account not found: 99"
    )]
    #[case::parse_error_with_line(
        GatewayError::ParseError { line: Some(3), message: "Invalid field".to_string() },
        "CSV parse error at line 3: Invalid field"
    )]
    #[case::parse_error_without_line(
        GatewayError::ParseError { line: None, message: "Invalid field".to_string() },
        "CSV parse error: Invalid field"
    )]
    #[case::read_only(
        GatewayError::read_only("transfer_money"),
        "Cannot execute transfer_money in a read-only transaction"
    )]
    fn test_error_display(#[case] error: GatewayError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::balance(CommandError::InvalidBalanceArguments, "Invalid BALANCE arguments")]
    #[case::transfer(CommandError::InvalidTransferArguments, "Invalid TRANSFER arguments")]
    fn test_command_error_display(#[case] error: CommandError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_transfer_failed_exposes_source() {
        use std::error::Error;

        let error = GatewayError::transfer_failed(GatewayError::SameAccount { account_id: 1 });
        let source = error.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Cannot transfer from account 1 to itself"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: GatewayError = io_error.into();
        assert!(matches!(error, GatewayError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
