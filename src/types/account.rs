//! Account-related types for the Transaction Gateway
//!
//! This module defines the Account structure as it is exposed by the ledger:
//! the account row joined with the data of the customer who owns it.

use rust_decimal::Decimal;

/// Account identifier
///
/// Matches the integer ids accepted on the wire (`BALANCE <id>`).
pub type AccountId = i32;

/// Customer identifier
pub type CustomerId = i32;

/// Number of decimal places every balance is kept at
pub const BALANCE_SCALE: u32 = 2;

/// Bank account joined with its owning customer
///
/// Returned by account lookups. A value of this type is a snapshot: it is
/// copied out of a transaction scope and does not observe later changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Unique account identifier
    pub account_id: AccountId,

    /// Identifier of the customer owning the account
    pub customer_id: CustomerId,

    /// Full name of the owning customer
    pub customer_name: String,

    /// Contact e-mail of the owning customer
    pub customer_email: String,

    /// Free-form account type (`checking`, `savings`, ...)
    pub account_type: String,

    /// Current balance, kept at [`BALANCE_SCALE`] decimal places
    pub balance: Decimal,

    /// Three-letter currency code (`USD`, `EUR`, ...)
    ///
    /// Transfers are only allowed between accounts sharing a currency.
    pub currency: String,
}

impl Account {
    /// Create an account with the given balance and currency
    ///
    /// Customer fields are left empty; this is mostly useful for tests and
    /// for building a ledger programmatically.
    ///
    /// # Arguments
    ///
    /// * `account_id` - The account identifier
    /// * `balance` - Opening balance
    /// * `currency` - Three-letter currency code
    pub fn new(account_id: AccountId, balance: Decimal, currency: &str) -> Self {
        Account {
            account_id,
            customer_id: 0,
            customer_name: String::new(),
            customer_email: String::new(),
            account_type: "checking".to_string(),
            balance,
            currency: currency.to_string(),
        }
    }

    /// Set the owning customer (builder style)
    pub fn with_customer(mut self, customer_id: CustomerId, name: &str, email: &str) -> Self {
        self.customer_id = customer_id;
        self.customer_name = name.to_string();
        self.customer_email = email.to_string();
        self
    }
}
