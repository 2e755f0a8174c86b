//! Collaborator traits consumed by the command dispatcher
//!
//! The dispatcher never touches the ledger itself. It calls a balance lookup
//! and a money transfer collaborator, which lets the ledger-backed services be
//! swapped for fakes in tests.

use crate::types::{AccountId, GatewayError};
use rust_decimal::Decimal;
use std::future::Future;

/// Balance lookup collaborator
pub trait AccountLookup: Send + Sync {
    /// Get the balance of an account
    ///
    /// Fails with [`GatewayError::AccountNotFound`] when no such account exists.
    fn balance(
        &self,
        account_id: AccountId,
    ) -> impl Future<Output = Result<Decimal, GatewayError>> + Send;
}

/// Money transfer collaborator
///
/// On failure no balance has changed.
pub trait MoneyTransfer: Send + Sync {
    /// Move `amount` from `from` to `to`
    fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        description: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}
