//! Account lookups
//!
//! This module provides the `AccountService`, the high-level entry point for
//! reading account data. Every lookup runs in its own read-only transaction,
//! under the gatekeeper lock, and commits before returning.

use super::gatekeeper::Gatekeeper;
use super::traits::AccountLookup;
use crate::types::{Account, AccountId, GatewayError};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// Read-side service over the shared ledger
#[derive(Debug, Clone)]
pub struct AccountService {
    gatekeeper: Arc<Gatekeeper>,
}

impl AccountService {
    /// Create a service sharing the given gatekeeper
    pub fn new(gatekeeper: Arc<Gatekeeper>) -> Self {
        Self { gatekeeper }
    }

    /// Get an account by id
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Account))` - A snapshot of the account and its customer
    /// * `Ok(None)` - No account exists with this id
    pub async fn get_account(
        &self,
        account_id: AccountId,
    ) -> Result<Option<Account>, GatewayError> {
        self.gatekeeper.read(|tx| tx.account(account_id)).await
    }

    /// Check if an account exists
    pub async fn account_exists(&self, account_id: AccountId) -> Result<bool, GatewayError> {
        Ok(self.get_account(account_id).await?.is_some())
    }

    /// Get the balance of an account
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::AccountNotFound`] if no account has this id.
    pub async fn get_balance(&self, account_id: AccountId) -> Result<Decimal, GatewayError> {
        let balance = self
            .gatekeeper
            .read(|tx| tx.balance(account_id))
            .await?
            .ok_or_else(|| GatewayError::account_not_found(account_id))?;

        debug!(account_id, %balance, "balance lookup");
        Ok(balance)
    }
}

impl AccountLookup for AccountService {
    async fn balance(&self, account_id: AccountId) -> Result<Decimal, GatewayError> {
        self.get_balance(account_id).await
    }
}
