//! Money transfers
//!
//! `TransactionService` is a thin wrapper around the ledger's
//! `transfer_money` procedure: it opens a write transaction under the
//! gatekeeper lock, runs the procedure and commits. Any rejection is reported
//! as [`GatewayError::TransferFailed`] and leaves every balance untouched.

use super::gatekeeper::Gatekeeper;
use super::traits::MoneyTransfer;
use crate::types::{AccountId, GatewayError};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

/// Write-side service over the shared ledger
#[derive(Debug, Clone)]
pub struct TransactionService {
    gatekeeper: Arc<Gatekeeper>,
}

impl TransactionService {
    /// Create a service sharing the given gatekeeper
    pub fn new(gatekeeper: Arc<Gatekeeper>) -> Self {
        Self { gatekeeper }
    }

    /// Perform a transfer between two accounts
    ///
    /// # Arguments
    ///
    /// * `from` - Debited account
    /// * `to` - Credited account
    /// * `amount` - Amount to move
    /// * `description` - Text stored in the transfer journal
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::TransferFailed`] wrapping the ledger's reason
    /// (unknown account, insufficient funds, currency mismatch, invalid
    /// amount, ...).
    pub async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<(), GatewayError> {
        debug!(from, to, %amount, description, "transfer start");

        let result = self
            .gatekeeper
            .write(|tx| tx.transfer_money(from, to, amount, description))
            .await;

        match result {
            Ok(()) => {
                info!(from, to, %amount, "transfer committed");
                Ok(())
            }
            Err(e) => {
                debug!(from, to, %amount, error = %e, "transfer rejected");
                Err(GatewayError::transfer_failed(e))
            }
        }
    }
}

impl MoneyTransfer for TransactionService {
    async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<(), GatewayError> {
        TransactionService::transfer(self, from, to, amount, description).await
    }
}
