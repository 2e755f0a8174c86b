//! Transaction scopes over the ledger
//!
//! A [`Transaction`] borrows the ledger mutably for its whole lifetime, so no
//! other scope can exist at the same time. Writes are staged inside the scope
//! and only reach the ledger on [`Transaction::commit`]. A scope that ends any
//! other way (explicit rollback, early return, `?`, unwinding) discards its
//! staged changes.
//!
//! Once a statement fails, the scope is aborted: every further statement and
//! the commit are refused with [`GatewayError::TransactionAborted`].

use super::ledger::{Ledger, PendingTransfer};
use super::procedure::plan_transfer;
use crate::types::{Account, AccountId, GatewayError};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

/// Whether a scope may write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    /// Queries only; writes are refused
    ReadOnly,
    /// Queries and writes
    ReadWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransactionState {
    Active,
    Aborted,
    Finished,
}

/// A transaction scope
#[derive(Debug)]
pub struct Transaction<'a> {
    ledger: &'a mut Ledger,
    mode: TransactionMode,
    staged_balances: HashMap<AccountId, Decimal>,
    staged_transfers: Vec<PendingTransfer>,
    state: TransactionState,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(ledger: &'a mut Ledger, mode: TransactionMode) -> Self {
        Transaction {
            ledger,
            mode,
            staged_balances: HashMap::new(),
            staged_transfers: Vec::new(),
            state: TransactionState::Active,
        }
    }

    /// Mode this scope was opened with
    pub fn mode(&self) -> TransactionMode {
        self.mode
    }

    /// Whether the scope holds uncommitted writes
    pub fn is_dirty(&self) -> bool {
        !self.staged_transfers.is_empty()
    }

    /// Look up an account as seen by this transaction
    ///
    /// Balances reflect transfers staged earlier in the same scope.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Account))` - A snapshot of the account
    /// * `Ok(None)` - No account has this id
    /// * `Err(GatewayError::TransactionAborted)` - A previous statement failed
    pub fn account(&self, account_id: AccountId) -> Result<Option<Account>, GatewayError> {
        self.ensure_active()?;
        Ok(self.view(account_id))
    }

    /// Look up the balance of an account as seen by this transaction
    pub fn balance(&self, account_id: AccountId) -> Result<Option<Decimal>, GatewayError> {
        self.ensure_active()?;
        Ok(self.view(account_id).map(|account| account.balance))
    }

    /// Move money between two accounts
    ///
    /// Runs the transfer rules (see [`super::procedure`]) against the balances
    /// visible in this scope and stages the result. Nothing reaches the ledger
    /// before [`commit`](Self::commit).
    ///
    /// # Arguments
    ///
    /// * `from` - Debited account
    /// * `to` - Credited account
    /// * `amount` - Positive amount with at most two decimal places
    /// * `description` - Free-form text stored in the journal
    ///
    /// # Errors
    ///
    /// Returns an error, and aborts the scope, if:
    /// - The scope is read-only
    /// - Either account does not exist
    /// - Any transfer rule rejects the request
    pub fn transfer_money(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<(), GatewayError> {
        self.ensure_active()?;

        let result = self.stage_transfer(from, to, amount, description);
        if result.is_err() {
            self.state = TransactionState::Aborted;
        }
        result
    }

    /// Make the staged changes visible in the ledger
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::TransactionAborted`] if a statement failed
    /// earlier; the staged changes are discarded in that case.
    pub fn commit(mut self) -> Result<(), GatewayError> {
        self.ensure_active()?;

        let balances = std::mem::take(&mut self.staged_balances);
        let transfers = std::mem::take(&mut self.staged_transfers);
        self.ledger.apply(balances, transfers);
        self.state = TransactionState::Finished;

        Ok(())
    }

    /// Discard the staged changes
    pub fn rollback(mut self) {
        self.discard();
    }

    fn stage_transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        description: &str,
    ) -> Result<(), GatewayError> {
        if self.mode == TransactionMode::ReadOnly {
            return Err(GatewayError::read_only("transfer_money"));
        }

        let source = self
            .view(from)
            .ok_or_else(|| GatewayError::account_not_found(from))?;
        let target = self
            .view(to)
            .ok_or_else(|| GatewayError::account_not_found(to))?;

        let plan = plan_transfer(&source, &target, amount)?;

        self.staged_balances.insert(from, plan.from_balance);
        self.staged_balances.insert(to, plan.to_balance);
        self.staged_transfers.push(PendingTransfer {
            from,
            to,
            amount: plan.amount,
            description: description.to_string(),
        });

        Ok(())
    }

    fn view(&self, account_id: AccountId) -> Option<Account> {
        let mut account = self.ledger.get(account_id)?.clone();
        if let Some(balance) = self.staged_balances.get(&account_id) {
            account.balance = *balance;
        }
        Some(account)
    }

    fn ensure_active(&self) -> Result<(), GatewayError> {
        match self.state {
            TransactionState::Active => Ok(()),
            TransactionState::Aborted | TransactionState::Finished => {
                Err(GatewayError::TransactionAborted)
            }
        }
    }

    fn discard(&mut self) {
        if self.is_dirty() {
            debug!(
                staged = self.staged_transfers.len(),
                "rolling back uncommitted transaction"
            );
        }
        self.staged_balances.clear();
        self.staged_transfers.clear();
        self.state = TransactionState::Finished;
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.state != TransactionState::Finished {
            self.discard();
        }
    }
}
