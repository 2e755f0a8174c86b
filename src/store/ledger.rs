//! In-process transactional ledger
//!
//! The `Ledger` holds the accounts table and the transfer journal. It plays
//! the role of the single backing-store connection: it has no locking of its
//! own and all reads and writes go through a [`Transaction`] scope, which in
//! turn can only be opened while holding the gatekeeper lock.
//!
//! Direct mutation (`insert_account`) is only meant for building the ledger
//! before it is handed to the gatekeeper.

use super::transaction::{Transaction, TransactionMode};
use crate::types::{Account, AccountId, GatewayError, TransferId, TransferRecord, BALANCE_SCALE};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// A transfer staged by a transaction, not yet journaled
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PendingTransfer {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Decimal,
    pub description: String,
}

/// Accounts table plus transfer journal
#[derive(Debug)]
pub struct Ledger {
    /// Accounts by id, ordered for deterministic listings
    accounts: BTreeMap<AccountId, Account>,

    /// Committed transfers in commit order
    journal: Vec<TransferRecord>,

    /// Id given to the next journaled transfer
    next_transfer_id: TransferId,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Ledger {
            accounts: BTreeMap::new(),
            journal: Vec::new(),
            next_transfer_id: 1,
        }
    }

    /// Build a ledger from a list of accounts
    ///
    /// # Errors
    ///
    /// Returns an error if two accounts share an id or a balance is more
    /// precise than a cent.
    pub fn from_accounts(
        accounts: impl IntoIterator<Item = Account>,
    ) -> Result<Self, GatewayError> {
        let mut ledger = Ledger::new();
        for account in accounts {
            ledger.insert_account(account)?;
        }
        Ok(ledger)
    }

    /// Add an account to the ledger
    ///
    /// The balance is stored at two decimal places.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An account with the same id already exists
    /// - The balance has more than two decimal places
    pub fn insert_account(&mut self, mut account: Account) -> Result<(), GatewayError> {
        if self.accounts.contains_key(&account.account_id) {
            return Err(GatewayError::DuplicateAccount {
                account_id: account.account_id,
            });
        }

        let mut balance = account.balance.normalize();
        if balance.scale() > BALANCE_SCALE {
            return Err(GatewayError::invalid_amount(
                account.balance,
                "balance must have at most 2 decimal places",
            ));
        }
        balance.rescale(BALANCE_SCALE);
        account.balance = balance;

        self.accounts.insert(account.account_id, account);
        Ok(())
    }

    /// Number of accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether the ledger holds no account
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Committed transfers, oldest first
    pub fn journal(&self) -> &[TransferRecord] {
        &self.journal
    }

    /// Open a read-only transaction scope
    ///
    /// Prefer the gatekeeper's guard, which is the only way to reach a ledger
    /// shared between tasks.
    pub fn begin_read(&mut self) -> Transaction<'_> {
        Transaction::new(self, TransactionMode::ReadOnly)
    }

    /// Open a read-write transaction scope
    pub fn begin_write(&mut self) -> Transaction<'_> {
        Transaction::new(self, TransactionMode::ReadWrite)
    }

    pub(crate) fn get(&self, account_id: AccountId) -> Option<&Account> {
        self.accounts.get(&account_id)
    }

    /// Apply the changes staged by a committing transaction
    pub(crate) fn apply(
        &mut self,
        balances: HashMap<AccountId, Decimal>,
        transfers: Vec<PendingTransfer>,
    ) {
        for (account_id, balance) in balances {
            if let Some(account) = self.accounts.get_mut(&account_id) {
                account.balance = balance;
            }
        }

        for transfer in transfers {
            let transfer_id = self.next_transfer_id;
            self.next_transfer_id += 1;
            debug!(
                transfer_id,
                from = transfer.from,
                to = transfer.to,
                amount = %transfer.amount,
                "journaled transfer"
            );
            self.journal.push(TransferRecord {
                transfer_id,
                from: transfer.from,
                to: transfer.to,
                amount: transfer.amount,
                description: transfer.description,
            });
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_new_ledger_is_empty() {
        let ledger = Ledger::new();

        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
        assert!(ledger.journal().is_empty());
    }

    #[test]
    fn test_insert_account_rescales_balance() {
        let mut ledger = Ledger::new();

        ledger.insert_account(Account::new(1, dec("12.5"), "USD")).unwrap();

        let balance = ledger.get(1).unwrap().balance;
        assert_eq!(balance.to_string(), "12.50");
    }

    #[test]
    fn test_insert_account_rejects_duplicates() {
        let result = Ledger::from_accounts(vec![
            Account::new(1, dec("1.00"), "USD"),
            Account::new(1, dec("2.00"), "USD"),
        ]);

        assert_eq!(result.unwrap_err(), GatewayError::DuplicateAccount { account_id: 1 });
    }

    #[test]
    fn test_insert_account_rejects_sub_cent_balance() {
        let mut ledger = Ledger::new();

        let result = ledger.insert_account(Account::new(1, dec("1.005"), "USD"));

        assert!(matches!(result.unwrap_err(), GatewayError::InvalidAmount { .. }));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_apply_assigns_sequential_transfer_ids() {
        let mut ledger = Ledger::from_accounts(vec![
            Account::new(1, dec("10.00"), "USD"),
            Account::new(2, dec("0.00"), "USD"),
        ])
        .unwrap();

        let pending = |amount: &str| PendingTransfer {
            from: 1,
            to: 2,
            amount: dec(amount),
            description: "test".to_string(),
        };
        ledger.apply(HashMap::new(), vec![pending("1.00"), pending("2.00")]);

        let ids: Vec<TransferId> = ledger.journal().iter().map(|t| t.transfer_id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
