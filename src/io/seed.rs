//! Account seed loading
//!
//! The ledger is populated at startup from a CSV file with one account per
//! row:
//!
//! ```text
//! account_id,customer_id,customer_name,customer_email,account_type,balance,currency
//! 1,10,Alice Martins,alice@example.com,checking,1000.00,USD
//! ```
//!
//! Loading is all-or-nothing: any malformed row aborts startup with an error
//! naming its line.

use crate::store::Ledger;
use crate::types::{Account, AccountId, CustomerId, GatewayError, BALANCE_SCALE};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// CSV row structure for deserialization
///
/// The balance is kept as text so that its precision can be checked before
/// it becomes a `Decimal`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AccountRecord {
    pub account_id: AccountId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_email: String,
    pub account_type: String,
    pub balance: String,
    pub currency: String,
}

/// Convert an AccountRecord to an Account
///
/// This function:
/// - Parses the balance into a Decimal with at most two decimal places
/// - Upper-cases the currency and checks it is a three-letter code
///
/// # Returns
///
/// * `Ok(Account)` - Successfully converted record
/// * `Err(String)` - Error message describing the conversion failure
pub fn convert_account_record(record: AccountRecord) -> Result<Account, String> {
    let balance = Decimal::from_str(&record.balance).map_err(|_| {
        format!(
            "Invalid balance '{}' for account {}",
            record.balance, record.account_id
        )
    })?;
    if balance.normalize().scale() > BALANCE_SCALE {
        return Err(format!(
            "Balance '{}' for account {} has more than {} decimal places",
            record.balance, record.account_id, BALANCE_SCALE
        ));
    }

    let currency = record.currency.to_ascii_uppercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!(
            "Invalid currency '{}' for account {}",
            record.currency, record.account_id
        ));
    }

    let mut account = Account::new(record.account_id, balance, &currency).with_customer(
        record.customer_id,
        &record.customer_name,
        &record.customer_email,
    );
    account.account_type = record.account_type;
    Ok(account)
}

/// Read every account from a seed CSV file
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist ([`GatewayError::FileNotFound`])
/// - The file cannot be read
/// - A row is malformed ([`GatewayError::ParseError`] with its line)
pub fn load_accounts(path: &Path) -> Result<Vec<Account>, GatewayError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => GatewayError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => GatewayError::from(e),
    })?;

    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(file);
    let headers = reader.headers()?.clone();

    let mut accounts = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map(|pos| pos.line());
        let account = parse_row(&record, &headers)
            .map_err(|message| GatewayError::ParseError { line, message })?;
        debug!(account_id = account.account_id, balance = %account.balance, "seed account");
        accounts.push(account);
    }

    Ok(accounts)
}

/// Build a ledger from a seed CSV file
///
/// # Errors
///
/// Same as [`load_accounts`], plus [`GatewayError::DuplicateAccount`] if an
/// id appears twice.
pub fn load_ledger(path: &Path) -> Result<Ledger, GatewayError> {
    let ledger = Ledger::from_accounts(load_accounts(path)?)?;
    info!(path = %path.display(), accounts = ledger.len(), "ledger seeded");
    Ok(ledger)
}

fn parse_row(record: &StringRecord, headers: &StringRecord) -> Result<Account, String> {
    let row: AccountRecord = record
        .deserialize(Some(headers))
        .map_err(|e| e.to_string())?;
    convert_account_record(row)
}
