//! Transfer rules of the ledger
//!
//! This module holds the checks the `transfer_money` procedure runs before any
//! balance is touched. All functions are pure: they only compute the balances
//! a transfer would produce, leaving staging and commit to the transaction
//! scope.
//!
//! The rules, in evaluation order:
//! - the amount is positive and has at most [`BALANCE_SCALE`] decimal places
//! - source and target are different accounts
//! - both accounts exist (checked by the caller)
//! - both accounts hold the same currency
//! - the source balance covers the amount
//! - neither balance overflows

use crate::types::{Account, GatewayError, BALANCE_SCALE};
use rust_decimal::Decimal;

/// Balances resulting from a validated transfer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferPlan {
    /// Amount rescaled to [`BALANCE_SCALE`] decimal places
    pub amount: Decimal,
    /// Source balance after the debit
    pub from_balance: Decimal,
    /// Target balance after the credit
    pub to_balance: Decimal,
}

/// Validate a transfer amount
///
/// # Arguments
///
/// * `amount` - Amount as received from the client
///
/// # Returns
///
/// * `Ok(Decimal)` - The amount rescaled to two decimal places
/// * `Err(GatewayError::InvalidAmount)` - If the amount is not positive or is
///   more precise than a cent
pub fn validate_amount(amount: Decimal) -> Result<Decimal, GatewayError> {
    if amount <= Decimal::ZERO {
        return Err(GatewayError::invalid_amount(amount, "amount must be positive"));
    }

    let mut normalized = amount.normalize();
    if normalized.scale() > BALANCE_SCALE {
        return Err(GatewayError::invalid_amount(
            amount,
            "amount must have at most 2 decimal places",
        ));
    }
    normalized.rescale(BALANCE_SCALE);

    Ok(normalized)
}

/// Compute the balances produced by moving `amount` from `from` to `to`
///
/// Both accounts must already reflect every change staged earlier in the
/// same transaction.
///
/// # Errors
///
/// Returns an error if:
/// - The amount is invalid (see [`validate_amount`])
/// - Both sides are the same account
/// - The currencies differ
/// - The source balance is lower than the amount
/// - A resulting balance would overflow
pub fn plan_transfer(
    from: &Account,
    to: &Account,
    amount: Decimal,
) -> Result<TransferPlan, GatewayError> {
    let amount = validate_amount(amount)?;

    if from.account_id == to.account_id {
        return Err(GatewayError::SameAccount {
            account_id: from.account_id,
        });
    }

    if from.currency != to.currency {
        return Err(GatewayError::currency_mismatch(
            from.account_id,
            &from.currency,
            to.account_id,
            &to.currency,
        ));
    }

    if from.balance < amount {
        return Err(GatewayError::insufficient_funds(
            from.account_id,
            from.balance,
            amount,
        ));
    }

    let from_balance = from
        .balance
        .checked_sub(amount)
        .ok_or_else(|| GatewayError::arithmetic_overflow("transfer debit", from.account_id))?;

    let to_balance = to
        .balance
        .checked_add(amount)
        .ok_or_else(|| GatewayError::arithmetic_overflow("transfer credit", to.account_id))?;

    Ok(TransferPlan {
        amount,
        from_balance,
        to_balance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[rstest]
    #[case::integer("10", "10.00")]
    #[case::cents("10.5", "10.50")]
    #[case::trailing_zeros("10.000", "10.00")]
    #[case::smallest("0.01", "0.01")]
    fn test_validate_amount_accepts(#[case] input: &str, #[case] expected: &str) {
        let amount = validate_amount(dec(input)).unwrap();
        assert_eq!(amount.to_string(), expected);
    }

    #[rstest]
    #[case::zero("0", "must be positive")]
    #[case::negative("-5", "must be positive")]
    #[case::sub_cent("0.001", "at most 2 decimal places")]
    fn test_validate_amount_rejects(#[case] input: &str, #[case] reason: &str) {
        let error = validate_amount(dec(input)).unwrap_err();
        assert!(matches!(error, GatewayError::InvalidAmount { .. }));
        assert!(error.to_string().contains(reason));
    }

    #[test]
    fn test_plan_transfer_moves_amount() {
        let from = Account::new(1, dec("100.00"), "USD");
        let to = Account::new(2, dec("5.00"), "USD");

        let plan = plan_transfer(&from, &to, dec("10")).unwrap();

        assert_eq!(plan.amount, dec("10.00"));
        assert_eq!(plan.from_balance, dec("90.00"));
        assert_eq!(plan.to_balance, dec("15.00"));
    }

    #[test]
    fn test_plan_transfer_allows_emptying_account() {
        let from = Account::new(1, dec("10.00"), "USD");
        let to = Account::new(2, dec("0.00"), "USD");

        let plan = plan_transfer(&from, &to, dec("10.00")).unwrap();

        assert_eq!(plan.from_balance, Decimal::ZERO);
        assert_eq!(plan.to_balance, dec("10.00"));
    }

    #[test]
    fn test_plan_transfer_insufficient_funds() {
        let from = Account::new(1, dec("5.00"), "USD");
        let to = Account::new(2, dec("0.00"), "USD");

        let result = plan_transfer(&from, &to, dec("10.00"));

        assert_eq!(
            result.unwrap_err(),
            GatewayError::insufficient_funds(1, dec("5.00"), dec("10.00"))
        );
    }

    #[test]
    fn test_plan_transfer_currency_mismatch() {
        let from = Account::new(1, dec("100.00"), "USD");
        let to = Account::new(3, dec("100.00"), "EUR");

        let result = plan_transfer(&from, &to, dec("1.00"));

        assert!(matches!(
            result.unwrap_err(),
            GatewayError::CurrencyMismatch { from: 1, to: 3, .. }
        ));
    }

    #[test]
    fn test_plan_transfer_same_account() {
        let account = Account::new(1, dec("100.00"), "USD");

        let result = plan_transfer(&account, &account, dec("1.00"));

        assert_eq!(result.unwrap_err(), GatewayError::SameAccount { account_id: 1 });
    }

    #[test]
    fn test_plan_transfer_amount_checked_before_accounts() {
        let from = Account::new(1, dec("100.00"), "USD");
        let to = Account::new(3, dec("100.00"), "EUR");

        let result = plan_transfer(&from, &to, dec("-1"));

        assert!(matches!(result.unwrap_err(), GatewayError::InvalidAmount { .. }));
    }

    #[test]
    fn test_plan_transfer_credit_overflow() {
        let from = Account::new(1, dec("100.00"), "USD");
        let to = Account::new(2, Decimal::MAX, "USD");

        let result = plan_transfer(&from, &to, dec("1.00"));

        assert_eq!(
            result.unwrap_err(),
            GatewayError::arithmetic_overflow("transfer credit", 2)
        );
    }
}
