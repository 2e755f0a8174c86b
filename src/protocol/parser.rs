//! Command parsing
//!
//! Turns one line of client input into a [`Command`]. The grammar is
//! whitespace separated tokens with an exact-case verb:
//!
//! ```text
//! PING
//! BALANCE <accountId>
//! TRANSFER <fromId> <toId> <amount> [description...]
//! ```
//!
//! Malformed arguments produce a [`CommandError`] and unknown verbs produce
//! [`Command::Unknown`]; neither is fatal for the connection.

use crate::types::{AccountId, Command, CommandError, DEFAULT_TRANSFER_DESCRIPTION};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse one line of client input
///
/// The line should already be stripped of its line ending. Tokens after the
/// ones a command needs are ignored, except for `TRANSFER` where everything
/// after the amount is the description.
///
/// # Examples
///
/// ```
/// use rust_transaction_gateway::protocol::parse_command;
/// use rust_transaction_gateway::types::Command;
///
/// assert_eq!(parse_command("BALANCE 7"), Ok(Command::Balance { account_id: 7 }));
/// ```
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let (verb, rest) = split_token(line).unwrap_or(("", ""));

    match verb {
        "PING" => Ok(Command::Ping),
        "BALANCE" => parse_balance(rest),
        "TRANSFER" => parse_transfer(rest),
        _ => Ok(Command::Unknown {
            verb: verb.to_string(),
        }),
    }
}

fn parse_balance(args: &str) -> Result<Command, CommandError> {
    let (id, _) = split_token(args).ok_or(CommandError::InvalidBalanceArguments)?;
    let account_id = parse_account_id(id).ok_or(CommandError::InvalidBalanceArguments)?;

    Ok(Command::Balance { account_id })
}

fn parse_transfer(args: &str) -> Result<Command, CommandError> {
    let invalid = CommandError::InvalidTransferArguments;

    let (from, rest) = split_token(args).ok_or(invalid)?;
    let (to, rest) = split_token(rest).ok_or(invalid)?;
    let (amount, rest) = split_token(rest).ok_or(invalid)?;

    let from = parse_account_id(from).ok_or(invalid)?;
    let to = parse_account_id(to).ok_or(invalid)?;
    let amount = parse_amount(amount).ok_or(invalid)?;

    let description = rest.trim_start();
    let description = if description.is_empty() {
        DEFAULT_TRANSFER_DESCRIPTION
    } else {
        description
    };

    Ok(Command::Transfer {
        from,
        to,
        amount,
        description: description.to_string(),
    })
}

/// Split off the first whitespace-delimited token
///
/// Returns the token and everything after it (starting with the separating
/// whitespace), or `None` if `input` holds no token.
fn split_token(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }

    match input.find(char::is_whitespace) {
        Some(end) => Some((&input[..end], &input[end..])),
        None => Some((input, "")),
    }
}

fn parse_account_id(token: &str) -> Option<AccountId> {
    AccountId::from_str(token).ok()
}

/// Plain decimal notation first, then scientific (`1e2`, `2.5E-1`)
fn parse_amount(token: &str) -> Option<Decimal> {
    Decimal::from_str(token)
        .or_else(|_| Decimal::from_scientific(token))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn transfer(from: AccountId, to: AccountId, amount: &str, description: &str) -> Command {
        Command::Transfer {
            from,
            to,
            amount: dec(amount),
            description: description.to_string(),
        }
    }

    #[rstest]
    #[case::bare("PING")]
    #[case::extra_tokens("PING please")]
    #[case::padded("   PING   ")]
    fn test_parse_ping(#[case] line: &str) {
        assert_eq!(parse_command(line), Ok(Command::Ping));
    }

    #[rstest]
    #[case::simple("BALANCE 1", 1)]
    #[case::large("BALANCE 2147483647", i32::MAX)]
    #[case::negative("BALANCE -3", -3)]
    #[case::extra_tokens("BALANCE 12 extra", 12)]
    #[case::tabs("BALANCE\t42", 42)]
    fn test_parse_balance(#[case] line: &str, #[case] expected: AccountId) {
        assert_eq!(
            parse_command(line),
            Ok(Command::Balance {
                account_id: expected
            })
        );
    }

    #[rstest]
    #[case::missing_id("BALANCE")]
    #[case::trailing_space("BALANCE ")]
    #[case::not_a_number("BALANCE abc")]
    #[case::partly_numeric("BALANCE 12abc")]
    #[case::decimal("BALANCE 1.5")]
    #[case::overflow("BALANCE 2147483648")]
    fn test_parse_balance_invalid(#[case] line: &str) {
        assert_eq!(
            parse_command(line),
            Err(CommandError::InvalidBalanceArguments)
        );
    }

    #[rstest]
    #[case::default_description("TRANSFER 1 2 10.00", transfer(1, 2, "10.00", "Server transfer"))]
    #[case::description("TRANSFER 1 2 10.00 rent", transfer(1, 2, "10.00", "rent"))]
    #[case::multi_word(
        "TRANSFER 1 2 5 monthly rent  share",
        transfer(1, 2, "5", "monthly rent  share")
    )]
    #[case::integer_amount("TRANSFER 3 4 7", transfer(3, 4, "7", "Server transfer"))]
    #[case::scientific("TRANSFER 1 2 1e2", transfer(1, 2, "100", "Server transfer"))]
    #[case::negative_amount("TRANSFER 1 2 -5.00", transfer(1, 2, "-5.00", "Server transfer"))]
    #[case::blank_description("TRANSFER 1 2 10.00    ", transfer(1, 2, "10.00", "Server transfer"))]
    fn test_parse_transfer(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(parse_command(line), Ok(expected));
    }

    #[rstest]
    #[case::no_args("TRANSFER")]
    #[case::missing_to("TRANSFER 1")]
    #[case::missing_amount("TRANSFER 1 2")]
    #[case::bad_from("TRANSFER x 2 10.00")]
    #[case::bad_to("TRANSFER 1 y 10.00")]
    #[case::bad_amount("TRANSFER 1 2 ten")]
    #[case::amount_with_currency("TRANSFER 1 2 10USD")]
    fn test_parse_transfer_invalid(#[case] line: &str) {
        assert_eq!(
            parse_command(line),
            Err(CommandError::InvalidTransferArguments)
        );
    }

    #[rstest]
    #[case::unknown_verb("WITHDRAW 1 10", "WITHDRAW")]
    #[case::lowercase("ping", "ping")]
    #[case::mixed_case("Balance 1", "Balance")]
    #[case::whitespace_only("   ", "")]
    fn test_parse_unknown(#[case] line: &str, #[case] verb: &str) {
        assert_eq!(
            parse_command(line),
            Ok(Command::Unknown {
                verb: verb.to_string()
            })
        );
    }

    #[test]
    fn test_split_token() {
        assert_eq!(split_token("  a b c"), Some(("a", " b c")));
        assert_eq!(split_token("single"), Some(("single", "")));
        assert_eq!(split_token(" \t "), None);
    }
}
