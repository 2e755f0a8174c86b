//! Command dispatch
//!
//! The `Dispatcher` maps a parsed command to a call against the collaborators
//! and turns every outcome into a [`Response`]. It is the boundary where
//! internal failures stop: collaborator errors become `ERROR <message>`
//! responses, and a panic inside a collaborator is caught and reported as
//! `ERROR Internal error` so the connection survives it.

use super::traits::{AccountLookup, MoneyTransfer};
use crate::types::{Command, CommandError, Response};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error};

/// Message sent for verbs the gateway does not know
pub const UNKNOWN_COMMAND_MESSAGE: &str = "Unknown command";

/// Message sent when a collaborator panicked
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal error";

/// Routes commands to the balance lookup and transfer collaborators
#[derive(Debug, Clone)]
pub struct Dispatcher<A, T> {
    accounts: A,
    transfers: T,
}

impl<A, T> Dispatcher<A, T>
where
    A: AccountLookup,
    T: MoneyTransfer,
{
    /// Create a dispatcher over the given collaborators
    pub fn new(accounts: A, transfers: T) -> Self {
        Self {
            accounts,
            transfers,
        }
    }

    /// Answer one parsed command
    ///
    /// Never fails: every error is folded into [`Response::Error`].
    ///
    /// # Arguments
    ///
    /// * `parsed` - Output of the command parser for one line
    pub async fn dispatch(&self, parsed: Result<Command, CommandError>) -> Response {
        let command = match parsed {
            Ok(command) => command,
            Err(e) => {
                debug!(error = %e, "rejecting malformed command");
                return Response::error(e);
            }
        };

        let verb = command.verb().to_string();
        match AssertUnwindSafe(self.execute(command)).catch_unwind().await {
            Ok(response) => response,
            Err(_) => {
                error!(verb = %verb, "collaborator panicked while handling command");
                Response::error(INTERNAL_ERROR_MESSAGE)
            }
        }
    }

    async fn execute(&self, command: Command) -> Response {
        match command {
            Command::Ping => Response::Pong,
            Command::Balance { account_id } => match self.accounts.balance(account_id).await {
                Ok(amount) => Response::Balance { account_id, amount },
                Err(e) => Response::error(e),
            },
            Command::Transfer {
                from,
                to,
                amount,
                description,
            } => match self
                .transfers
                .transfer(from, to, amount, &description)
                .await
            {
                Ok(()) => Response::Ok,
                Err(e) => Response::error(e),
            },
            Command::Unknown { verb } => {
                debug!(verb = %verb, "unknown command");
                Response::error(UNKNOWN_COMMAND_MESSAGE)
            }
        }
    }
}
