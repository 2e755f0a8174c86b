//! Response rendering
//!
//! Every [`Response`] becomes exactly one line terminated by `\n`.

use crate::types::{Response, BALANCE_SCALE};

/// Render a response as a wire line, including the trailing newline
pub fn format_response(response: &Response) -> String {
    match response {
        Response::Pong => "PONG\n".to_string(),
        Response::Balance { account_id, amount } => format!(
            "BALANCE {} {:.prec$}\n",
            account_id,
            amount,
            prec = BALANCE_SCALE as usize
        ),
        Response::Ok => "OK\n".to_string(),
        Response::Error { message } => format!("ERROR {}\n", single_line(message)),
    }
}

// A message containing a line break would be read as two responses
fn single_line(message: &str) -> String {
    message.replace(['\r', '\n'], " ")
}
