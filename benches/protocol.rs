//! Benchmark suite for the request path
//!
//! Measures the pieces every request goes through, without the network:
//! command parsing, response formatting and a committed ledger transfer
//! behind the gatekeeper.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//! ```

use rust_decimal::Decimal;
use rust_transaction_gateway::protocol::{format_response, parse_command};
use rust_transaction_gateway::types::{Account, Response};
use rust_transaction_gateway::{Gatekeeper, Ledger};

fn main() {
    divan::main();
}

const COMMANDS: &[&str] = &[
    "PING",
    "BALANCE 12345",
    "TRANSFER 1 2 10.00",
    "TRANSFER 1 2 1250.75 monthly rent for the flat",
    "WITHDRAW 1 10",
];

/// Parse a representative mix of command lines
#[divan::bench]
fn parse_mixed_commands() {
    for line in COMMANDS {
        let _ = divan::black_box(parse_command(divan::black_box(line)));
    }
}

/// Render every response kind
#[divan::bench]
fn format_mixed_responses(bencher: divan::Bencher) {
    let responses = [
        Response::Pong,
        Response::Ok,
        Response::Balance {
            account_id: 12345,
            amount: Decimal::new(123_456_789, 2),
        },
        Response::error("Transfer failed: Insufficient funds in account 1"),
    ];

    bencher.bench_local(|| {
        for response in &responses {
            divan::black_box(format_response(divan::black_box(response)));
        }
    });
}

/// One committed transfer through the gatekeeper, including lock acquisition
#[divan::bench(args = [10, 1_000])]
fn ledger_transfer(bencher: divan::Bencher, accounts: i32) {
    let ledger = Ledger::from_accounts(
        (1..=accounts).map(|id| Account::new(id, Decimal::new(1_000_000_000, 2), "USD")),
    )
    .expect("Failed to build ledger");
    let gatekeeper = Gatekeeper::new(ledger);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("Failed to create tokio runtime");

    bencher.bench_local(|| {
        runtime.block_on(async {
            gatekeeper
                .write(|tx| tx.transfer_money(1, accounts, Decimal::new(1, 2), "bench"))
                .await
                .expect("Transfer failed");
        })
    });
}
