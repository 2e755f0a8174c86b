//! Resource gatekeeper for the shared ledger
//!
//! The gateway owns exactly one ledger handle for the whole process. The
//! `Gatekeeper` wraps it in a single async mutex so that at most one
//! transaction is in flight at any instant, whichever connection it comes
//! from.
//!
//! # Design
//!
//! Transaction scopes borrow the [`LedgerGuard`] they were opened from, so a
//! transaction cannot outlive the lock: the compiler enforces that the lock is
//! held for the full lifetime of every read or write.
//!
//! The lock is coarse: reads and writes are serialized alike.
//! Lock acquisition order decides the order transactions apply in; no
//! fairness between connections is promised.

use crate::store::{Ledger, Transaction};
use crate::types::GatewayError;
use std::time::Instant;
use tokio::sync::{Mutex, MutexGuard};
use tracing::trace;

/// Serializes all access to the shared ledger
#[derive(Debug)]
pub struct Gatekeeper {
    ledger: Mutex<Ledger>,
}

/// Exclusive access to the ledger
///
/// Released when dropped, on every exit path.
#[derive(Debug)]
pub struct LedgerGuard<'a> {
    guard: MutexGuard<'a, Ledger>,
}

impl Gatekeeper {
    /// Take ownership of the ledger
    ///
    /// # Arguments
    ///
    /// * `ledger` - The one ledger handle of the process
    pub fn new(ledger: Ledger) -> Self {
        Gatekeeper {
            ledger: Mutex::new(ledger),
        }
    }

    /// Wait for exclusive access to the ledger
    pub async fn lock(&self) -> LedgerGuard<'_> {
        let started = Instant::now();
        let guard = self.ledger.lock().await;
        trace!(waited_us = started.elapsed().as_micros() as u64, "ledger lock acquired");
        LedgerGuard { guard }
    }

    /// Get exclusive access to the ledger if nobody holds it
    pub fn try_lock(&self) -> Option<LedgerGuard<'_>> {
        self.ledger
            .try_lock()
            .ok()
            .map(|guard| LedgerGuard { guard })
    }

    /// Run `f` inside a read-only transaction
    ///
    /// Acquires the lock, opens a read-only scope, runs `f` and commits. The
    /// lock is held until the scope has ended.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns; the scope is rolled back in that case.
    pub async fn read<F, R>(&self, f: F) -> Result<R, GatewayError>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<R, GatewayError> + Send,
    {
        let mut guard = self.lock().await;
        let mut tx = guard.begin_read();
        let value = f(&mut tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Run `f` inside a read-write transaction
    ///
    /// Acquires the lock, opens a read-write scope, runs `f` and commits if it
    /// succeeded. On failure the staged changes are discarded.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or the commit error.
    pub async fn write<F, R>(&self, f: F) -> Result<R, GatewayError>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<R, GatewayError> + Send,
    {
        let mut guard = self.lock().await;
        let mut tx = guard.begin_write();
        let value = f(&mut tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Give the ledger back, e.g. after the server stopped
    pub fn into_inner(self) -> Ledger {
        self.ledger.into_inner()
    }
}

impl LedgerGuard<'_> {
    /// Open a read-only transaction on the locked ledger
    pub fn begin_read(&mut self) -> Transaction<'_> {
        self.guard.begin_read()
    }

    /// Open a read-write transaction on the locked ledger
    pub fn begin_write(&mut self) -> Transaction<'_> {
        self.guard.begin_write()
    }

    /// Read-only view of the locked ledger
    pub fn ledger(&self) -> &Ledger {
        &self.guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Account;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn gatekeeper() -> Gatekeeper {
        Gatekeeper::new(
            Ledger::from_accounts(vec![
                Account::new(1, dec("100.00"), "USD"),
                Account::new(2, dec("0.00"), "USD"),
            ])
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_try_lock_fails_while_locked() {
        let gatekeeper = gatekeeper();

        let guard = gatekeeper.lock().await;
        assert!(gatekeeper.try_lock().is_none());

        drop(guard);
        assert!(gatekeeper.try_lock().is_some());
    }

    #[tokio::test]
    async fn test_read_returns_closure_value() {
        let gatekeeper = gatekeeper();

        let balance = gatekeeper.read(|tx| tx.balance(1)).await.unwrap();

        assert_eq!(balance, Some(dec("100.00")));
    }

    #[tokio::test]
    async fn test_write_commits_on_success() {
        let gatekeeper = gatekeeper();

        gatekeeper
            .write(|tx| tx.transfer_money(1, 2, dec("25.00"), "test"))
            .await
            .unwrap();

        let balance = gatekeeper.read(|tx| tx.balance(2)).await.unwrap();
        assert_eq!(balance, Some(dec("25.00")));
        assert_eq!(gatekeeper.lock().await.ledger().journal().len(), 1);
    }

    #[tokio::test]
    async fn test_write_rolls_back_on_failure() {
        let gatekeeper = gatekeeper();

        let result = gatekeeper
            .write(|tx| {
                tx.transfer_money(1, 2, dec("25.00"), "first")?;
                tx.transfer_money(1, 2, dec("500.00"), "too much")
            })
            .await;

        assert!(matches!(result, Err(GatewayError::InsufficientFunds { .. })));
        let ledger = gatekeeper.into_inner();
        assert!(ledger.journal().is_empty());
    }

    #[tokio::test]
    async fn test_lock_released_after_failed_write() {
        let gatekeeper = gatekeeper();

        let _ = gatekeeper
            .write(|tx| tx.transfer_money(1, 99, dec("1.00"), "missing"))
            .await;

        assert!(gatekeeper.try_lock().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lock_is_exclusive_under_contention() {
        let gatekeeper = Arc::new(gatekeeper());
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..32 {
            let gatekeeper = Arc::clone(&gatekeeper);
            let in_flight = Arc::clone(&in_flight);
            let max_seen = Arc::clone(&max_seen);
            handles.push(tokio::spawn(async move {
                let _guard = gatekeeper.lock().await;
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::task::yield_now().await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_are_serialized() {
        let gatekeeper = Arc::new(gatekeeper());

        let mut handles = Vec::new();
        for _ in 0..40 {
            let gatekeeper = Arc::clone(&gatekeeper);
            handles.push(tokio::spawn(async move {
                gatekeeper
                    .write(|tx| tx.transfer_money(1, 2, dec("2.50"), "concurrent"))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let (from, to) = gatekeeper
            .read(|tx| Ok((tx.balance(1)?, tx.balance(2)?)))
            .await
            .unwrap();
        assert_eq!(from, Some(dec("0.00")));
        assert_eq!(to, Some(dec("100.00")));
    }
}
