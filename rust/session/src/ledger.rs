use serde::{Deserialize, Serialize};
use spinhall_engine::errors::LedgerError;
use spinhall_engine::ledger::{Credits, Ledger, Transaction};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// What ledger observers see after every accepted change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub balance: Credits,
    pub transactions: usize,
}

/// One player's ledger, shared by every game controller in a lobby.
///
/// All read-modify-write operations run under a single mutex, so a stake taken
/// by one controller can never interleave with a payout from another. Every
/// accepted change is broadcast to subscribers before the call returns.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<SharedLedgerInner>,
}

#[derive(Debug)]
struct SharedLedgerInner {
    ledger: Mutex<Ledger>,
    updates: watch::Sender<BalanceSnapshot>,
}

impl SharedLedger {
    pub fn new(initial_balance: Credits) -> Self {
        Self::from_ledger(Ledger::new(initial_balance))
    }

    pub fn from_ledger(ledger: Ledger) -> Self {
        let (updates, _) = watch::channel(snapshot_of(&ledger));
        Self {
            inner: Arc::new(SharedLedgerInner {
                ledger: Mutex::new(ledger),
                updates,
            }),
        }
    }

    pub fn balance(&self) -> Credits {
        self.lock().balance()
    }

    pub fn snapshot(&self) -> BalanceSnapshot {
        snapshot_of(&self.lock())
    }

    pub fn has_sufficient_funds(&self, amount: Credits) -> bool {
        self.lock().has_sufficient_funds(amount)
    }

    /// Transactions, most recent first.
    pub fn history(&self) -> Vec<Transaction> {
        self.lock().history().cloned().collect()
    }

    /// Runs `f` against a consistent view of the ledger.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.lock())
    }

    pub fn subscribe(&self) -> watch::Receiver<BalanceSnapshot> {
        self.inner.updates.subscribe()
    }

    pub fn deposit(&self, amount: Credits, method: &str) -> Result<Transaction, LedgerError> {
        self.mutate(|l| l.deposit(amount, method))
    }

    pub fn withdraw(&self, amount: Credits, method: &str) -> Result<Transaction, LedgerError> {
        self.mutate(|l| l.withdraw(amount, method))
    }

    pub fn debit(&self, amount: Credits, description: &str) -> Result<Transaction, LedgerError> {
        self.mutate(|l| l.debit(amount, description))
    }

    pub fn credit(&self, amount: Credits, description: &str) -> Result<Transaction, LedgerError> {
        self.mutate(|l| l.credit(amount, description))
    }

    pub fn refund(&self, amount: Credits, description: &str) -> Result<Transaction, LedgerError> {
        self.mutate(|l| l.refund(amount, description))
    }

    fn mutate(
        &self,
        op: impl FnOnce(&mut Ledger) -> Result<Transaction, LedgerError>,
    ) -> Result<Transaction, LedgerError> {
        let mut guard = self.lock();
        match op(&mut guard) {
            Ok(tx) => {
                let snapshot = snapshot_of(&guard);
                // publish while still holding the lock so observers see changes in order
                self.inner.updates.send_replace(snapshot);
                tracing::debug!(
                    kind = ?tx.kind,
                    amount = tx.amount,
                    balance = snapshot.balance,
                    "ledger updated"
                );
                Ok(tx)
            }
            Err(e) => {
                tracing::debug!(error = %e, balance = guard.balance(), "ledger operation rejected");
                Err(e)
            }
        }
    }

    // Ledger operations are all-or-nothing, so a poisoned lock still guards a consistent ledger.
    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.inner
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn snapshot_of(ledger: &Ledger) -> BalanceSnapshot {
    BalanceSnapshot {
        balance: ledger.balance(),
        transactions: ledger.transaction_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_change_is_broadcast() {
        let ledger = SharedLedger::new(100);
        let mut rx = ledger.subscribe();
        assert_eq!(rx.borrow_and_update().balance, 100);

        ledger.deposit(50, "card").unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(
            *rx.borrow_and_update(),
            BalanceSnapshot {
                balance: 150,
                transactions: 1
            }
        );
    }

    #[test]
    fn rejected_change_is_not_broadcast() {
        let ledger = SharedLedger::new(100);
        let mut rx = ledger.subscribe();
        rx.borrow_and_update();

        assert!(ledger.withdraw(500, "bank").is_err());
        assert!(!rx.has_changed().unwrap());
        assert_eq!(ledger.balance(), 100);
    }

    #[test]
    fn clones_share_one_balance() {
        let a = SharedLedger::new(100);
        let b = a.clone();
        a.debit(30, "Bet on classic").unwrap();
        assert_eq!(b.balance(), 70);
        assert_eq!(b.history().len(), 1);
    }

    #[test]
    fn concurrent_debits_never_overdraw() {
        let ledger = SharedLedger::new(1_000);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let l = ledger.clone();
                std::thread::spawn(move || {
                    let mut accepted = 0;
                    for _ in 0..50 {
                        if l.debit(10, "Bet").is_ok() {
                            accepted += 1;
                        }
                    }
                    accepted
                })
            })
            .collect();
        let accepted: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(accepted, 100);
        assert_eq!(ledger.balance(), 0);
        ledger.read(|l| assert_eq!(l.net_change(), l.history_total()));
    }
}
