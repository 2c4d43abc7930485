use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::LedgerError;

/// Monetary amount in whole credits.
pub type Credits = u64;

/// Largest balance the ledger will hold; keeps every signed amount in `i64`.
pub const MAX_BALANCE: Credits = i64::MAX as Credits;

/// Default demo balance handed to a new player.
pub const STARTING_BALANCE: Credits = 5_000;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Win,
    Loss,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Rejected operations are never recorded, so every entry is completed.
    Completed,
}

/// Immutable record of one accepted balance change.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub description: String,
    /// Positive for deposits and wins, negative for withdrawals and stakes
    pub amount: i64,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
}

/// Sole owner of a player's balance and transaction history.
///
/// Every accepted mutation appends exactly one [`Transaction`] before
/// returning; rejected ones leave both balance and history untouched. The sum
/// of all recorded amounts always equals `balance - initial_balance`.
///
/// # Examples
///
/// ```
/// use spinhall_engine::ledger::Ledger;
/// use spinhall_engine::errors::LedgerError;
///
/// let mut ledger = Ledger::new(5_000);
/// ledger.deposit(500, "card").unwrap();
/// assert!(matches!(
///     ledger.withdraw(10_000, "bank"),
///     Err(LedgerError::InsufficientFunds { .. })
/// ));
/// assert_eq!(ledger.balance(), 5_500);
/// assert_eq!(ledger.net_change(), ledger.history_total());
/// ```
#[derive(Debug, Clone)]
pub struct Ledger {
    initial_balance: Credits,
    balance: Credits,
    /// oldest first; exposed newest first
    transactions: Vec<Transaction>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(STARTING_BALANCE)
    }
}

impl Ledger {
    /// Opening balances above [`MAX_BALANCE`] are clamped.
    pub fn new(initial_balance: Credits) -> Self {
        let initial_balance = initial_balance.min(MAX_BALANCE);
        Self {
            initial_balance,
            balance: initial_balance,
            transactions: Vec::new(),
        }
    }

    pub fn balance(&self) -> Credits {
        self.balance
    }

    pub fn initial_balance(&self) -> Credits {
        self.initial_balance
    }

    pub fn has_sufficient_funds(&self, amount: Credits) -> bool {
        amount <= self.balance
    }

    /// Transactions, most recent first.
    pub fn history(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().rev()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn last_transaction(&self) -> Option<&Transaction> {
        self.transactions.last()
    }

    pub fn net_change(&self) -> i64 {
        self.balance as i64 - self.initial_balance as i64
    }

    pub fn history_total(&self) -> i64 {
        self.transactions.iter().map(|t| t.amount).sum()
    }

    pub fn deposit(&mut self, amount: Credits, method: &str) -> Result<Transaction, LedgerError> {
        self.add(
            amount,
            TransactionKind::Deposit,
            format!("Deposit via {}", method),
        )
    }

    pub fn withdraw(&mut self, amount: Credits, method: &str) -> Result<Transaction, LedgerError> {
        self.subtract(
            amount,
            TransactionKind::Withdrawal,
            format!("Withdrawal to {}", method),
        )
    }

    /// Takes a stake. Recorded as a loss.
    pub fn debit(&mut self, amount: Credits, description: &str) -> Result<Transaction, LedgerError> {
        self.subtract(amount, TransactionKind::Loss, description.to_string())
    }

    /// Pays out winnings.
    pub fn credit(&mut self, amount: Credits, description: &str) -> Result<Transaction, LedgerError> {
        self.add(amount, TransactionKind::Win, description.to_string())
    }

    /// Returns a stake taken for an operation that did not complete.
    pub fn refund(&mut self, amount: Credits, description: &str) -> Result<Transaction, LedgerError> {
        self.add(amount, TransactionKind::Deposit, description.to_string())
    }

    fn add(
        &mut self,
        amount: Credits,
        kind: TransactionKind,
        description: String,
    ) -> Result<Transaction, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount { amount });
        }
        let next = self
            .balance
            .checked_add(amount)
            .filter(|b| *b <= MAX_BALANCE)
            .ok_or(LedgerError::BalanceOverflow)?;
        self.balance = next;
        Ok(self.record(kind, description, amount as i64))
    }

    fn subtract(
        &mut self,
        amount: Credits,
        kind: TransactionKind,
        description: String,
    ) -> Result<Transaction, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount { amount });
        }
        if amount > self.balance {
            return Err(LedgerError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(self.record(kind, description, -(amount as i64)))
    }

    fn record(&mut self, kind: TransactionKind, description: String, amount: i64) -> Transaction {
        let tx = Transaction {
            id: Uuid::new_v4(),
            kind,
            description,
            amount,
            status: TransactionStatus::Completed,
            timestamp: Utc::now(),
        };
        self.transactions.push(tx.clone());
        tx
    }
}
