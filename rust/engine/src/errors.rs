use thiserror::Error;

use crate::symbols::Symbol;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid amount: {amount}, must be greater than zero")]
    InvalidAmount { amount: u64 },
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: u64, available: u64 },
    #[error("Balance overflow")]
    BalanceOverflow,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Reel distribution is empty")]
    EmptyDistribution,
    #[error("Symbol {0} has zero weight")]
    ZeroWeight(Symbol),
    #[error("Reel weights must sum to {expected}, got {actual}")]
    WeightSum { expected: u32, actual: u32 },
    #[error("Reel width must be at least {minimum}, got {width}")]
    InvalidWidth { width: usize, minimum: usize },
    #[error("Pay table has no entry for {0}")]
    MissingPayout(Symbol),
}
