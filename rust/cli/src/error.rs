//! Error types for the CLI application.
//!
//! Every command returns `Result<(), CliError>`; [`crate::run`] maps any error
//! to exit code 2.
//!
//! ## Batch Validation Errors
//!
//! `BatchValidationError<T>` pairs a failing item with its message. The stats
//! command uses it to report balance-chain breaks by line number.

use spinhall_engine::errors::LedgerError;
use spinhall_session::lobby::SessionError;
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    /// I/O error (file operations, stdout/stderr writes, etc.)
    Io(std::io::Error),

    /// Invalid user input or command-line arguments
    InvalidInput(String),

    /// Configuration error
    Config(String),

    /// Ledger or session failure
    Session(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Session(msg) => write!(f, "Session error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<LedgerError> for CliError {
    fn from(error: LedgerError) -> Self {
        CliError::Session(error.to_string())
    }
}

impl From<SessionError> for CliError {
    fn from(error: SessionError) -> Self {
        CliError::Session(error.to_string())
    }
}

impl From<crate::config::ConfigError> for CliError {
    fn from(error: crate::config::ConfigError) -> Self {
        CliError::Config(error.to_string())
    }
}

/// An item that failed validation, with context.
///
/// ```rust
/// use spinhall_cli::BatchValidationError;
///
/// let error = BatchValidationError {
///     item_context: 5,
///     message: "balance chain broken".to_string(),
/// };
/// assert_eq!(error.to_string(), "5: balance chain broken");
/// ```
#[derive(Debug)]
pub struct BatchValidationError<T> {
    pub item_context: T,
    pub message: String,
}

impl<T: fmt::Display> fmt::Display for BatchValidationError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item_context, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_errors_become_session_errors() {
        let e: CliError = LedgerError::InsufficientFunds {
            requested: 10,
            available: 5,
        }
        .into();
        assert!(matches!(e, CliError::Session(_)));
        assert!(e.to_string().starts_with("Session error:"));
    }

    #[test]
    fn batch_error_with_path_context() {
        let error = BatchValidationError {
            item_context: "spins.jsonl:3".to_string(),
            message: "corrupted".to_string(),
        };
        assert_eq!(error.to_string(), "spins.jsonl:3: corrupted");
    }
}
