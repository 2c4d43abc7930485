use serde::{Deserialize, Serialize};
use spinhall_engine::ledger::{Credits, STARTING_BALANCE};
use std::time::Duration;
use thiserror::Error;

/// Runtime settings shared by the lobby and every spin controller it opens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSettings {
    /// Opening balance of the shared ledger
    pub starting_balance: Credits,
    /// Bet a new controller starts with
    pub default_bet: Credits,
    /// Presentation delay while the reels spin
    pub spin_delay_ms: u64,
    /// Pause between auto-roll spins
    pub auto_roll_delay_ms: u64,
    /// Seed for reel generators; controllers derive their own seed from it
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            starting_balance: STARTING_BALANCE,
            default_bet: 100,
            spin_delay_ms: 1_500,
            auto_roll_delay_ms: 2_000,
            seed: None,
        }
    }
}

impl SessionSettings {
    /// Zero pacing and a fixed seed.
    pub fn for_tests() -> Self {
        Self {
            spin_delay_ms: 0,
            auto_roll_delay_ms: 0,
            seed: Some(0x5EED),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.starting_balance == 0 {
            return Err(SettingsError::InvalidValue(
                "starting_balance must be greater than 0".to_string(),
            ));
        }
        if self.default_bet == 0 {
            return Err(SettingsError::InvalidValue(
                "default_bet must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn spin_delay(&self) -> Duration {
        Duration::from_millis(self.spin_delay_ms)
    }

    pub fn auto_roll_delay(&self) -> Duration {
        Duration::from_millis(self.auto_roll_delay_ms)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
