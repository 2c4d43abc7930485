//! Async session layer for Spinhall: a ledger shared across games, spin
//! controllers that pace and sequence spins, the lobby that opens them, and
//! the identity-provider boundary.

pub mod controller;
pub mod events;
pub mod identity;
pub mod ledger;
pub mod lobby;
pub mod logging;
pub mod settings;

pub use controller::{
    BetError, ControllerId, ControllerState, SpinController, SpinOutcome, SpinRejection,
    SpinResult, SpinState,
};
pub use events::{EventBus, EventSubscription, SpinEvent};
pub use identity::{AuthErrorCode, AuthService, IdentityProvider, InMemoryIdentityProvider, UserProfile};
pub use ledger::{BalanceSnapshot, SharedLedger};
pub use lobby::{Lobby, SessionError};
pub use settings::{SessionSettings, SettingsError};
