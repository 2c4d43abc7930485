use spinhall_engine::machine::{GameKind, SlotMachine};
use spinhall_engine::reels::{ReelGenerator, ReelSource};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;

use crate::controller::{ControllerId, SpinController};
use crate::events::EventBus;
use crate::ledger::SharedLedger;
use crate::settings::{SessionSettings, SettingsError};

/// Entry point for one player: a shared ledger plus every open slot game.
#[derive(Debug)]
pub struct Lobby {
    settings: SessionSettings,
    ledger: SharedLedger,
    events: EventBus,
    games: RwLock<HashMap<ControllerId, Arc<SpinController>>>,
    opened: AtomicU64,
}

impl Lobby {
    pub fn new(settings: SessionSettings) -> Result<Self, SessionError> {
        settings.validate()?;
        let ledger = SharedLedger::new(settings.starting_balance);
        Ok(Self::with_ledger(settings, ledger))
    }

    /// Lobby around an existing ledger, e.g. one restored from an earlier session.
    pub fn with_ledger(settings: SessionSettings, ledger: SharedLedger) -> Self {
        Self {
            settings,
            ledger,
            events: EventBus::new(),
            games: RwLock::new(HashMap::new()),
            opened: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn ledger(&self) -> SharedLedger {
        self.ledger.clone()
    }

    pub fn events(&self) -> EventBus {
        self.events.clone()
    }

    /// Opens a game whose reels come from a generator seeded off the lobby
    /// seed, or from entropy when unseeded.
    pub fn open_game(&self, kind: GameKind) -> Result<Arc<SpinController>, SessionError> {
        let n = self.opened.fetch_add(1, Ordering::AcqRel);
        let generator = match self.settings.seed {
            Some(seed) => ReelGenerator::new_with_seed(seed.wrapping_add(n)),
            None => ReelGenerator::from_entropy(),
        };
        self.register(kind, Box::new(generator))
    }

    pub fn open_game_with_reels(
        &self,
        kind: GameKind,
        source: Box<dyn ReelSource>,
    ) -> Result<Arc<SpinController>, SessionError> {
        self.opened.fetch_add(1, Ordering::AcqRel);
        self.register(kind, source)
    }

    fn register(
        &self,
        kind: GameKind,
        source: Box<dyn ReelSource>,
    ) -> Result<Arc<SpinController>, SessionError> {
        let machine = SlotMachine::for_kind(kind);
        let controller = SpinController::create(
            machine,
            self.ledger.clone(),
            self.events.clone(),
            source,
            &self.settings,
        );

        let mut guard = self
            .games
            .write()
            .map_err(|_| SessionError::StoragePoisoned)?;
        guard.insert(controller.id().clone(), Arc::clone(&controller));

        tracing::info!(
            controller_id = %controller.id(),
            game = %kind,
            open_games = guard.len(),
            "game opened"
        );
        Ok(controller)
    }

    pub fn game(&self, id: &ControllerId) -> Result<Arc<SpinController>, SessionError> {
        let guard = self
            .games
            .read()
            .map_err(|_| SessionError::StoragePoisoned)?;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::GameNotFound(id.clone()))
    }

    /// Disposes the controller and forgets it.
    pub fn close_game(&self, id: &ControllerId) -> Result<(), SessionError> {
        let removed = {
            let mut guard = self
                .games
                .write()
                .map_err(|_| SessionError::StoragePoisoned)?;
            guard.remove(id)
        };
        match removed {
            Some(controller) => {
                controller.dispose();
                tracing::info!(controller_id = %id, "game closed");
                Ok(())
            }
            None => Err(SessionError::GameNotFound(id.clone())),
        }
    }

    pub fn active_games(&self) -> Vec<ControllerId> {
        match self.games.read() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Disposes every open game.
    pub fn shutdown(&self) {
        let drained: Vec<_> = match self.games.write() {
            Ok(mut guard) => guard.drain().collect(),
            Err(poisoned) => poisoned.into_inner().drain().collect(),
        };
        for (_, controller) in drained {
            controller.dispose();
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Game not found: {0}")]
    GameNotFound(ControllerId),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("Game storage poisoned")]
    StoragePoisoned,
}
