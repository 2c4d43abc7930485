use serde::{Deserialize, Serialize};
use spinhall_engine::ledger::Credits;
use spinhall_engine::machine::{GameKind, SlotMachine};
use spinhall_engine::payout::MatchSummary;
use spinhall_engine::reels::ReelSource;
use spinhall_engine::symbols::Symbol;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::events::{EventBus, SpinEvent};
use crate::ledger::SharedLedger;
use crate::settings::SessionSettings;

pub type ControllerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinState {
    Idle,
    Spinning,
    Win,
    Lose,
}

/// Everything a presentation layer needs to draw one slot game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerState {
    pub game: GameKind,
    pub spin_state: SpinState,
    pub spinning: bool,
    pub balance: Credits,
    pub bet: Credits,
    pub reels: Vec<Symbol>,
    pub result_message: Option<String>,
    pub auto_roll: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinResult {
    pub reels: Vec<Symbol>,
    pub best: Option<MatchSummary>,
    pub bet: Credits,
    pub winnings: Credits,
    pub balance: Credits,
    pub message: String,
}

impl SpinResult {
    pub fn is_win(&self) -> bool {
        self.winnings > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpinRejection {
    ZeroBet,
    InsufficientFunds { bet: Credits, balance: Credits },
}

impl fmt::Display for SpinRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpinRejection::ZeroBet => write!(f, "bet must be greater than zero"),
            SpinRejection::InsufficientFunds { bet, balance } => {
                write!(f, "bet {} exceeds balance {}", bet, balance)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpinOutcome {
    Completed(SpinResult),
    /// Validation failed; nothing changed.
    Rejected(SpinRejection),
    /// A spin was already in flight or the controller is disposed; nothing changed.
    Ignored,
    /// Cancelled during the pacing delay; the stake was refunded.
    Cancelled { refunded: Credits },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BetError {
    #[error("Bet must be greater than zero")]
    ZeroBet,
    #[error("Bet {bet} exceeds balance {balance}")]
    ExceedsBalance { bet: Credits, balance: Credits },
}

/// Drives one slot game against a shared ledger.
///
/// A spin validates and takes the stake, waits out the pacing delay, draws
/// reels, pays winnings and publishes the result. At most one spin is in flight
/// per controller; a request arriving meanwhile is ignored, not queued. With
/// auto-roll enabled the next spin is scheduled only after the previous one
/// has fully completed.
pub struct SpinController {
    id: ControllerId,
    machine: SlotMachine,
    ledger: SharedLedger,
    events: EventBus,
    source: Mutex<Box<dyn ReelSource>>,
    spin_delay: Duration,
    auto_roll_delay: Duration,
    state: Arc<watch::Sender<ControllerState>>,
    in_flight: AtomicBool,
    disposed: AtomicBool,
    cancel: watch::Sender<u64>,
    auto_task: Mutex<Option<JoinHandle<()>>>,
    balance_task: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for SpinController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinController")
            .field("id", &self.id)
            .field("game", &self.machine.kind())
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl SpinController {
    /// Builds a controller and, inside a Tokio runtime, starts mirroring the
    /// shared balance into the published state.
    pub fn create(
        machine: SlotMachine,
        ledger: SharedLedger,
        events: EventBus,
        source: Box<dyn ReelSource>,
        settings: &SessionSettings,
    ) -> Arc<Self> {
        let initial = ControllerState {
            game: machine.kind(),
            spin_state: SpinState::Idle,
            spinning: false,
            balance: ledger.balance(),
            bet: settings.default_bet,
            reels: Vec::new(),
            result_message: None,
            auto_roll: false,
        };
        let (state, _) = watch::channel(initial);
        let (cancel, _) = watch::channel(0u64);

        let controller = Arc::new(Self {
            id: Uuid::new_v4().to_string(),
            machine,
            ledger,
            events,
            source: Mutex::new(source),
            spin_delay: settings.spin_delay(),
            auto_roll_delay: settings.auto_roll_delay(),
            state: Arc::new(state),
            in_flight: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            cancel,
            auto_task: Mutex::new(None),
            balance_task: Mutex::new(None),
        });
        controller.start_balance_mirror();

        tracing::info!(
            controller_id = %controller.id,
            game = %controller.machine.kind(),
            "spin controller created"
        );
        controller
    }

    pub fn id(&self) -> &ControllerId {
        &self.id
    }

    pub fn game(&self) -> GameKind {
        self.machine.kind()
    }

    pub fn machine(&self) -> &SlotMachine {
        &self.machine
    }

    pub fn state(&self) -> ControllerState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub fn set_bet(&self, bet: Credits) -> Result<Credits, BetError> {
        if bet == 0 {
            return Err(BetError::ZeroBet);
        }
        let balance = self.ledger.balance();
        if bet > balance {
            return Err(BetError::ExceedsBalance { bet, balance });
        }
        self.state.send_modify(|s| s.bet = bet);
        self.events.broadcast(
            &self.id,
            SpinEvent::BetChanged {
                controller_id: self.id.clone(),
                bet,
            },
        );
        Ok(bet)
    }

    /// Flips auto-roll and returns the new setting. Takes effect after the
    /// next completed spin.
    pub fn toggle_auto_roll(&self) -> bool {
        let mut enabled = false;
        self.state.send_modify(|s| {
            s.auto_roll = !s.auto_roll;
            enabled = s.auto_roll;
        });
        self.broadcast_auto_roll(enabled);
        enabled
    }

    /// Aborts a spin waiting out its pacing delay and any scheduled auto-roll.
    pub fn cancel(&self) {
        self.cancel.send_modify(|epoch| *epoch = epoch.wrapping_add(1));
    }

    /// Cancels outstanding work and detaches from the lobby's event bus.
    /// Later spins are ignored.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        // a running auto-roll loop sees the cancel and winds down on its own,
        // refunding a spin caught in its pacing delay
        self.cancel();
        drop(lock(&self.auto_task).take());
        if let Some(handle) = lock(&self.balance_task).take() {
            handle.abort();
        }
        self.state.send_modify(|s| s.auto_roll = false);
        self.events.drop_controller(&self.id);
        tracing::info!(controller_id = %self.id, "spin controller disposed");
    }

    /// Runs one spin and, when auto-roll is on and funds allow, schedules the
    /// next one.
    pub async fn spin(self: &Arc<Self>) -> SpinOutcome {
        let outcome = self.spin_once().await;
        if matches!(outcome, SpinOutcome::Completed(_)) && self.should_continue() {
            self.schedule_auto_roll();
        }
        outcome
    }

    async fn spin_once(&self) -> SpinOutcome {
        if self.is_disposed() {
            return SpinOutcome::Ignored;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(controller_id = %self.id, "spin already in flight, ignoring");
            return SpinOutcome::Ignored;
        }
        let _in_flight = InFlight(&self.in_flight);
        self.run_spin().await
    }

    async fn run_spin(&self) -> SpinOutcome {
        let game = self.machine.kind();
        let bet = self.state.borrow().bet;
        if bet == 0 {
            return SpinOutcome::Rejected(SpinRejection::ZeroBet);
        }

        // subscribe before the stake is taken so no cancel can slip past
        let mut cancel_rx = self.cancel.subscribe();
        if self.is_disposed() {
            return SpinOutcome::Ignored;
        }

        // the funds check and the debit happen under one ledger lock
        let balance = match self.ledger.debit(bet, &format!("Bet on {}", game)) {
            Ok(_) => self.ledger.balance(),
            Err(e) => {
                let balance = self.ledger.balance();
                tracing::info!(
                    controller_id = %self.id,
                    bet,
                    balance,
                    error = %e,
                    "spin rejected"
                );
                return SpinOutcome::Rejected(SpinRejection::InsufficientFunds { bet, balance });
            }
        };

        let stake = PendingStake {
            controller: self,
            bet,
            settled: false,
        };
        self.state.send_modify(|s| {
            s.spin_state = SpinState::Spinning;
            s.spinning = true;
            s.balance = balance;
            s.result_message = None;
        });
        self.events.broadcast(
            &self.id,
            SpinEvent::SpinStarted {
                controller_id: self.id.clone(),
                game,
                bet,
                balance,
            },
        );
        tracing::debug!(controller_id = %self.id, bet, balance, "spin started");

        if !self.spin_delay.is_zero() {
            let cancelled = tokio::select! {
                _ = tokio::time::sleep(self.spin_delay) => false,
                changed = cancel_rx.changed() => changed.is_ok(),
            };
            if cancelled {
                return stake.refund();
            }
        }
        stake.settle();

        let eval = {
            let mut source = lock(&self.source);
            self.machine.spin(&mut **source, bet)
        };

        let mut winnings = eval.winnings;
        if winnings > 0 {
            if let Err(e) = self.ledger.credit(winnings, &format!("Win on {}", game)) {
                tracing::error!(
                    controller_id = %self.id,
                    winnings,
                    error = %e,
                    "failed to pay winnings"
                );
                winnings = 0;
            }
        }
        let balance = self.ledger.balance();
        let (spin_state, message) = if winnings > 0 {
            (SpinState::Win, format!("You won {} credits!", winnings))
        } else {
            (SpinState::Lose, "No win this time.".to_string())
        };

        self.state.send_modify(|s| {
            s.spin_state = spin_state;
            s.spinning = false;
            s.balance = balance;
            s.reels = eval.reels.clone();
            s.result_message = Some(message.clone());
        });
        self.events.broadcast(
            &self.id,
            SpinEvent::SpinCompleted {
                controller_id: self.id.clone(),
                reels: eval.reels.clone(),
                winnings,
                balance,
            },
        );
        tracing::info!(
            controller_id = %self.id,
            game = %game,
            bet,
            winnings,
            balance,
            "spin completed"
        );

        SpinOutcome::Completed(SpinResult {
            reels: eval.reels,
            best: eval.best,
            bet,
            winnings,
            balance,
            message,
        })
    }

    fn abort_spin(&self, bet: Credits) -> SpinOutcome {
        let refunded = match self
            .ledger
            .refund(bet, &format!("Refund: cancelled spin on {}", self.machine.kind()))
        {
            Ok(_) => bet,
            Err(e) => {
                tracing::error!(
                    controller_id = %self.id,
                    bet,
                    error = %e,
                    "failed to refund cancelled spin"
                );
                0
            }
        };
        let balance = self.ledger.balance();
        let was_auto = self.state.borrow().auto_roll;
        self.state.send_modify(|s| {
            s.spin_state = SpinState::Idle;
            s.spinning = false;
            s.balance = balance;
            s.auto_roll = false;
            s.result_message = Some("Spin cancelled.".to_string());
        });
        if was_auto {
            self.broadcast_auto_roll(false);
        }
        self.events.broadcast(
            &self.id,
            SpinEvent::SpinCancelled {
                controller_id: self.id.clone(),
                refunded,
            },
        );
        tracing::info!(controller_id = %self.id, refunded, "spin cancelled");
        SpinOutcome::Cancelled { refunded }
    }

    /// Auto-roll keeps going only while enabled and the bet is still covered;
    /// running out of funds switches it off.
    fn should_continue(&self) -> bool {
        let (auto_roll, bet) = {
            let s = self.state.borrow();
            (s.auto_roll, s.bet)
        };
        if !auto_roll || self.is_disposed() {
            return false;
        }
        if self.ledger.has_sufficient_funds(bet) {
            return true;
        }
        tracing::info!(controller_id = %self.id, bet, "auto-roll stopped: insufficient funds");
        self.stop_auto_roll();
        false
    }

    /// Starts the auto-roll loop unless one is already running.
    fn schedule_auto_roll(self: &Arc<Self>) {
        let mut task = lock(&self.auto_task);
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        // subscribed here so a cancel issued right after scheduling is seen
        let cancel_rx = self.cancel.subscribe();
        let this = Arc::clone(self);
        *task = Some(tokio::spawn(async move { this.auto_roll_loop(cancel_rx).await }));
    }

    async fn auto_roll_loop(&self, mut cancel_rx: watch::Receiver<u64>) {
        loop {
            let cancelled = tokio::select! {
                _ = tokio::time::sleep(self.auto_roll_delay) => false,
                changed = cancel_rx.changed() => changed.is_ok(),
            };
            if cancelled {
                self.stop_auto_roll();
                return;
            }
            if self.is_disposed() || !self.state.borrow().auto_roll {
                return;
            }
            match self.spin_once().await {
                SpinOutcome::Completed(_) => {
                    if !self.should_continue() {
                        return;
                    }
                }
                // a manual spin holds the reels; try again after the delay
                SpinOutcome::Ignored if !self.is_disposed() => {}
                _ => return,
            }
        }
    }

    fn start_balance_mirror(&self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let mut updates = self.ledger.subscribe();
        let state = Arc::clone(&self.state);
        let handle = runtime.spawn(async move {
            while updates.changed().await.is_ok() {
                let balance = updates.borrow_and_update().balance;
                state.send_modify(|s| s.balance = balance);
            }
        });
        *lock(&self.balance_task) = Some(handle);
    }

    fn stop_auto_roll(&self) {
        let mut was_on = false;
        self.state.send_modify(|s| {
            was_on = s.auto_roll;
            s.auto_roll = false;
        });
        if was_on {
            self.broadcast_auto_roll(false);
        }
    }

    fn broadcast_auto_roll(&self, enabled: bool) {
        self.events.broadcast(
            &self.id,
            SpinEvent::AutoRollChanged {
                controller_id: self.id.clone(),
                enabled,
            },
        );
    }
}

impl Drop for SpinController {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.balance_task).take() {
            handle.abort();
        }
    }
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A stake already debited whose spin has not reached the reels yet. Dropping
/// it unsettled, for instance when the spin future is dropped mid-delay,
/// refunds the stake.
struct PendingStake<'a> {
    controller: &'a SpinController,
    bet: Credits,
    settled: bool,
}

impl PendingStake<'_> {
    fn settle(mut self) {
        self.settled = true;
    }

    fn refund(mut self) -> SpinOutcome {
        self.settled = true;
        self.controller.abort_spin(self.bet)
    }
}

impl Drop for PendingStake<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::warn!(
            controller_id = %self.controller.id,
            bet = self.bet,
            "spin dropped during pacing delay, refunding stake"
        );
        self.controller.abort_spin(self.bet);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spinhall_engine::reels::ScriptedReels;
    use spinhall_engine::symbols::Symbol::*;

    fn controller(balance: Credits, bet: Credits, reels: Vec<Vec<Symbol>>) -> Arc<SpinController> {
        let settings = SessionSettings {
            default_bet: bet,
            ..SessionSettings::for_tests()
        };
        SpinController::create(
            SlotMachine::classic(),
            SharedLedger::new(balance),
            EventBus::new(),
            Box::new(ScriptedReels::new(reels)),
            &settings,
        )
    }

    #[tokio::test]
    async fn five_diamonds_win_jackpot() {
        let c = controller(5_000, 100, vec![vec![Diamond; 5]]);
        let SpinOutcome::Completed(result) = c.spin().await else {
            panic!("expected completed spin");
        };
        assert_eq!(result.winnings, 100_000);
        assert_eq!(result.balance, 5_000 - 100 + 100_000);
        let state = c.state();
        assert_eq!(state.spin_state, SpinState::Win);
        assert!(!state.spinning);
        assert_eq!(state.reels, vec![Diamond; 5]);
        assert!(state.result_message.unwrap().contains("100000"));
    }

    #[tokio::test]
    async fn distinct_reels_lose_the_stake() {
        let c = controller(5_000, 100, vec![vec![Diamond, Lightning, Star, Heart, Gift]]);
        let SpinOutcome::Completed(result) = c.spin().await else {
            panic!("expected completed spin");
        };
        assert_eq!(result.winnings, 0);
        assert_eq!(result.balance, 4_900);
        assert_eq!(c.state().spin_state, SpinState::Lose);
    }

    #[tokio::test]
    async fn bet_above_balance_is_rejected_without_side_effects() {
        let c = controller(50, 100, vec![vec![Diamond; 5]]);
        let before = c.state();
        let outcome = c.spin().await;
        assert_eq!(
            outcome,
            SpinOutcome::Rejected(SpinRejection::InsufficientFunds { bet: 100, balance: 50 })
        );
        assert_eq!(c.state(), before);
        assert_eq!(c.ledger.balance(), 50);
        assert!(c.ledger.history().is_empty());
    }

    #[test]
    fn set_bet_validates_against_balance() {
        let c = controller(500, 100, vec![vec![Coin; 5]]);
        assert_eq!(c.set_bet(0), Err(BetError::ZeroBet));
        assert_eq!(
            c.set_bet(501),
            Err(BetError::ExceedsBalance { bet: 501, balance: 500 })
        );
        assert_eq!(c.set_bet(500), Ok(500));
        assert_eq!(c.state().bet, 500);
    }

    #[test]
    fn toggle_auto_roll_flips_flag() {
        let c = controller(500, 100, vec![vec![Coin; 5]]);
        assert!(c.toggle_auto_roll());
        assert!(c.state().auto_roll);
        assert!(!c.toggle_auto_roll());
    }

    #[tokio::test]
    async fn completed_spin_is_logged_with_fields() {
        use crate::logging::TestLogSubscriber;
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::Registry;

        let logs = TestLogSubscriber::new();
        let _guard = tracing::subscriber::set_default(
            Registry::default().with(logs.clone().into_layer::<Registry>()),
        );

        let c = controller(5_000, 100, vec![vec![Diamond; 5]]);
        c.spin().await;

        let entries = logs.find("spin completed");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].field("winnings"), Some("100000"));
        assert_eq!(entries[0].field("game"), Some("classic"));
    }

    #[tokio::test]
    async fn disposed_controller_ignores_spins() {
        let c = controller(500, 100, vec![vec![Coin; 5]]);
        c.dispose();
        assert_eq!(c.spin().await, SpinOutcome::Ignored);
        assert_eq!(c.ledger.balance(), 500);
    }
}
