use serde::{Deserialize, Serialize};
use spinhall_engine::ledger::Credits;
use spinhall_engine::machine::GameKind;
use spinhall_engine::symbols::Symbol;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc;

use crate::controller::ControllerId;

// Bounded so a stalled subscriber cannot grow memory without limit;
// subscribers whose buffer fills up are dropped.
const EVENT_CHANNEL_BUFFER: usize = 256;

pub type EventSender = mpsc::Sender<SpinEvent>;
pub type EventReceiver = mpsc::Receiver<SpinEvent>;

type SubscriberMap = HashMap<ControllerId, Vec<(usize, EventSender)>>;

pub struct EventSubscription {
    bus: EventBus,
    controller_id: ControllerId,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.controller_id, self.subscriber_id);
    }
}

/// Per-controller publish/subscribe of spin events.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<SubscriberMap>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, controller_id: ControllerId) -> EventSubscription {
        let (subscriber_id, receiver) = self.subscribe_raw(controller_id.clone());
        EventSubscription {
            bus: self.clone(),
            controller_id,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, controller_id: ControllerId) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        self.write_subscribers()
            .entry(controller_id.clone())
            .or_default()
            .push((id, tx));

        tracing::debug!(
            controller_id = %controller_id,
            subscriber_id = id,
            "subscribed to spin events"
        );

        (id, rx)
    }

    pub fn broadcast(&self, controller_id: &ControllerId, event: SpinEvent) {
        tracing::trace!(
            controller_id = %controller_id,
            event = ?event,
            "broadcasting spin event"
        );

        let subscribers = self.read_subscribers().get(controller_id).cloned();
        let Some(list) = subscribers else {
            return;
        };

        let mut failed = Vec::new();
        for (id, sender) in list {
            if let Err(e) = sender.try_send(event.clone()) {
                tracing::warn!(
                    controller_id = %controller_id,
                    subscriber_id = id,
                    error = %e,
                    "dropping spin event subscriber"
                );
                failed.push(id);
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(controller_id, &failed);
        }
    }

    pub fn unsubscribe(&self, controller_id: &ControllerId, subscriber_id: usize) {
        self.remove_subscribers(controller_id, &[subscriber_id]);
    }

    pub fn drop_controller(&self, controller_id: &ControllerId) {
        self.write_subscribers().remove(controller_id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.read_subscribers().values().map(|list| list.len()).sum()
    }

    fn remove_subscribers(&self, controller_id: &ControllerId, ids: &[usize]) {
        let mut guard = self.write_subscribers();
        if let Some(list) = guard.get_mut(controller_id) {
            list.retain(|(id, _)| !ids.contains(id));
            if list.is_empty() {
                guard.remove(controller_id);
            }
        }
    }

    fn read_subscribers(&self) -> RwLockReadGuard<'_, SubscriberMap> {
        self.inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_subscribers(&self) -> RwLockWriteGuard<'_, SubscriberMap> {
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpinEvent {
    SpinStarted {
        controller_id: ControllerId,
        game: GameKind,
        bet: Credits,
        balance: Credits,
    },
    SpinCompleted {
        controller_id: ControllerId,
        reels: Vec<Symbol>,
        winnings: Credits,
        balance: Credits,
    },
    SpinCancelled {
        controller_id: ControllerId,
        refunded: Credits,
    },
    BetChanged {
        controller_id: ControllerId,
        bet: Credits,
    },
    AutoRollChanged {
        controller_id: ControllerId,
        enabled: bool,
    },
}
