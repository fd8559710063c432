//! Synchronous row-event fan-out.
//!
//! # Responsibility
//! - Deliver store mutations to subscribed views (chart, table, logs).
//! - Offer callback and queue style subscriptions.
//!
//! # Invariants
//! - Subscribers receive events in emission order.
//! - Within one event, subscribers are called in registration order.
//! - Delivery completes before the mutating call returns.
//! - Queue subscribers whose receiver was dropped are removed on next publish.

use crate::model::record::{Record, RecordId};
use log::debug;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Mutation notification emitted by the row store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEvent {
    Added(Record),
    /// A removed row put back at `position` in store order (rollback).
    Restored { position: usize, record: Record },
    Updated(Record),
    /// May name a row that was never announced via `Added` (pre-seeded rows).
    Deleted(RecordId),
}

impl RowEvent {
    pub fn record_id(&self) -> RecordId {
        match self {
            Self::Added(record) | Self::Updated(record) | Self::Restored { record, .. } => {
                record.id
            }
            Self::Deleted(id) => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Added(_) => "added",
            Self::Restored { .. } => "restored",
            Self::Updated(_) => "updated",
            Self::Deleted(_) => "deleted",
        }
    }
}

/// Receiver side of a callback subscription.
pub trait RowObserver {
    fn on_row_event(&mut self, event: &RowEvent);
}

/// Lets a caller keep a handle on an observer it also subscribed.
impl<T: RowObserver> RowObserver for Rc<RefCell<T>> {
    fn on_row_event(&mut self, event: &RowEvent) {
        self.borrow_mut().on_row_event(event);
    }
}

struct FnObserver<F>(F);

impl<F: FnMut(&RowEvent)> RowObserver for FnObserver<F> {
    fn on_row_event(&mut self, event: &RowEvent) {
        (self.0)(event);
    }
}

/// Handle returned by subscribe calls; used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

enum Subscriber {
    Observer(Box<dyn RowObserver>),
    Queue(Sender<RowEvent>),
}

/// Ordered subscriber list for row events.
#[derive(Default)]
pub struct SyncBridge {
    next_id: u64,
    subscribers: BTreeMap<SubscriptionId, Subscriber>,
}

impl Debug for SyncBridge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncBridge")
            .field("next_id", &self.next_id)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl SyncBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer object.
    pub fn subscribe(&mut self, observer: Box<dyn RowObserver>) -> SubscriptionId {
        self.insert(Subscriber::Observer(observer))
    }

    /// Registers a closure.
    pub fn subscribe_fn(&mut self, callback: impl FnMut(&RowEvent) + 'static) -> SubscriptionId {
        self.subscribe(Box::new(FnObserver(callback)))
    }

    /// Registers a queue; events are cloned into the returned receiver.
    pub fn subscribe_channel(&mut self) -> (SubscriptionId, Receiver<RowEvent>) {
        let (sender, receiver) = channel();
        (self.insert(Subscriber::Queue(sender)), receiver)
    }

    /// Removes a subscription. Returns `false` when it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Delivers one event to every subscriber.
    pub fn publish(&mut self, event: &RowEvent) {
        let mut disconnected = Vec::new();
        for (id, subscriber) in self.subscribers.iter_mut() {
            match subscriber {
                Subscriber::Observer(observer) => observer.on_row_event(event),
                Subscriber::Queue(sender) => {
                    if sender.send(event.clone()).is_err() {
                        disconnected.push(*id);
                    }
                }
            }
        }

        for id in disconnected {
            self.subscribers.remove(&id);
            debug!(
                "event=subscriber_dropped module=sync status=ok subscription={}",
                id.0
            );
        }
    }

    fn insert(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.insert(id, subscriber);
        id
    }
}
