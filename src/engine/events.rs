//! Book events and their fan-out to subscribers.
//!
//! Every accepted mutation of a [`SharedBook`](crate::engine::SharedBook)
//! produces a batch of [`BookEvent`]s, each wrapped in an
//! [`EventEnvelope`] carrying a gap-free sequence number. Rejected calls
//! produce nothing.
//!
//! Subscribers get an unbounded crossbeam receiver. A subscriber whose
//! receiver has been dropped is pruned on the next publish.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, MutexGuard};

use crate::types::{Match, OrderType, Side};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookEvent {
    /// An order passed validation and was assigned an id
    Accepted {
        order_id: u64,
        side: Side,
        order_type: OrderType,
        price: Option<u64>,
        quantity: u64,
    },
    Matched(Match),
    /// Remainder of an incoming limit order joined the book
    Rested {
        order_id: u64,
        side: Side,
        price: u64,
        remaining: u64,
    },
    Cancelled {
        order_id: u64,
        side: Side,
        price: u64,
        remaining: u64,
    },
    Amended {
        order_id: u64,
        side: Side,
        price: u64,
        remaining: u64,
        sequence: u64,
    },
    /// New aggregate volume of a touched level; zero means it was removed
    LevelChanged {
        side: Side,
        price: u64,
        total_volume: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEnvelope {
    pub sequence: u64,
    pub instrument: Arc<str>,
    pub event: BookEvent,
}

/// Fan-out of event batches to any number of subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<EventEnvelope>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<EventEnvelope> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Reserve the bus for one batch.
    ///
    /// Publishers are serialized by this guard. Taking it before releasing
    /// the book lock keeps batches in envelope order for every subscriber.
    pub fn reserve(&self) -> Publisher<'_> {
        Publisher {
            subscribers: self.subscribers.lock(),
        }
    }

    pub fn publish(&self, batch: Vec<EventEnvelope>) {
        self.reserve().send(batch);
    }
}

/// Exclusive handle for sending one batch.
pub struct Publisher<'a> {
    subscribers: MutexGuard<'a, Vec<Sender<EventEnvelope>>>,
}

impl Publisher<'_> {
    pub fn send(mut self, batch: Vec<EventEnvelope>) {
        if batch.is_empty() {
            return;
        }
        self.subscribers
            .retain(|tx| batch.iter().all(|envelope| tx.send(envelope.clone()).is_ok()));
    }
}
