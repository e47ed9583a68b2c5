//! Thread-safe handle to one book.
//!
//! [`SharedBook`] wraps a [`MatchingEngine`] in an
//! `Arc<parking_lot::RwLock<_>>`: mutations take the write lock and are
//! applied one at a time in lock-acquisition order, queries share the read
//! lock. Clones are cheap and refer to the same book.
//!
//! Events for a mutation are built and sequenced while the write lock is
//! held, and delivered after it is released.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use parking_lot::RwLock;

use crate::config::BookConfig;
use crate::engine::events::{BookEvent, EventBus, EventEnvelope};
use crate::engine::{MatchingEngine, PlaceResult};
use crate::error::Result;
use crate::types::{DepthSnapshot, Order, Side};

#[derive(Debug)]
struct Inner {
    engine: MatchingEngine,
    next_event: u64,
}

impl Inner {
    fn envelope_all(&mut self, instrument: &Arc<str>, events: Vec<BookEvent>) -> Vec<EventEnvelope> {
        events
            .into_iter()
            .map(|event| {
                let sequence = self.next_event;
                self.next_event += 1;
                EventEnvelope { sequence, instrument: Arc::clone(instrument), event }
            })
            .collect()
    }

    fn level_changed(&self, side: Side, price: u64) -> BookEvent {
        BookEvent::LevelChanged {
            side,
            price,
            total_volume: self.engine.level_volume(side, price),
        }
    }

    fn place_events(&self, quantity: u64, result: &PlaceResult) -> Vec<BookEvent> {
        let mut events = Vec::with_capacity(result.matches.len() * 2 + 3);
        events.push(BookEvent::Accepted {
            order_id: result.order_id,
            side: result.side,
            order_type: result.order_type,
            price: result.price,
            quantity,
        });
        events.extend(result.matches.iter().cloned().map(BookEvent::Matched));

        let maker_side = result.side.opposite();
        let mut touched: Vec<u64> = Vec::new();
        for m in &result.matches {
            if !touched.contains(&m.price) {
                touched.push(m.price);
            }
        }
        events.extend(touched.into_iter().map(|price| self.level_changed(maker_side, price)));

        if let Some(price) = result.price.filter(|_| result.resting > 0) {
            events.push(BookEvent::Rested {
                order_id: result.order_id,
                side: result.side,
                price,
                remaining: result.resting,
            });
            events.push(self.level_changed(result.side, price));
        }
        events
    }
}

#[derive(Debug, Clone)]
pub struct SharedBook {
    inner: Arc<RwLock<Inner>>,
    bus: Arc<EventBus>,
    instrument: Arc<str>,
}

impl SharedBook {
    pub fn new(config: BookConfig) -> Self {
        Self::from_engine(MatchingEngine::with_config(config))
    }

    pub fn from_engine(engine: MatchingEngine) -> Self {
        let instrument: Arc<str> = Arc::from(engine.config().instrument.as_str());
        Self {
            inner: Arc::new(RwLock::new(Inner { engine, next_event: 1 })),
            bus: Arc::new(EventBus::new()),
            instrument,
        }
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Receive every event published after this call.
    pub fn subscribe(&self) -> Receiver<EventEnvelope> {
        self.bus.subscribe()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    pub fn place_limit(&self, side: Side, price: u64, quantity: u64) -> Result<PlaceResult> {
        self.mutate(|inner| {
            let result = inner.engine.place_limit(side, price, quantity)?;
            let events = inner.place_events(quantity, &result);
            Ok((result, events))
        })
    }

    pub fn place_market(&self, side: Side, quantity: u64) -> Result<PlaceResult> {
        self.mutate(|inner| {
            let result = inner.engine.place_market(side, quantity)?;
            let events = inner.place_events(quantity, &result);
            Ok((result, events))
        })
    }

    pub fn cancel(&self, order_id: u64) -> Result<Order> {
        self.mutate(|inner| {
            let order = inner.engine.cancel(order_id)?;
            let events = vec![
                BookEvent::Cancelled {
                    order_id,
                    side: order.side(),
                    price: order.price,
                    remaining: order.remaining,
                },
                inner.level_changed(order.side(), order.price),
            ];
            Ok((order, events))
        })
    }

    pub fn amend(&self, order_id: u64, new_quantity: u64) -> Result<Order> {
        self.mutate(|inner| {
            let before = inner.engine.order(order_id);
            let order = inner.engine.amend(order_id, new_quantity)?;
            if before.as_ref() == Some(&order) {
                return Ok((order, Vec::new()));
            }
            let events = vec![
                BookEvent::Amended {
                    order_id,
                    side: order.side(),
                    price: order.price,
                    remaining: order.remaining,
                    sequence: order.sequence,
                },
                inner.level_changed(order.side(), order.price),
            ];
            Ok((order, events))
        })
    }

    /// Drop every resting order. Publishes nothing.
    pub fn clear(&self) {
        self.inner.write().engine.clear();
    }

    fn mutate<T>(&self, op: impl FnOnce(&mut Inner) -> Result<(T, Vec<BookEvent>)>) -> Result<T> {
        let mut inner = self.inner.write();
        let (value, events) = op(&mut inner)?;
        if events.is_empty() {
            return Ok(value);
        }
        let batch = inner.envelope_all(&self.instrument, events);

        let publisher = self.bus.reserve();
        drop(inner);
        publisher.send(batch);
        Ok(value)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Run `f` against the engine under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&MatchingEngine) -> R) -> R {
        f(&self.inner.read().engine)
    }

    pub fn best_bid(&self) -> Option<u64> {
        self.read(MatchingEngine::best_bid)
    }

    pub fn best_ask(&self) -> Option<u64> {
        self.read(MatchingEngine::best_ask)
    }

    pub fn spread(&self) -> Option<u64> {
        self.read(MatchingEngine::spread)
    }

    pub fn depth_snapshot(&self) -> DepthSnapshot {
        self.read(MatchingEngine::depth_snapshot)
    }

    pub fn total_volume(&self, side: Side) -> u64 {
        self.read(|engine| engine.total_volume(side))
    }

    pub fn level_volume(&self, side: Side, price: u64) -> u64 {
        self.read(|engine| engine.level_volume(side, price))
    }

    pub fn order(&self, order_id: u64) -> Option<Order> {
        self.read(|engine| engine.order(order_id))
    }

    pub fn order_count(&self) -> usize {
        self.read(MatchingEngine::order_count)
    }

    pub fn state_root(&self) -> Result<[u8; 32]> {
        self.read(MatchingEngine::state_root)
    }

    pub fn verify(&self) -> Result<()> {
        self.read(MatchingEngine::verify)
    }
}
