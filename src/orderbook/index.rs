//! Order id → resting location.
//!
//! Every resting order has exactly one entry; the entry is dropped the
//! moment the order is filled or cancelled. The slab key is the handle
//! `PriceLevel::remove` needs, so cancel never scans a queue.

use std::collections::HashMap;

use crate::error::{BookError, Result};
use crate::types::Side;

/// Where a resting order lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub side: Side,
    pub price: u64,
    /// Slab key of the order node
    pub key: usize,
}

#[derive(Debug, Clone, Default)]
pub struct OrderIndex {
    entries: HashMap<u64, IndexEntry>,
}

impl OrderIndex {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Fails if the id is already registered.
    pub fn register(&mut self, order_id: u64, side: Side, price: u64, key: usize) -> Result<()> {
        if self.entries.contains_key(&order_id) {
            return Err(BookError::invariant(format!("order {order_id} registered twice")));
        }
        self.entries.insert(order_id, IndexEntry { side, price, key });
        Ok(())
    }

    pub fn lookup(&self, order_id: u64) -> Result<IndexEntry> {
        self.entries
            .get(&order_id)
            .copied()
            .ok_or(BookError::OrderNotFound(order_id))
    }

    pub fn unregister(&mut self, order_id: u64) -> Option<IndexEntry> {
        self.entries.remove(&order_id)
    }

    #[inline]
    pub fn contains(&self, order_id: u64) -> bool {
        self.entries.contains_key(&order_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &IndexEntry)> {
        self.entries.iter().map(|(id, entry)| (*id, entry))
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
