//! One side of the book: price levels ordered best-first.
//!
//! Levels live in a `BTreeMap<u64, PriceLevel>` (logarithmic insert and
//! delete, ordered traversal). The best price is cached and only
//! recomputed when the best level itself is removed, so `best_price()`
//! never searches the tree.
//!
//! - **Bids**: best = highest price
//! - **Asks**: best = lowest price
//!
//! The side also keeps the running sum of its levels' volumes. Every level
//! volume is bounded by it, so a side total that fits in `u64` means no
//! level or order sum can overflow either.

use std::collections::BTreeMap;

use crate::error::{BookError, Result};
use crate::orderbook::PriceLevel;
use crate::types::Side;

#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    levels: BTreeMap<u64, PriceLevel>,
    best: Option<u64>,
    total_volume: u64,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
            best: None,
            total_volume: 0,
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// True when `a` has priority over `b` on this side.
    #[inline]
    pub fn is_better(&self, a: u64, b: u64) -> bool {
        match self.side {
            Side::Buy => a > b,
            Side::Sell => a < b,
        }
    }

    #[inline]
    pub fn best_price(&self) -> Option<u64> {
        self.best
    }

    pub fn best_level(&self) -> Option<&PriceLevel> {
        self.levels.get(&self.best?)
    }

    pub fn best_level_mut(&mut self) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&self.best?)
    }

    pub fn level(&self, price: u64) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    pub fn level_mut(&mut self, price: u64) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// Existing level at `price`, or a new empty one in sorted position.
    pub fn get_or_create_level(&mut self, price: u64) -> &mut PriceLevel {
        if !self.levels.contains_key(&price) {
            let improves = match self.best {
                Some(best) => self.is_better(price, best),
                None => true,
            };
            if improves {
                self.best = Some(price);
            }
        }
        self.levels.entry(price).or_insert_with(|| PriceLevel::new(price))
    }

    /// Drop the level at `price` if it has no orders left.
    ///
    /// # Returns
    ///
    /// `true` if a level was removed
    pub fn remove_level_if_empty(&mut self, price: u64) -> bool {
        let empty = self.levels.get(&price).is_some_and(PriceLevel::is_empty);
        if !empty {
            return false;
        }
        self.levels.remove(&price);
        if self.best == Some(price) {
            self.best = self.extreme();
        }
        true
    }

    /// Levels in priority order.
    pub fn iter_best_first(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.values().rev()),
            Side::Sell => Box::new(self.levels.values()),
        }
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn order_count(&self) -> usize {
        self.levels.values().map(PriceLevel::order_count).sum()
    }

    #[inline]
    pub fn total_volume(&self) -> u64 {
        self.total_volume
    }

    /// True if `quantity` more can rest here without the side total overflowing.
    #[inline]
    pub fn has_room_for(&self, quantity: u64) -> bool {
        self.total_volume.checked_add(quantity).is_some()
    }

    pub(crate) fn credit(&mut self, quantity: u64) -> Result<()> {
        self.total_volume = self
            .total_volume
            .checked_add(quantity)
            .ok_or(BookError::InvalidQuantity)?;
        Ok(())
    }

    pub(crate) fn debit(&mut self, quantity: u64) -> Result<()> {
        self.total_volume = self.total_volume.checked_sub(quantity).ok_or_else(|| {
            BookError::invariant(format!("{:?} total below debit of {quantity}", self.side))
        })?;
        Ok(())
    }

    /// Sum of level volumes recomputed from the tree, `None` on overflow.
    pub(crate) fn summed_volume(&self) -> Option<u64> {
        self.levels
            .values()
            .try_fold(0u64, |acc, level| acc.checked_add(level.total_volume()))
    }

    /// Volume available best-first, stopping once `quantity` is covered.
    ///
    /// Returns `min(quantity, total_volume)` without walking the whole side.
    pub fn available_up_to(&self, quantity: u64) -> u64 {
        self.available(None, quantity)
    }

    /// Like [`available_up_to`](Self::available_up_to), counting only levels
    /// an opposite-side order limited at `limit` would trade with.
    pub fn available_within(&self, limit: u64, quantity: u64) -> u64 {
        self.available(Some(limit), quantity)
    }

    fn available(&self, limit: Option<u64>, quantity: u64) -> u64 {
        let taker = self.side.opposite();
        let mut available = 0u64;
        for level in self.iter_best_first() {
            if limit.is_some_and(|limit| !taker.accepts(level.price, limit)) {
                break;
            }
            available = available.saturating_add(level.total_volume());
            if available >= quantity {
                return quantity;
            }
        }
        available
    }

    /// Best price recomputed from the tree.
    pub(crate) fn extreme(&self) -> Option<u64> {
        match self.side {
            Side::Buy => self.levels.keys().next_back().copied(),
            Side::Sell => self.levels.keys().next().copied(),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.levels.clear();
        self.best = None;
        self.total_volume = 0;
    }
}
