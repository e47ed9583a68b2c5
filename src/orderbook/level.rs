//! Price level: FIFO queue of resting orders at one price.
//!
//! ## Queue Structure
//!
//! ```text
//! head (oldest) <-> order2 <-> order3 <-> tail (newest)
//! ```
//!
//! - New orders are appended at the tail
//! - Matching consumes orders from the head
//! - Any order can be removed in O(1) given its slab key
//!
//! The order data lives in the slab; the level only holds queue metadata
//! and the aggregate volume, which always equals the sum of its members'
//! remaining quantities.

use slab::Slab;

use crate::error::{BookError, Result};
use crate::orderbook::OrderNode;
use crate::types::Order;

/// Outcome of consuming quantity from the front of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontFill {
    /// Slab key of the maker
    pub key: usize,
    pub maker_order_id: u64,
    /// Level price, i.e. the execution price
    pub price: u64,
    pub quantity: u64,
    /// Maker reached zero and was unlinked from the queue
    pub exhausted: bool,
}

/// Orders at a single price.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    pub price: u64,
    total_volume: u64,
    head: Option<usize>,
    tail: Option<usize>,
    order_count: usize,
}

fn node_mut(slab: &mut Slab<OrderNode>, key: usize, price: u64) -> Result<&mut OrderNode> {
    slab.get_mut(key)
        .ok_or_else(|| BookError::invariant(format!("level {price}: dangling order key {key}")))
}

impl PriceLevel {
    pub fn new(price: u64) -> Self {
        Self {
            price,
            total_volume: 0,
            head: None,
            tail: None,
            order_count: 0,
        }
    }

    #[inline]
    pub fn total_volume(&self) -> u64 {
        self.total_volume
    }

    #[inline]
    pub fn order_count(&self) -> usize {
        self.order_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Oldest order, the next to be matched.
    pub fn peek_front<'a>(&self, slab: &'a Slab<OrderNode>) -> Option<&'a Order> {
        slab.get(self.head?).map(|node| &node.order)
    }

    /// Slab key of the oldest order.
    #[inline]
    pub fn front_key(&self) -> Option<usize> {
        self.head
    }

    /// Slab key of the newest order.
    #[inline]
    pub fn back_key(&self) -> Option<usize> {
        self.tail
    }

    /// Add an order to the tail of the queue.
    pub fn append(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> Result<()> {
        let price = self.price;
        let added = node_mut(slab, key, price)?.remaining();
        let volume = self.total_volume.checked_add(added).ok_or_else(|| {
            BookError::invariant(format!("level {price}: volume overflow on append of key {key}"))
        })?;

        let node = node_mut(slab, key, price)?;
        node.prev = self.tail;
        node.next = None;

        match self.tail {
            Some(tail_key) => node_mut(slab, tail_key, self.price)?.next = Some(key),
            None => self.head = Some(key),
        }

        self.tail = Some(key);
        self.order_count += 1;
        self.total_volume = volume;
        Ok(())
    }

    /// Fill up to `quantity` from the front order.
    ///
    /// The front order is unlinked when it reaches zero; the caller owns
    /// removing it from the slab and the order index.
    pub fn reduce_front(&mut self, quantity: u64, slab: &mut Slab<OrderNode>) -> Result<Option<FrontFill>> {
        let Some(key) = self.head else {
            return Ok(None);
        };

        let node = node_mut(slab, key, self.price)?;
        let filled = node.fill(quantity);
        let maker_order_id = node.order_id();
        let exhausted = node.is_filled();
        self.total_volume = self.total_volume.checked_sub(filled).ok_or_else(|| {
            BookError::invariant(format!("level {}: volume below front order remainder", self.price))
        })?;

        if exhausted {
            self.unlink(key, slab)?;
        }

        Ok(Some(FrontFill {
            key,
            maker_order_id,
            price: self.price,
            quantity: filled,
            exhausted,
        }))
    }

    /// Excise an order anywhere in the queue, keeping the others in order.
    ///
    /// # Returns
    ///
    /// The remaining quantity of the removed order
    pub fn remove(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> Result<u64> {
        let quantity = node_mut(slab, key, self.price)?.remaining();
        self.unlink(key, slab)?;
        self.total_volume = self.total_volume.checked_sub(quantity).ok_or_else(|| {
            BookError::invariant(format!("level {}: volume below removed order remainder", self.price))
        })?;
        Ok(quantity)
    }

    /// Reduce an order's remaining quantity without moving it in the queue.
    ///
    /// # Returns
    ///
    /// The quantity taken off the level
    pub fn shrink(&mut self, key: usize, new_remaining: u64, slab: &mut Slab<OrderNode>) -> Result<u64> {
        let node = node_mut(slab, key, self.price)?;
        let current = node.remaining();
        if new_remaining > current {
            return Err(BookError::invariant(format!(
                "level {}: shrink of order {} from {current} to {new_remaining}",
                self.price,
                node.order_id()
            )));
        }
        node.order.resize(new_remaining)?;
        let delta = current - new_remaining;
        self.total_volume -= delta;
        Ok(delta)
    }

    /// Iterate the queue from oldest to newest.
    pub fn iter<'a>(&self, slab: &'a Slab<OrderNode>) -> LevelIter<'a> {
        LevelIter {
            slab,
            cursor: self.head,
        }
    }

    fn unlink(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> Result<()> {
        let node = node_mut(slab, key, self.price)?;
        let prev_key = node.prev.take();
        let next_key = node.next.take();

        match prev_key {
            Some(prev) => node_mut(slab, prev, self.price)?.next = next_key,
            None => self.head = next_key,
        }
        match next_key {
            Some(next) => node_mut(slab, next, self.price)?.prev = prev_key,
            None => self.tail = prev_key,
        }

        self.order_count -= 1;
        Ok(())
    }
}

/// Front-to-back walk over a level's queue.
pub struct LevelIter<'a> {
    slab: &'a Slab<OrderNode>,
    cursor: Option<usize>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = (usize, &'a OrderNode);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        let node = self.slab.get(key)?;
        self.cursor = node.next;
        Some((key, node))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Order, Side};

    fn create_test_node(slab: &mut Slab<OrderNode>, id: u64, quantity: u64) -> usize {
        slab.insert(OrderNode::new(Order::limit(id, Side::Buy, 10_000, quantity, id)))
    }

    fn queue_ids(level: &PriceLevel, slab: &Slab<OrderNode>) -> Vec<u64> {
        level.iter(slab).map(|(_, node)| node.order_id()).collect()
    }

    #[test]
    fn test_price_level_new() {
        let level = PriceLevel::new(10_000);

        assert_eq!(level.price, 10_000);
        assert_eq!(level.total_volume(), 0);
        assert!(level.front_key().is_none());
        assert!(level.is_empty());
    }

    #[test]
    fn test_price_level_append_multiple() {
        let mut slab = Slab::with_capacity(10);
        let mut level = PriceLevel::new(10_000);

        let key1 = create_test_node(&mut slab, 1, 5);
        let key2 = create_test_node(&mut slab, 2, 8);
        let key3 = create_test_node(&mut slab, 3, 10);

        level.append(key1, &mut slab).unwrap();
        level.append(key2, &mut slab).unwrap();
        level.append(key3, &mut slab).unwrap();

        assert_eq!(level.order_count(), 3);
        assert_eq!(level.total_volume(), 23);
        assert_eq!(level.front_key(), Some(key1));
        assert_eq!(level.back_key(), Some(key3));
        assert_eq!(queue_ids(&level, &slab), vec![1, 2, 3]);

        let node2 = slab.get(key2).unwrap();
        assert_eq!(node2.prev, Some(key1));
        assert_eq!(node2.next, Some(key3));
    }

    #[test]
    fn test_price_level_remove_middle() {
        let mut slab = Slab::with_capacity(10);
        let mut level = PriceLevel::new(10_000);

        let key1 = create_test_node(&mut slab, 1, 5);
        let key2 = create_test_node(&mut slab, 2, 8);
        let key3 = create_test_node(&mut slab, 3, 10);
        for key in [key1, key2, key3] {
            level.append(key, &mut slab).unwrap();
        }

        assert_eq!(level.remove(key2, &mut slab).unwrap(), 8);
        assert_eq!(level.total_volume(), 15);
        assert_eq!(queue_ids(&level, &slab), vec![1, 3]);
        assert!(slab.get(key2).unwrap().is_unlinked());
    }

    #[test]
    fn test_price_level_remove_head_and_tail() {
        let mut slab = Slab::with_capacity(10);
        let mut level = PriceLevel::new(10_000);

        let key1 = create_test_node(&mut slab, 1, 5);
        let key2 = create_test_node(&mut slab, 2, 8);
        level.append(key1, &mut slab).unwrap();
        level.append(key2, &mut slab).unwrap();

        level.remove(key1, &mut slab).unwrap();
        assert_eq!(level.front_key(), Some(key2));
        assert_eq!(level.back_key(), Some(key2));

        level.remove(key2, &mut slab).unwrap();
        assert!(level.is_empty());
        assert_eq!(level.total_volume(), 0);
        assert!(level.front_key().is_none());
        assert!(level.back_key().is_none());
    }

    #[test]
    fn test_reduce_front_partial_keeps_position() {
        let mut slab = Slab::with_capacity(10);
        let mut level = PriceLevel::new(20_000);

        let key1 = create_test_node(&mut slab, 1, 5);
        level.append(key1, &mut slab).unwrap();

        let fill = level.reduce_front(2, &mut slab).unwrap().unwrap();
        assert_eq!(fill, FrontFill { key: key1, maker_order_id: 1, price: 20_000, quantity: 2, exhausted: false });
        assert_eq!(level.total_volume(), 3);
        assert_eq!(level.front_key(), Some(key1));
    }

    #[test]
    fn test_reduce_front_exhausts_and_advances() {
        let mut slab = Slab::with_capacity(10);
        let mut level = PriceLevel::new(20_000);

        let key1 = create_test_node(&mut slab, 1, 5);
        let key2 = create_test_node(&mut slab, 2, 4);
        level.append(key1, &mut slab).unwrap();
        level.append(key2, &mut slab).unwrap();

        // Asking for more than the front holds only takes the front
        let fill = level.reduce_front(7, &mut slab).unwrap().unwrap();
        assert_eq!(fill.quantity, 5);
        assert!(fill.exhausted);
        assert_eq!(level.front_key(), Some(key2));
        assert_eq!(level.order_count(), 1);
        assert_eq!(level.total_volume(), 4);
    }

    #[test]
    fn test_reduce_front_on_empty_level() {
        let mut slab: Slab<OrderNode> = Slab::new();
        let mut level = PriceLevel::new(20_000);
        assert_eq!(level.reduce_front(1, &mut slab).unwrap(), None);
    }

    #[test]
    fn test_shrink_in_place() {
        let mut slab = Slab::with_capacity(10);
        let mut level = PriceLevel::new(10_000);

        let key1 = create_test_node(&mut slab, 1, 5);
        let key2 = create_test_node(&mut slab, 2, 8);
        level.append(key1, &mut slab).unwrap();
        level.append(key2, &mut slab).unwrap();

        assert_eq!(level.shrink(key1, 2, &mut slab).unwrap(), 3);
        assert_eq!(level.total_volume(), 10);
        assert_eq!(queue_ids(&level, &slab), vec![1, 2]);

        assert!(level.shrink(key1, 3, &mut slab).unwrap_err().is_fatal());
    }

    #[test]
    fn test_peek_front_returns_oldest_order() {
        let mut slab = Slab::with_capacity(10);
        let mut level = PriceLevel::new(10_000);
        assert!(level.peek_front(&slab).is_none());

        let key1 = create_test_node(&mut slab, 1, 5);
        let key2 = create_test_node(&mut slab, 2, 8);
        level.append(key1, &mut slab).unwrap();
        level.append(key2, &mut slab).unwrap();

        let front = level.peek_front(&slab).unwrap();
        assert_eq!((front.id, front.remaining), (1, 5));

        level.remove(key1, &mut slab).unwrap();
        assert_eq!(level.peek_front(&slab).unwrap().id, 2);
    }

    #[test]
    fn test_append_volume_overflow_is_reported() {
        let mut slab = Slab::with_capacity(10);
        let mut level = PriceLevel::new(10_000);

        let key1 = create_test_node(&mut slab, 1, u64::MAX);
        let key2 = create_test_node(&mut slab, 2, 1);
        level.append(key1, &mut slab).unwrap();

        assert!(level.append(key2, &mut slab).unwrap_err().is_fatal());
        assert_eq!(level.total_volume(), u64::MAX);
        assert_eq!(level.order_count(), 1);
        assert!(slab.get(key2).unwrap().is_unlinked());
    }

    #[test]
    fn test_dangling_key_is_invariant_violation() {
        let mut slab: Slab<OrderNode> = Slab::new();
        let mut level = PriceLevel::new(10_000);

        let err = level.append(99, &mut slab).unwrap_err();
        assert!(err.is_fatal());
    }
}
