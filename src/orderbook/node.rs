//! Arena node for a resting order.
//!
//! ## Design
//!
//! `OrderNode` wraps an `Order` with the links of its price level's FIFO
//! queue. Links are slab keys, not references, so removing a node never
//! leaves a dangling pointer behind: a stale key simply fails the lookup.
//!
//! Per slab docs (https://docs.rs/slab/0.4.11):
//! - Keys are `usize` values returned by `slab.insert()`
//! - Keys may be reused after `slab.remove()`
//!
//! ```text
//! head (oldest) <-> ... <-> tail (newest)
//!         prev <- node -> next
//! ```

use crate::types::{Order, Side};

/// Order plus its position in a price level queue.
#[derive(Debug, Clone)]
pub struct OrderNode {
    pub order: Order,

    /// Newer neighbour, `None` at the tail
    pub next: Option<usize>,

    /// Older neighbour, `None` at the head
    pub prev: Option<usize>,
}

impl OrderNode {
    /// Create an unlinked node
    ///
    /// ```
    /// use limit_book::orderbook::OrderNode;
    /// use limit_book::types::{Order, Side};
    ///
    /// let node = OrderNode::new(Order::limit(1, Side::Buy, 10_000, 5, 1));
    /// assert!(node.is_unlinked());
    /// ```
    #[inline]
    pub fn new(order: Order) -> Self {
        Self {
            order,
            next: None,
            prev: None,
        }
    }

    #[inline]
    pub fn is_unlinked(&self) -> bool {
        self.next.is_none() && self.prev.is_none()
    }

    #[inline]
    pub fn order_id(&self) -> u64 {
        self.order.id
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.order.side()
    }

    #[inline]
    pub fn price(&self) -> u64 {
        self.order.price
    }

    #[inline]
    pub fn remaining(&self) -> u64 {
        self.order.remaining
    }

    /// Returns the quantity actually filled.
    #[inline]
    pub fn fill(&mut self, quantity: u64) -> u64 {
        self.order.fill(quantity)
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.order.is_filled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_node_accessors() {
        let node = OrderNode::new(Order::limit(42, Side::Sell, 20_000, 5, 9));

        assert_eq!(node.order_id(), 42);
        assert_eq!(node.side(), Side::Sell);
        assert_eq!(node.price(), 20_000);
        assert_eq!(node.remaining(), 5);
        assert!(!node.is_filled());
    }

    #[test]
    fn test_order_node_fill() {
        let mut node = OrderNode::new(Order::limit(1, Side::Sell, 20_000, 5, 1));

        assert_eq!(node.fill(2), 2);
        assert_eq!(node.remaining(), 3);

        assert_eq!(node.fill(3), 3);
        assert!(node.is_filled());
    }

    #[test]
    fn test_order_node_linking() {
        let mut node = OrderNode::new(Order::limit(1, Side::Buy, 10_000, 5, 1));

        node.next = Some(2);
        assert!(!node.is_unlinked());

        node.next = None;
        node.prev = Some(0);
        assert!(!node.is_unlinked());
    }
}
