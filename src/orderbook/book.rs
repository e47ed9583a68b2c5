//! Order book storage for one instrument.
//!
//! ## Architecture
//!
//! - **Slab**: arena holding every resting `OrderNode`
//! - **BookSide** ×2: price levels per direction, best price cached
//! - **OrderIndex**: order id → (side, price, slab key) for O(1) cancel
//!
//! `OrderBook` only performs structural mutations (insert, remove, fill
//! the best front, resize). Matching policy lives in
//! [`MatchingEngine`](crate::engine::MatchingEngine). Every method leaves
//! the arena, both sides and the index mutually consistent: an order is in
//! a level exactly when it is in the index, and no level is ever left empty.
//!
//! ## Example
//!
//! ```
//! use limit_book::orderbook::OrderBook;
//! use limit_book::types::{Order, Side};
//!
//! let mut book = OrderBook::with_capacity(1_000);
//! book.insert(Order::limit(1, Side::Buy, 10_000, 5, 1)).unwrap();
//! book.insert(Order::limit(2, Side::Sell, 10_100, 5, 2)).unwrap();
//!
//! assert_eq!(book.best_bid(), Some(10_000));
//! assert_eq!(book.best_ask(), Some(10_100));
//! assert_eq!(book.spread(), Some(100));
//! ```

use sha2::{Digest, Sha256};
use slab::Slab;

use crate::error::{BookError, Result};
use crate::orderbook::{BookSide, FrontFill, IndexEntry, OrderIndex, OrderNode};
use crate::types::{DepthLevel, DepthSnapshot, Order, OrderStatus, Side};

#[derive(Debug)]
pub struct OrderBook {
    orders: Slab<OrderNode>,
    bids: BookSide,
    asks: BookSide,
    index: OrderIndex,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Pre-allocate `order_capacity` arena slots and index entries.
    ///
    /// ```
    /// use limit_book::orderbook::OrderBook;
    ///
    /// let book = OrderBook::with_capacity(100_000);
    /// assert!(book.capacity() >= 100_000);
    /// ```
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self {
            orders: Slab::with_capacity(order_capacity),
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            index: OrderIndex::with_capacity(order_capacity),
        }
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    /// Number of resting orders
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    pub fn bid_levels(&self) -> usize {
        self.bids.level_count()
    }

    pub fn ask_levels(&self) -> usize {
        self.asks.level_count()
    }

    pub fn index(&self) -> &OrderIndex {
        &self.index
    }

    pub(crate) fn nodes(&self) -> &Slab<OrderNode> {
        &self.orders
    }

    fn side_and_slab(&mut self, side: Side) -> (&mut BookSide, &mut Slab<OrderNode>) {
        match side {
            Side::Buy => (&mut self.bids, &mut self.orders),
            Side::Sell => (&mut self.asks, &mut self.orders),
        }
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Rest an order at the tail of its price level.
    ///
    /// The order must be a limit order with remaining quantity and an id not
    /// already in the book. Fails with `InvalidQuantity`, changing nothing,
    /// if its side's total volume would overflow.
    ///
    /// # Returns
    ///
    /// The slab key for the added order
    pub fn insert(&mut self, mut order: Order) -> Result<usize> {
        let Some(price) = order.limit_price() else {
            return Err(BookError::invariant(format!("market order {} cannot rest", order.id)));
        };
        if order.remaining == 0 {
            return Err(BookError::invariant(format!("order {} rests with zero quantity", order.id)));
        }
        if self.index.contains(order.id) {
            return Err(BookError::invariant(format!("order {} is already resting", order.id)));
        }

        let order_id = order.id;
        let side = order.side();
        let remaining = order.remaining;
        if !self.side(side).has_room_for(remaining) {
            return Err(BookError::InvalidQuantity);
        }
        order.set_status(OrderStatus::Resting);

        let key = self.orders.insert(OrderNode::new(order));
        self.index.register(order_id, side, price, key)?;

        let (book_side, slab) = self.side_and_slab(side);
        book_side.get_or_create_level(price).append(key, slab)?;
        book_side.credit(remaining)?;
        Ok(key)
    }

    /// Remove a resting order, dropping its level if it empties.
    ///
    /// Fails with `OrderNotFound` for ids that are not resting.
    pub fn remove(&mut self, order_id: u64) -> Result<Order> {
        let entry = self.index.lookup(order_id)?;
        self.detach(order_id, entry)?;
        Ok(self.orders.remove(entry.key).order)
    }

    fn detach(&mut self, order_id: u64, entry: IndexEntry) -> Result<()> {
        let (book_side, slab) = self.side_and_slab(entry.side);
        let level = book_side
            .level_mut(entry.price)
            .ok_or_else(|| BookError::invariant(format!("order {order_id}: no level at {}", entry.price)))?;
        let quantity = level.remove(entry.key, slab)?;
        book_side.debit(quantity)?;
        book_side.remove_level_if_empty(entry.price);
        self.index.unregister(order_id);
        Ok(())
    }

    /// Fill up to `quantity` from the oldest order at the best price of `side`.
    ///
    /// An exhausted maker leaves the arena and the index, and an emptied
    /// level leaves the side, before this returns.
    ///
    /// # Returns
    ///
    /// `None` if the side is empty
    pub fn fill_best(&mut self, side: Side, quantity: u64) -> Result<Option<FrontFill>> {
        let (book_side, slab) = self.side_and_slab(side);
        let Some(level) = book_side.best_level_mut() else {
            return Ok(None);
        };
        let Some(fill) = level.reduce_front(quantity, slab)? else {
            return Err(BookError::invariant(format!("empty level {} left on book", level.price)));
        };

        book_side.debit(fill.quantity)?;
        if fill.exhausted {
            book_side.remove_level_if_empty(fill.price);
            self.orders.remove(fill.key);
            self.index.unregister(fill.maker_order_id);
        }
        Ok(Some(fill))
    }

    /// Reduce a resting order's remaining quantity in place (time priority kept).
    pub fn shrink(&mut self, order_id: u64, new_remaining: u64) -> Result<Order> {
        let entry = self.index.lookup(order_id)?;
        let (book_side, slab) = self.side_and_slab(entry.side);
        let level = book_side
            .level_mut(entry.price)
            .ok_or_else(|| BookError::invariant(format!("order {order_id}: no level at {}", entry.price)))?;
        let delta = level.shrink(entry.key, new_remaining, slab)?;
        book_side.debit(delta)?;
        self.node_order(entry.key)
    }

    /// Move a resting order to the back of its level with a new remaining
    /// quantity and arrival sequence. The slab key and index entry survive.
    ///
    /// Fails with `InvalidQuantity`, changing nothing, if the order's total
    /// or its side's total volume would overflow.
    pub fn requeue(&mut self, order_id: u64, new_remaining: u64, sequence: u64) -> Result<Order> {
        let entry = self.index.lookup(order_id)?;
        let mut resized = self.node_order(entry.key)?;
        resized.resize(new_remaining)?;
        let (book_side, slab) = self.side_and_slab(entry.side);
        let old_remaining = slab
            .get(entry.key)
            .map(OrderNode::remaining)
            .ok_or_else(|| BookError::invariant(format!("dangling order key {}", entry.key)))?;
        let others = book_side.total_volume().checked_sub(old_remaining).ok_or_else(|| {
            BookError::invariant(format!("{:?} total below order {order_id}", entry.side))
        })?;
        if others.checked_add(new_remaining).is_none() {
            return Err(BookError::InvalidQuantity);
        }

        let level = book_side
            .level_mut(entry.price)
            .ok_or_else(|| BookError::invariant(format!("order {order_id}: no level at {}", entry.price)))?;
        level.remove(entry.key, slab)?;
        if let Some(node) = slab.get_mut(entry.key) {
            node.order.quantity = resized.quantity;
            node.order.remaining = resized.remaining;
            node.order.sequence = sequence;
        }
        level.append(entry.key, slab)?;

        book_side.debit(old_remaining)?;
        book_side.credit(new_remaining)?;
        self.node_order(entry.key)
    }

    fn node_order(&self, key: usize) -> Result<Order> {
        self.orders
            .get(key)
            .map(|node| node.order.clone())
            .ok_or_else(|| BookError::invariant(format!("dangling order key {key}")))
    }

    /// A resting order by id
    pub fn get(&self, order_id: u64) -> Option<&Order> {
        let entry = self.index.lookup(order_id).ok()?;
        self.orders.get(entry.key).map(|node| &node.order)
    }

    #[inline]
    pub fn contains(&self, order_id: u64) -> bool {
        self.index.contains(order_id)
    }

    // ========================================================================
    // Best Bid/Ask and Depth
    // ========================================================================

    #[inline]
    pub fn best_bid(&self) -> Option<u64> {
        self.bids.best_price()
    }

    #[inline]
    pub fn best_ask(&self) -> Option<u64> {
        self.asks.best_price()
    }

    /// `best_ask - best_bid`, `None` if either side is empty
    pub fn spread(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) if ask >= bid => Some(ask - bid),
            _ => None,
        }
    }

    pub fn level_volume(&self, side: Side, price: u64) -> u64 {
        self.side(side).level(price).map_or(0, |level| level.total_volume())
    }

    pub fn total_volume(&self, side: Side) -> u64 {
        self.side(side).total_volume()
    }

    pub fn depth(&self) -> DepthSnapshot {
        let collect = |book_side: &BookSide| {
            book_side
                .iter_best_first()
                .map(|level| DepthLevel {
                    price: level.price,
                    total_volume: level.total_volume(),
                    order_count: level.order_count(),
                })
                .collect::<Vec<_>>()
        };
        DepthSnapshot {
            bids: collect(&self.bids),
            asks: collect(&self.asks),
        }
    }

    /// Resting orders in priority order: bids best-first, then asks
    /// best-first, FIFO within each level.
    pub fn resting_orders(&self) -> impl Iterator<Item = &Order> + '_ {
        self.bids
            .iter_best_first()
            .chain(self.asks.iter_best_first())
            .flat_map(move |level| level.iter(&self.orders).map(|(_, node)| &node.order))
    }

    /// SHA-256 over the SSZ encoding of every resting order in priority order.
    ///
    /// Identical operation sequences produce identical roots.
    pub fn state_root(&self) -> Result<[u8; 32]> {
        let mut hasher = Sha256::new();
        for order in self.resting_orders() {
            hasher.update(order.encode()?);
        }
        let mut root = [0u8; 32];
        root.copy_from_slice(&hasher.finalize());
        Ok(root)
    }

    /// Drop every resting order.
    pub fn clear(&mut self) {
        self.orders.clear();
        self.bids.clear();
        self.asks.clear();
        self.index.clear();
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
