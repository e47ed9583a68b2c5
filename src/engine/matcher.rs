//! Price-time priority matching over one [`OrderBook`].
//!
//! ## Matching Rules
//!
//! - **Buy orders** walk the asks from the lowest price up
//! - **Sell orders** walk the bids from the highest price down
//! - Within a level the oldest order fills first
//! - Every match executes at the maker's price
//! - A limit order stops at its price bound and rests any remainder
//! - A market order has no bound, never rests, and is rejected up front
//!   when the opposite side cannot fill it completely
//!
//! Validation and liquidity checks run before anything is mutated, so a
//! rejected call leaves the book untouched.

use tracing::{debug, error, info, warn};

use crate::config::BookConfig;
use crate::engine::invariants;
use crate::error::{BookError, Result};
use crate::orderbook::OrderBook;
use crate::types::price::validate_price;
use crate::types::{DepthSnapshot, Match, Order, OrderStatus, OrderType, Side};

/// Outcome of placing an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceResult {
    pub order_id: u64,
    pub side: Side,
    pub order_type: OrderType,
    /// Limit price, `None` for market orders
    pub price: Option<u64>,
    /// `Filled`, or `Resting` when a remainder was left on the book
    pub status: OrderStatus,
    /// Matches in execution order
    pub matches: Vec<Match>,
    /// Quantity left resting on the book
    pub resting: u64,
}

impl PlaceResult {
    pub fn filled_quantity(&self) -> u64 {
        self.matches.iter().map(|m| m.quantity).sum()
    }

    pub fn fully_filled(&self) -> bool {
        self.status == OrderStatus::Filled
    }
}

/// Matching engine for a single instrument.
///
/// Owns its book, index and id counters; construct one per instrument.
#[derive(Debug)]
pub struct MatchingEngine {
    config: BookConfig,
    book: OrderBook,
    next_order_id: u64,
    next_sequence: u64,
    next_match_sequence: u64,
    fault: Option<BookError>,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self::with_config(BookConfig::default())
    }

    pub fn with_config(config: BookConfig) -> Self {
        Self {
            book: OrderBook::with_capacity(config.order_capacity),
            config,
            next_order_id: 1,
            next_sequence: 1,
            next_match_sequence: 1,
            fault: None,
        }
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Place a limit order.
    ///
    /// Crosses the opposite side while its best price is within `price`,
    /// then rests whatever is left.
    ///
    /// ```
    /// use limit_book::engine::MatchingEngine;
    /// use limit_book::types::{OrderStatus, Side};
    ///
    /// let mut engine = MatchingEngine::new();
    /// let maker = engine.place_limit(Side::Sell, 20_000, 5).unwrap();
    /// let taker = engine.place_limit(Side::Buy, 20_500, 2).unwrap();
    ///
    /// assert_eq!(taker.status, OrderStatus::Filled);
    /// assert_eq!(taker.matches[0].maker_order_id, maker.order_id);
    /// assert_eq!(taker.matches[0].price, 20_000);
    /// ```
    pub fn place_limit(&mut self, side: Side, price: u64, quantity: u64) -> Result<PlaceResult> {
        self.ensure_healthy()?;
        self.check_quantity(quantity)?;
        let price = match validate_price(price) {
            Ok(price) => price,
            Err(err) => {
                warn!(instrument = %self.config.instrument, ?side, %err, "limit order rejected");
                return Err(err);
            }
        };
        self.check_room(side, price, quantity)?;

        let order = Order::limit(self.allocate_order_id(), side, price, quantity, self.allocate_sequence());
        let outcome = self.execute_limit(order);
        self.finish(outcome)
    }

    /// Place a market order.
    ///
    /// All-or-nothing: fails with `InsufficientLiquidity` without touching
    /// the book unless the opposite side holds at least `quantity`.
    pub fn place_market(&mut self, side: Side, quantity: u64) -> Result<PlaceResult> {
        self.ensure_healthy()?;
        self.check_quantity(quantity)?;

        let available = self.book.side(side.opposite()).available_up_to(quantity);
        if available < quantity {
            warn!(
                instrument = %self.config.instrument,
                ?side,
                requested = quantity,
                available,
                "market order rejected: insufficient liquidity"
            );
            return Err(BookError::InsufficientLiquidity { requested: quantity, available });
        }

        let order = Order::market(self.allocate_order_id(), side, quantity, self.allocate_sequence());
        let outcome = self.execute_market(order);
        self.finish(outcome)
    }

    /// Cancel a resting order.
    ///
    /// # Returns
    ///
    /// The order as it was removed, status `Cancelled`
    pub fn cancel(&mut self, order_id: u64) -> Result<Order> {
        self.ensure_healthy()?;
        let outcome = match self.book.remove(order_id) {
            Ok(mut order) => {
                order.set_status(OrderStatus::Cancelled);
                info!(
                    instrument = %self.config.instrument,
                    order_id,
                    price = order.price,
                    remaining = order.remaining,
                    "order cancelled"
                );
                Ok(order)
            }
            Err(BookError::OrderNotFound(id)) => {
                warn!(instrument = %self.config.instrument, order_id = id, "cancel rejected: order not found");
                return Err(BookError::OrderNotFound(id));
            }
            Err(err) => Err(err),
        };
        self.finish(outcome)
    }

    /// Change a resting order's remaining quantity.
    ///
    /// Shrinking keeps the order's place in the queue. Growing moves it to
    /// the back of its level with a fresh arrival sequence, so added size
    /// never jumps ahead of orders that were already waiting.
    pub fn amend(&mut self, order_id: u64, new_quantity: u64) -> Result<Order> {
        self.ensure_healthy()?;
        self.check_quantity(new_quantity)?;

        let Some((side, current, filled)) = self
            .book
            .get(order_id)
            .map(|order| (order.side(), order.remaining, order.filled_quantity()))
        else {
            warn!(instrument = %self.config.instrument, order_id, "amend rejected: order not found");
            return Err(BookError::OrderNotFound(order_id));
        };

        let outcome = if new_quantity < current {
            self.book.shrink(order_id, new_quantity)
        } else if new_quantity > current {
            let fits = filled.checked_add(new_quantity).is_some()
                && self.book.side(side).has_room_for(new_quantity - current);
            if !fits {
                warn!(
                    instrument = %self.config.instrument,
                    order_id,
                    from = current,
                    to = new_quantity,
                    "amend rejected: quantity overflows"
                );
                return Err(BookError::InvalidQuantity);
            }
            let sequence = self.allocate_sequence();
            self.book.requeue(order_id, new_quantity, sequence)
        } else {
            return self.book.get(order_id).cloned().ok_or(BookError::OrderNotFound(order_id));
        };

        if let Ok(order) = &outcome {
            info!(
                instrument = %self.config.instrument,
                order_id,
                from = current,
                to = order.remaining,
                requeued = new_quantity > current,
                "order amended"
            );
        }
        self.finish(outcome)
    }

    /// Drop every resting order and clear a latched fault.
    ///
    /// Id and sequence counters keep running so ids are never reused.
    pub fn clear(&mut self) {
        self.book.clear();
        self.fault = None;
        info!(instrument = %self.config.instrument, "book cleared");
    }

    fn execute_limit(&mut self, mut order: Order) -> Result<PlaceResult> {
        let limit = order.price;
        let matches = self.walk(&mut order, Some(limit))?;

        let resting = order.remaining;
        if resting > 0 {
            self.book.insert(order.clone())?;
            debug!(
                instrument = %self.config.instrument,
                order_id = order.id,
                side = ?order.side(),
                price = limit,
                remaining = resting,
                "order resting"
            );
        }

        Ok(PlaceResult {
            order_id: order.id,
            side: order.side(),
            order_type: OrderType::Limit,
            price: Some(limit),
            status: order.status(),
            matches,
            resting,
        })
    }

    fn execute_market(&mut self, mut order: Order) -> Result<PlaceResult> {
        let matches = self.walk(&mut order, None)?;
        if order.remaining > 0 {
            return Err(BookError::invariant(format!(
                "market order {} left {} unfilled after liquidity check",
                order.id, order.remaining
            )));
        }

        Ok(PlaceResult {
            order_id: order.id,
            side: order.side(),
            order_type: OrderType::Market,
            price: None,
            status: order.status(),
            matches,
            resting: 0,
        })
    }

    /// Consume the opposite side best-first until the taker is filled or
    /// the next level is outside `limit`.
    fn walk(&mut self, taker: &mut Order, limit: Option<u64>) -> Result<Vec<Match>> {
        let taker_side = taker.side();
        let maker_side = taker_side.opposite();
        let mut matches = Vec::new();

        while taker.remaining > 0 {
            let Some(best) = self.book.side(maker_side).best_price() else {
                break;
            };
            if limit.is_some_and(|limit| !taker_side.accepts(best, limit)) {
                break;
            }

            let Some(fill) = self.book.fill_best(maker_side, taker.remaining)? else {
                break;
            };
            if fill.quantity == 0 {
                return Err(BookError::invariant(format!(
                    "order {} at {} filled nothing",
                    fill.maker_order_id, fill.price
                )));
            }
            taker.fill(fill.quantity);

            let m = Match::new(
                self.allocate_match_sequence(),
                fill.maker_order_id,
                taker.id,
                taker_side,
                fill.price,
                fill.quantity,
            );
            debug!(
                instrument = %self.config.instrument,
                sequence = m.sequence,
                maker = m.maker_order_id,
                taker = m.taker_order_id,
                price = m.price,
                qty = m.quantity,
                "matched"
            );
            matches.push(m);
        }

        Ok(matches)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn best_bid(&self) -> Option<u64> {
        self.book.best_bid()
    }

    pub fn best_ask(&self) -> Option<u64> {
        self.book.best_ask()
    }

    pub fn spread(&self) -> Option<u64> {
        self.book.spread()
    }

    pub fn depth_snapshot(&self) -> DepthSnapshot {
        self.book.depth()
    }

    pub fn total_volume(&self, side: Side) -> u64 {
        self.book.total_volume(side)
    }

    pub fn level_volume(&self, side: Side, price: u64) -> u64 {
        self.book.level_volume(side, price)
    }

    /// Copy of a resting order
    pub fn order(&self, order_id: u64) -> Option<Order> {
        self.book.get(order_id).cloned()
    }

    pub fn order_count(&self) -> usize {
        self.book.order_count()
    }

    pub fn bid_levels(&self) -> usize {
        self.book.bid_levels()
    }

    pub fn ask_levels(&self) -> usize {
        self.book.ask_levels()
    }

    pub fn peek_next_order_id(&self) -> u64 {
        self.next_order_id
    }

    pub fn state_root(&self) -> Result<[u8; 32]> {
        self.book.state_root()
    }

    /// Full consistency audit of the book.
    pub fn verify(&self) -> Result<()> {
        invariants::audit(&self.book)
    }

    /// The latched fatal error, if any.
    pub fn fault(&self) -> Option<&BookError> {
        self.fault.as_ref()
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn ensure_healthy(&self) -> Result<()> {
        match &self.fault {
            Some(fault) => Err(fault.clone()),
            None => Ok(()),
        }
    }

    fn check_quantity(&self, quantity: u64) -> Result<()> {
        if quantity == 0 {
            warn!(instrument = %self.config.instrument, "rejected: zero quantity");
            return Err(BookError::InvalidQuantity);
        }
        Ok(())
    }

    /// Reject a limit order whose unmatched part could not rest without
    /// overflowing its side's total volume.
    fn check_room(&self, side: Side, price: u64, quantity: u64) -> Result<()> {
        let own = self.book.side(side);
        if own.has_room_for(quantity) {
            return Ok(());
        }
        let crossing = self.book.side(side.opposite()).available_within(price, quantity);
        if own.has_room_for(quantity - crossing) {
            return Ok(());
        }
        warn!(
            instrument = %self.config.instrument,
            ?side,
            quantity,
            resting = own.total_volume(),
            "limit order rejected: side volume would overflow"
        );
        Err(BookError::InvalidQuantity)
    }

    /// Audit if configured, and latch fatal errors.
    fn finish<T>(&mut self, outcome: Result<T>) -> Result<T> {
        let outcome = outcome.and_then(|value| {
            if self.config.verify_invariants {
                self.verify()?;
            }
            Ok(value)
        });

        if let Err(err) = &outcome {
            if err.is_fatal() {
                error!(
                    instrument = %self.config.instrument,
                    %err,
                    "book state corrupt, refusing further mutations"
                );
                self.fault = Some(err.clone());
            }
        }
        outcome
    }

    fn allocate_order_id(&mut self) -> u64 {
        let id = self.next_order_id;
        self.next_order_id += 1;
        id
    }

    fn allocate_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    fn allocate_match_sequence(&mut self) -> u64 {
        let sequence = self.next_match_sequence;
        self.next_match_sequence += 1;
        sequence
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
