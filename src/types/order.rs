//! Order types for the matching engine.
//!
//! ## SSZ Serialization
//!
//! `Order` derives `SimpleSerialize` from ssz_rs so the persistence
//! collaborator can journal it with a deterministic, fixed-size encoding.
//! Enums are stored as raw `u8` fields for SSZ compatibility.
//!
//! ## Quantities
//!
//! Prices are integer ticks and quantities integer lots (`u64`).
//! A market order carries price `0`; use [`Order::limit_price`].

use ssz_rs::prelude::*;

use crate::error::BookError;

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy or Sell
///
/// Represented as u8 for SSZ compatibility:
/// - Buy = 0
/// - Sell = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Buy order (bid)
    #[default]
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Whether a taker on this side with `limit` accepts a maker at `maker_price`.
    ///
    /// Buy: best ask ≤ limit. Sell: best bid ≥ limit.
    #[inline]
    pub fn accepts(self, maker_price: u64, limit: u64) -> bool {
        match self {
            Side::Buy => maker_price <= limit,
            Side::Sell => maker_price >= limit,
        }
    }
}

// ============================================================================
// OrderType enum
// ============================================================================

/// Limit orders may rest; market orders fill immediately or are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderType {
    #[default]
    Limit,
    Market,
}

impl OrderType {
    pub fn to_u8(self) -> u8 {
        match self {
            OrderType::Limit => 0,
            OrderType::Market => 1,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(OrderType::Limit),
            1 => Some(OrderType::Market),
            _ => None,
        }
    }
}

// ============================================================================
// OrderStatus enum
// ============================================================================

/// Order lifecycle state.
///
/// ```text
/// Resting --(full match)--> Filled
/// Resting --(cancel)------> Cancelled
/// Resting --(partial)-----> Resting
/// ```
///
/// Filled and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    #[default]
    Resting,
    Filled,
    Cancelled,
}

impl OrderStatus {
    pub fn to_u8(self) -> u8 {
        match self {
            OrderStatus::Resting => 0,
            OrderStatus::Filled => 1,
            OrderStatus::Cancelled => 2,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(OrderStatus::Resting),
            1 => Some(OrderStatus::Filled),
            2 => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Resting)
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// One order: immutable identity plus mutable remaining quantity.
///
/// Invariants: `remaining <= quantity`, and `remaining == 0` exactly when
/// the status is `Filled`.
///
/// ## SSZ Layout
///
/// Fixed-size container, 43 bytes:
/// id(8) + side(1) + type(1) + price(8) + quantity(8) + remaining(8) + sequence(8) + status(1)
///
/// ## Example
///
/// ```
/// use limit_book::types::{Order, OrderStatus, Side};
///
/// let order = Order::limit(1, Side::Buy, 10_000, 5, 1);
/// assert_eq!(order.limit_price(), Some(10_000));
/// assert_eq!(order.status(), OrderStatus::Resting);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Order {
    /// Unique order identifier (assigned by the engine)
    pub id: u64,

    /// Order side as u8 (0=Buy, 1=Sell)
    pub side_raw: u8,

    /// Order type as u8 (0=Limit, 1=Market)
    pub order_type_raw: u8,

    /// Limit price in ticks, 0 for market orders
    pub price: u64,

    /// Original quantity
    pub quantity: u64,

    /// Remaining quantity, decremented as the order is matched
    pub remaining: u64,

    /// Arrival sequence used for time priority
    pub sequence: u64,

    /// Status as u8 (0=Resting, 1=Filled, 2=Cancelled)
    pub status_raw: u8,
}

impl Order {
    /// Create a limit order
    pub fn limit(id: u64, side: Side, price: u64, quantity: u64, sequence: u64) -> Self {
        Self {
            id,
            side_raw: side.to_u8(),
            order_type_raw: OrderType::Limit.to_u8(),
            price,
            quantity,
            remaining: quantity,
            sequence,
            status_raw: OrderStatus::Resting.to_u8(),
        }
    }

    /// Create a market order (no price bound)
    pub fn market(id: u64, side: Side, quantity: u64, sequence: u64) -> Self {
        Self {
            id,
            side_raw: side.to_u8(),
            order_type_raw: OrderType::Market.to_u8(),
            price: 0,
            quantity,
            remaining: quantity,
            sequence,
            status_raw: OrderStatus::Resting.to_u8(),
        }
    }

    pub fn side(&self) -> Side {
        Side::from_u8(self.side_raw).unwrap_or(Side::Buy)
    }

    pub fn order_type(&self) -> OrderType {
        OrderType::from_u8(self.order_type_raw).unwrap_or(OrderType::Limit)
    }

    pub fn status(&self) -> OrderStatus {
        OrderStatus::from_u8(self.status_raw).unwrap_or(OrderStatus::Resting)
    }

    pub fn set_status(&mut self, status: OrderStatus) {
        self.status_raw = status.to_u8();
    }

    /// Price bound, `None` for market orders.
    pub fn limit_price(&self) -> Option<u64> {
        match self.order_type() {
            OrderType::Limit => Some(self.price),
            OrderType::Market => None,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.remaining == 0
    }

    pub fn filled_quantity(&self) -> u64 {
        self.quantity.saturating_sub(self.remaining)
    }

    /// Fill a portion of this order
    ///
    /// Marks the order `Filled` when nothing remains.
    ///
    /// # Returns
    ///
    /// The actual quantity filled (may be less if order doesn't have enough remaining)
    pub fn fill(&mut self, fill_qty: u64) -> u64 {
        let actual_fill = fill_qty.min(self.remaining);
        self.remaining -= actual_fill;
        if self.remaining == 0 {
            self.set_status(OrderStatus::Filled);
        }
        actual_fill
    }

    /// Set a new remaining quantity, keeping the filled portion unchanged.
    ///
    /// `quantity` moves by the same delta so `quantity - remaining` is preserved.
    /// Fails with `InvalidQuantity`, leaving the order as it was, if the new
    /// total would not fit in a `u64`.
    pub fn resize(&mut self, new_remaining: u64) -> crate::error::Result<()> {
        let quantity = self
            .filled_quantity()
            .checked_add(new_remaining)
            .ok_or(BookError::InvalidQuantity)?;
        self.remaining = new_remaining;
        self.quantity = quantity;
        Ok(())
    }

    /// Deterministic SSZ encoding.
    pub fn encode(&self) -> crate::error::Result<Vec<u8>> {
        ssz_rs::serialize(self).map_err(|err| BookError::Encoding(format!("{err:?}")))
    }

    pub fn decode(bytes: &[u8]) -> crate::error::Result<Self> {
        ssz_rs::deserialize(bytes).map_err(|err| BookError::Encoding(format!("{err:?}")))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
