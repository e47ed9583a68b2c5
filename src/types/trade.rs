//! Match record produced when an incoming order executes against a resting one.
//!
//! The engine emits matches and never stores them; consumers (trade
//! confirmation, journaling) take ownership. SSZ-encoded for deterministic
//! journaling.

use ssz_rs::prelude::*;

use crate::error::BookError;
use crate::types::Side;

/// One execution between a maker and a taker.
///
/// ## Price Discovery
///
/// A match always executes at the maker's price, so any price improvement
/// goes to the resting side.
///
/// ## Example
///
/// ```
/// use limit_book::types::{Match, Side};
///
/// let m = Match::new(1, 10, 11, Side::Buy, 20_000, 2);
/// assert_eq!(m.maker_order_id, 10);
/// assert_eq!(m.taker_side(), Side::Buy);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Match {
    /// Engine-wide match sequence, strictly increasing
    pub sequence: u64,

    /// Maker order ID (the resting order)
    pub maker_order_id: u64,

    /// Taker order ID (the incoming order)
    pub taker_order_id: u64,

    /// Taker side as u8 (0=Buy, 1=Sell)
    pub taker_side_raw: u8,

    /// Execution price in ticks, always the maker's price
    pub price: u64,

    /// Executed quantity
    pub quantity: u64,
}

impl Match {
    pub fn new(
        sequence: u64,
        maker_order_id: u64,
        taker_order_id: u64,
        taker_side: Side,
        price: u64,
        quantity: u64,
    ) -> Self {
        Self {
            sequence,
            maker_order_id,
            taker_order_id,
            taker_side_raw: taker_side.to_u8(),
            price,
            quantity,
        }
    }

    pub fn taker_side(&self) -> Side {
        Side::from_u8(self.taker_side_raw).unwrap_or(Side::Buy)
    }

    pub fn encode(&self) -> crate::error::Result<Vec<u8>> {
        ssz_rs::serialize(self).map_err(|err| BookError::Encoding(format!("{err:?}")))
    }

    pub fn decode(bytes: &[u8]) -> crate::error::Result<Self> {
        ssz_rs::deserialize(bytes).map_err(|err| BookError::Encoding(format!("{err:?}")))
    }
}
