//! Aggregated depth view of the book.
//!
//! A `DepthSnapshot` is an owned, immutable copy taken under the book's
//! serialization point, so it can be handed to market-data consumers
//! without holding any lock.

use crate::types::Side;

/// Aggregate interest at one price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthLevel {
    pub price: u64,
    pub total_volume: u64,
    pub order_count: usize,
}

/// Point-in-time depth for both sides, best price first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthSnapshot {
    /// Bids, highest price first
    pub bids: Vec<DepthLevel>,
    /// Asks, lowest price first
    pub asks: Vec<DepthLevel>,
}

impl DepthSnapshot {
    pub fn levels(&self, side: Side) -> &[DepthLevel] {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    pub fn best_bid(&self) -> Option<u64> {
        self.bids.first().map(|l| l.price)
    }

    pub fn best_ask(&self) -> Option<u64> {
        self.asks.first().map(|l| l.price)
    }

    /// Sum of the side's level volumes, saturating at `u64::MAX`.
    pub fn total_volume(&self, side: Side) -> u64 {
        self.levels(side)
            .iter()
            .fold(0u64, |acc, l| acc.saturating_add(l.total_volume))
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}
