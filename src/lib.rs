//! # Limit Book
//!
//! Single-instrument limit order book with a price-time priority matching
//! engine.
//!
//! ## Architecture
//!
//! - **Types**: orders, matches, depth snapshots, tick conversion
//! - **OrderBook**: slab-backed FIFO levels per side plus an id index
//! - **Engine**: matching, invariant audit, shared handle and events
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical call sequences produce identical matches
//!    and state roots
//! 2. **No Floating Point**: prices and quantities are integer ticks
//! 3. **Pre-allocated Memory**: slab arena for O(1) order removal
//! 4. **Atomic Operations**: a rejected call changes nothing
//!
//! ## Complexity
//!
//! | Operation | Cost |
//! |-----------|------|
//! | best bid / ask | O(1) |
//! | cancel | O(log L) |
//! | place | O(log L + matches) |
//!
//! where L is the number of price levels on a side.

// ============================================================================
// Module declarations
// ============================================================================

/// Book configuration
pub mod config;

/// Error types
pub mod error;

/// Core data types: Order, Match, DepthSnapshot
pub mod types;

/// Order book storage: slab-backed levels and order index
pub mod orderbook;

/// Matching engine, invariant audit, shared handle
pub mod engine;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::BookConfig;
pub use engine::{BookEvent, EventEnvelope, MatchingEngine, PlaceResult, SharedBook};
pub use error::{BookError, Result};
pub use orderbook::OrderBook;
pub use types::{DepthLevel, DepthSnapshot, Match, Order, OrderStatus, OrderType, Side};
