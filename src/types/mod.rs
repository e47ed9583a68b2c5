//! Core data types for the order book
//!
//! Prices are integer ticks and quantities integer lots (`u64`).
//! `Order` and `Match` implement SSZ serialization for deterministic encoding.
//!
//! ## Types
//!
//! - [`Order`]: A limit or market order
//! - [`Side`]: Buy or Sell
//! - [`OrderType`]: Limit or Market
//! - [`OrderStatus`]: Resting, Filled or Cancelled
//! - [`Match`]: An execution between a maker and a taker
//! - [`DepthSnapshot`]: Aggregated volume per price level

mod order;
mod trade;
mod depth;
pub mod price;

pub use order::{Order, OrderStatus, OrderType, Side};
pub use trade::Match;
pub use depth::{DepthLevel, DepthSnapshot};
