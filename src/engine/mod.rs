//! Matching engine for one instrument.
//!
//! ## Layers
//!
//! | Type | Role |
//! |------|------|
//! | [`MatchingEngine`] | validation, price-time matching, id and sequence assignment |
//! | [`invariants::audit`] | full consistency check of the book |
//! | [`SharedBook`] | `RwLock` handle with ordered event fan-out |
//!
//! ## Determinism
//!
//! The engine holds no clocks and no randomness. Order ids, arrival
//! sequences and match sequences come from counters, so replaying the same
//! calls yields the same matches and the same state root.
//!
//! ## Example
//!
//! ```
//! use limit_book::engine::MatchingEngine;
//! use limit_book::types::{OrderStatus, Side};
//!
//! let mut engine = MatchingEngine::new();
//! engine.place_limit(Side::Sell, 20_000, 5).unwrap();
//! engine.place_limit(Side::Sell, 20_100, 5).unwrap();
//!
//! let result = engine.place_market(Side::Buy, 7).unwrap();
//! assert_eq!(result.status, OrderStatus::Filled);
//! assert_eq!(result.matches.len(), 2);
//! assert_eq!(engine.best_ask(), Some(20_100));
//! assert_eq!(engine.level_volume(Side::Sell, 20_100), 3);
//! ```

pub mod events;
pub mod invariants;
pub mod matcher;
pub mod shared;

pub use events::{BookEvent, EventBus, EventEnvelope};
pub use matcher::{MatchingEngine, PlaceResult};
pub use shared::SharedBook;
