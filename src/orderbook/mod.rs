//! Order book storage for a single instrument.
//!
//! ## Components
//!
//! - [`OrderNode`]: order plus FIFO links, stored in a slab arena
//! - [`PriceLevel`]: FIFO queue and aggregate volume at one price
//! - [`BookSide`]: price levels for one direction, best price cached
//! - [`OrderIndex`]: order id → resting location
//! - [`OrderBook`]: the above wired together
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Rest order | O(log L) |
//! | Cancel by id | O(1) unlink + O(log L) level lookup |
//! | Best bid/ask price | O(1) |
//! | Fill best front | O(log L) |
//!
//! L = number of price levels on the side.

pub mod node;
pub mod level;
pub mod side;
pub mod index;
pub mod book;

pub use node::OrderNode;
pub use level::{FrontFill, LevelIter, PriceLevel};
pub use side::BookSide;
pub use index::{IndexEntry, OrderIndex};
pub use book::OrderBook;
