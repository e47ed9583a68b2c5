//! Per-instrument book configuration.
//!
//! Deserializable so a host process can embed it in its own config file:
//!
//! ```
//! use limit_book::BookConfig;
//!
//! let config = BookConfig::new("BTC-USD").with_capacity(50_000);
//! assert_eq!(config.instrument, "BTC-USD");
//! assert_eq!(config.order_capacity, 50_000);
//! ```

use serde::Deserialize;

/// Default number of pre-allocated order slots.
pub const DEFAULT_ORDER_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Instrument symbol, used in log fields.
    pub instrument: String,

    /// Pre-sizes the order arena and the order index.
    pub order_capacity: usize,

    /// Run a full invariant audit after every mutation.
    /// O(n) per operation; on by default in debug builds only.
    pub verify_invariants: bool,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            instrument: "default".to_string(),
            order_capacity: DEFAULT_ORDER_CAPACITY,
            verify_invariants: cfg!(debug_assertions),
        }
    }
}

impl BookConfig {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            ..Self::default()
        }
    }

    pub fn with_capacity(mut self, order_capacity: usize) -> Self {
        self.order_capacity = order_capacity;
        self
    }

    pub fn with_verification(mut self, verify_invariants: bool) -> Self {
        self.verify_invariants = verify_invariants;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BookConfig::default();
        assert_eq!(config.instrument, "default");
        assert_eq!(config.order_capacity, DEFAULT_ORDER_CAPACITY);
        assert_eq!(config.verify_invariants, cfg!(debug_assertions));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: BookConfig =
            serde_json::from_str(r#"{ "instrument": "ETH-USD", "verify_invariants": true }"#)
                .expect("valid config");
        assert_eq!(config.instrument, "ETH-USD");
        assert_eq!(config.order_capacity, DEFAULT_ORDER_CAPACITY);
        assert!(config.verify_invariants);
    }
}
