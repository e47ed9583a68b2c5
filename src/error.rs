//! Error types for the order book.
//!
//! Validation and liquidity errors are returned before any state is touched,
//! so a rejected operation always leaves the book exactly as it was.
//! `InvariantViolation` means internal state is corrupt and is fatal: the
//! engine latches it and refuses further mutations.

use thiserror::Error;

/// Errors returned by book and engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// Quantity was zero.
    #[error("invalid quantity: must be greater than zero")]
    InvalidQuantity,

    /// Price was zero, negative, non-finite or out of range.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// Cancel/amend on an unknown or already terminal order.
    #[error("order not found: {0}")]
    OrderNotFound(u64),

    /// Market order larger than the opposite side's aggregate volume.
    #[error("insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: u64, available: u64 },

    /// Internal state found inconsistent. Never expected in a correct build.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// SSZ encoding or decoding failed.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl BookError {
    /// True for errors that indicate corrupted state.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BookError::InvariantViolation(_))
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        BookError::InvariantViolation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, BookError>;
