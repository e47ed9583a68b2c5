//! Fixed-point price and quantity conversion.
//!
//! The book works purely in integer ticks (`u64`). Host layers that receive
//! human prices ("50000.25") or floats convert them here first; anything
//! negative, non-finite or out of range is rejected with `InvalidPrice`.
//!
//! ## Scale Factor
//!
//! A scale factor of 10^8 gives 8 decimal places.
//!
//! ```
//! use limit_book::types::price::{to_fixed, from_fixed};
//!
//! let price = to_fixed("50000.12345678").unwrap();
//! assert_eq!(price, 5_000_012_345_678);
//! assert_eq!(from_fixed(price), "50000.12345678");
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::error::{BookError, Result};

/// Scaling factor for fixed-point arithmetic: 10^8
pub const SCALE: u64 = 100_000_000;

/// Convert a decimal string to fixed-point u64
///
/// Returns `None` if parsing fails, the value is negative or out of range.
///
/// ```
/// use limit_book::types::price::to_fixed;
///
/// assert_eq!(to_fixed("1.0"), Some(100_000_000));
/// assert_eq!(to_fixed("0.00000001"), Some(1));
/// assert_eq!(to_fixed("-1"), None);
/// ```
pub fn to_fixed(s: &str) -> Option<u64> {
    let decimal = Decimal::from_str(s).ok()?;
    decimal_to_fixed(decimal)
}

/// Convert a Decimal to fixed-point u64, `None` if negative or out of range
pub fn decimal_to_fixed(d: Decimal) -> Option<u64> {
    if d.is_sign_negative() {
        return None;
    }

    let scaled = d.checked_mul(Decimal::from(SCALE))?;
    scaled.round_dp(0).to_u64()
}

pub fn fixed_to_decimal(value: u64) -> Decimal {
    Decimal::from(value) / Decimal::from(SCALE)
}

/// Convert fixed-point u64 to a string with 8 decimal places
pub fn from_fixed(value: u64) -> String {
    format!("{:.8}", fixed_to_decimal(value))
}

/// Reject a zero tick price.
pub fn validate_price(ticks: u64) -> Result<u64> {
    if ticks == 0 {
        return Err(BookError::InvalidPrice("price must be greater than zero".to_string()));
    }
    Ok(ticks)
}

/// Parse a decimal price string into positive ticks.
pub fn parse_price(s: &str) -> Result<u64> {
    let ticks = to_fixed(s).ok_or_else(|| BookError::InvalidPrice(format!("cannot parse {s:?}")))?;
    validate_price(ticks)
}

/// Convert a float price into positive ticks.
///
/// NaN and infinities are rejected rather than saturated.
pub fn price_from_f64(value: f64) -> Result<u64> {
    if !value.is_finite() {
        return Err(BookError::InvalidPrice(format!("non-finite price {value}")));
    }
    let decimal = Decimal::from_f64(value)
        .ok_or_else(|| BookError::InvalidPrice(format!("out of range: {value}")))?;
    let ticks = decimal_to_fixed(decimal)
        .ok_or_else(|| BookError::InvalidPrice(format!("negative or out of range: {value}")))?;
    validate_price(ticks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_fixed_basic() {
        assert_eq!(to_fixed("1"), Some(100_000_000));
        assert_eq!(to_fixed("0.5"), Some(50_000_000));
        assert_eq!(to_fixed("50000.12345678"), Some(5_000_012_345_678));
        assert_eq!(to_fixed("abc"), None);
        assert_eq!(to_fixed(""), None);
    }

    #[test]
    fn test_from_fixed() {
        assert_eq!(from_fixed(100_000_000), "1.00000000");
        assert_eq!(from_fixed(1), "0.00000001");
        assert_eq!(from_fixed(0), "0.00000000");
    }

    #[test]
    fn test_parse_price_rejects_zero_and_negative() {
        assert_eq!(parse_price("200.5"), Ok(20_050_000_000));
        assert!(matches!(parse_price("0"), Err(BookError::InvalidPrice(_))));
        assert!(matches!(parse_price("-3"), Err(BookError::InvalidPrice(_))));
        assert!(matches!(parse_price("ten"), Err(BookError::InvalidPrice(_))));
    }

    #[test]
    fn test_price_from_f64() {
        assert_eq!(price_from_f64(1.5), Ok(150_000_000));
        assert!(matches!(price_from_f64(f64::NAN), Err(BookError::InvalidPrice(_))));
        assert!(matches!(price_from_f64(f64::INFINITY), Err(BookError::InvalidPrice(_))));
        assert!(matches!(price_from_f64(-1.0), Err(BookError::InvalidPrice(_))));
        assert!(matches!(price_from_f64(0.0), Err(BookError::InvalidPrice(_))));
    }

    #[test]
    fn test_precision() {
        let value = "123456789.12345678";
        assert_eq!(from_fixed(to_fixed(value).unwrap()), value);
    }
}
