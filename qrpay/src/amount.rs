//! Human-readable amount parsing and smallest-unit conversion.
//!
//! Amounts arrive as decimal strings in whole-token units (`"0.05"` ETH) and
//! are converted to base-10 integer strings in the token's smallest unit
//! (`"50000000000000000"` wei). Parsing is exact decimal arithmetic and
//! scaling is 256-bit integer arithmetic; no floating point is involved.

use std::str::FromStr;

use alloy_primitives::U256;
use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// Parses a decimal amount as written by the user (`"1"`, `"0.5"`, `".5"`).
///
/// # Errors
///
/// Returns [`Error::InvalidAmount`] if the string is not a non-negative
/// decimal number representable by [`Decimal`].
pub fn parse_amount(amount: &str) -> Result<Decimal> {
    let normalized = if amount.starts_with('.') {
        format!("0{amount}")
    } else {
        amount.to_owned()
    };
    let value = Decimal::from_str(&normalized)
        .map_err(|e| Error::InvalidAmount(format!("{amount}: {e}")))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(Error::InvalidAmount(format!("{amount}: must not be negative")));
    }
    Ok(value)
}

/// Converts a whole-token amount to its smallest-unit integer string:
/// `round(amount × 10^decimals)`, rounding half away from zero.
///
/// The scaled value is computed in 256-bit integer arithmetic, so any amount
/// that fits an EVM `uint256` is representable.
///
/// # Errors
///
/// Returns [`Error::InvalidAmount`] if the amount does not parse or the
/// scaled value exceeds 256 bits.
pub fn to_smallest_unit(amount: &str, decimals: u8) -> Result<String> {
    let value = parse_amount(amount)?.normalize();
    let mantissa = U256::from(value.mantissa().unsigned_abs());
    let scale = value.scale();
    let decimals = u32::from(decimals);
    let overflow = || Error::InvalidAmount(format!("{amount} overflows at {decimals} decimals"));

    let scaled = if decimals >= scale {
        pow10(decimals - scale)
            .and_then(|factor| mantissa.checked_mul(factor))
            .ok_or_else(overflow)?
    } else {
        let divisor = pow10(scale - decimals).ok_or_else(overflow)?;
        let (quotient, remainder) = (mantissa / divisor, mantissa % divisor);
        if remainder * U256::from(2u8) >= divisor {
            quotient + U256::from(1u8)
        } else {
            quotient
        }
    };
    Ok(scaled.to_string())
}

fn pow10(exp: u32) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(exp))
}

/// Truncates a whole-token amount to its integer part (`"1.9"` → `"1"`).
///
/// # Errors
///
/// Returns [`Error::InvalidAmount`] if the amount does not parse.
pub fn to_whole_units(amount: &str) -> Result<String> {
    Ok(parse_amount(amount)?.trunc().normalize().to_string())
}
