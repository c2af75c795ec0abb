//! ABI-style uint256 encoding of prices
//!
//! The settlement side reads a single `0x`-prefixed, zero-padded, big-endian
//! 32-byte word in lowercase hex.

use crate::error::{GdaError, Result};
use crate::models::Price;
use alloy_primitives::{hex, U256};

/// Width of the encoded word in bytes
pub const WORD_BYTES: usize = 32;

const MANTISSA_BITS: u32 = 52;
const EXPONENT_BIAS: i32 = 1075; // 1023 + 52

/// Truncates `price` toward zero into a uint256, exactly.
///
/// An `f64` is `m · 2^e` with a 53-bit `m`, so the integer part is a shift of
/// `m`; no decimal formatting is involved.
pub fn to_uint256(price: Price) -> Result<U256> {
    let bits = price.value().to_bits();
    let biased = ((bits >> MANTISSA_BITS) & 0x7ff) as i32;
    if biased == 0 {
        // zero or subnormal, both < 1
        return Ok(U256::ZERO);
    }
    let mantissa = (bits & ((1u64 << MANTISSA_BITS) - 1)) | (1u64 << MANTISSA_BITS);
    let e = biased - EXPONENT_BIAS;
    if e >= 0 {
        // highest set bit lands at 52 + e
        if MANTISSA_BITS as i32 + e >= 256 {
            return Err(GdaError::overflow(format!(
                "price {} does not fit in 256 bits",
                price.value()
            )));
        }
        Ok(U256::from(mantissa) << (e as usize))
    } else if e <= -(MANTISSA_BITS as i32 + 1) {
        Ok(U256::ZERO)
    } else {
        Ok(U256::from(mantissa >> ((-e) as u32)))
    }
}

/// Renders a uint256 as `0x` + 64 lowercase hex digits.
pub fn encode_uint256(value: U256) -> String {
    format!("0x{}", hex::encode(value.to_be_bytes::<WORD_BYTES>()))
}

/// Truncates and renders `price` in one step.
pub fn encode_price(price: Price) -> Result<String> {
    Ok(encode_uint256(to_uint256(price)?))
}

/// Parses a word produced by [`encode_uint256`]; anything but `0x` + 64 hex digits is rejected.
pub fn decode_uint256(s: &str) -> Result<U256> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| GdaError::domain(format!("missing 0x prefix: {s:?}")))?;
    if digits.len() != 2 * WORD_BYTES {
        return Err(GdaError::domain(format!(
            "expected {} hex digits, got {}",
            2 * WORD_BYTES,
            digits.len()
        )));
    }
    let bytes = hex::decode(digits).map_err(|e| GdaError::domain(format!("invalid hex: {e}")))?;
    Ok(U256::from_be_slice(&bytes))
}
