//! Hex string helpers for JSON-RPC payloads.
//!
//! Byte strings (`DATA`) are even-length hex; integers (`QUANTITY`) are
//! `0x`-prefixed hex without leading-zero padding.

use alloy_primitives::{B256, U256};

use crate::error::EthError;

/// Longest slice of a raw payload quoted back in error messages.
const FRAGMENT_LEN: usize = 74;

/// Returns a short prefix of `payload` suitable for error context.
pub fn fragment(payload: &str) -> String {
    if payload.len() <= FRAGMENT_LEN {
        return payload.to_string();
    }
    let mut end = FRAGMENT_LEN;
    while !payload.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &payload[..end])
}

/// Renders bytes as a `0x`-prefixed lowercase hex string.
pub fn encode_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decodes a JSON-RPC `DATA` string. The `0x` prefix is required.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, EthError> {
    let digits = s.strip_prefix("0x").ok_or_else(|| {
        EthError::MalformedData(format!("data {} is missing 0x prefix", fragment(s)))
    })?;
    hex::decode(digits)
        .map_err(|e| EthError::MalformedData(format!("invalid hex payload {}: {e}", fragment(s))))
}

/// Decodes a 32-byte word such as a log topic.
pub fn parse_word(s: &str) -> Result<B256, EthError> {
    let bytes = decode_hex(s)?;
    if bytes.len() != 32 {
        return Err(EthError::MalformedData(format!(
            "expected 32-byte word, got {} bytes",
            bytes.len()
        )));
    }
    Ok(B256::from_slice(&bytes))
}

/// Parses a JSON-RPC `QUANTITY` such as `0xde0b6b3a7640000`.
pub fn parse_quantity(s: &str) -> Result<U256, EthError> {
    let digits = s.strip_prefix("0x").ok_or_else(|| {
        EthError::MalformedData(format!("quantity {} is missing 0x prefix", fragment(s)))
    })?;
    if digits.is_empty() {
        return Err(EthError::MalformedData("empty quantity".into()));
    }
    // from_str_radix skips `_` separators
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(EthError::MalformedData(format!("quantity {} is not hex", fragment(s))));
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| EthError::MalformedData(format!("invalid quantity {}: {e}", fragment(s))))
}

/// Parses a `QUANTITY` that must fit in a `u64`, e.g. a block number.
pub fn parse_quantity_u64(s: &str) -> Result<u64, EthError> {
    let value = parse_quantity(s)?;
    u64::try_from(value)
        .map_err(|_| EthError::MalformedData(format!("quantity {} exceeds u64", fragment(s))))
}
