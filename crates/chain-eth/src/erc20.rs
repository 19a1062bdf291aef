use alloy_primitives::{B256, U256};

use crate::abi::{
    decode_topic_address, decode_uint256, encode_function_call, event_signature_hash, AbiValue,
};
use crate::address::Address;
use crate::error::EthError;

/// Function signature for `balanceOf(address)`: selector `0x70a08231`.
pub const BALANCE_OF_SIGNATURE: &str = "balanceOf(address)";

/// Function signature for `decimals()`: selector `0x313ce567`.
pub const DECIMALS_SIGNATURE: &str = "decimals()";

/// Event name and parameter types of `Transfer(address,address,uint256)`.
pub const TRANSFER_EVENT: (&str, [&str; 3]) = ("Transfer", ["address", "address", "uint256"]);

/// A decoded ERC-20 `Transfer` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

/// The `Transfer` event signature hash, topics[0] of every transfer log.
pub fn transfer_topic() -> B256 {
    let (name, params) = TRANSFER_EVENT;
    event_signature_hash(name, &params)
}

/// Encodes an ERC-20 `balanceOf(address)` call.
///
/// # Returns
///
/// The complete calldata (4-byte selector + 32 bytes of ABI-encoded address).
pub fn encode_balance_of(owner: &Address) -> Result<Vec<u8>, EthError> {
    encode_function_call(BALANCE_OF_SIGNATURE, &[AbiValue::Address(*owner)])
}

/// Encodes an ERC-20 `decimals()` call (selector only).
pub fn encode_decimals() -> Result<Vec<u8>, EthError> {
    encode_function_call(DECIMALS_SIGNATURE, &[])
}

/// Decodes the `uint8` returned by `decimals()`.
pub fn decode_decimals(data: &[u8]) -> Result<u8, EthError> {
    let value = decode_uint256(data)?;
    u8::try_from(value)
        .map_err(|_| EthError::MalformedData(format!("decimals value {value} exceeds uint8")))
}

/// Decodes a `Transfer(address indexed from, address indexed to, uint256 value)`
/// log from its topics and data.
pub fn decode_transfer(topics: &[B256], data: &[u8]) -> Result<Transfer, EthError> {
    if topics.len() < 3 {
        return Err(EthError::MalformedData(format!(
            "transfer log needs 3 topics, got {}",
            topics.len()
        )));
    }

    if topics[0] != transfer_topic() {
        return Err(EthError::MalformedData(format!(
            "topic {} is not the Transfer signature",
            topics[0]
        )));
    }

    Ok(Transfer {
        from: decode_topic_address(&topics[1]),
        to: decode_topic_address(&topics[2]),
        value: decode_uint256(data)?,
    })
}
