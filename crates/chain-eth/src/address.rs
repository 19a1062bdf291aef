use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// A 20-byte Ethereum account or contract address.
///
/// Parsing is case-insensitive and never verifies an EIP-55 checksum.
/// The canonical text form is lowercase `0x` followed by 40 hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }

    /// Parses a 0x-prefixed hex address string.
    pub fn parse(address: &str) -> Result<Self, EthError> {
        let hex_str = address
            .strip_prefix("0x")
            .or_else(|| address.strip_prefix("0X"))
            .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))?;

        if hex_str.len() != 40 {
            return Err(EthError::InvalidAddress(format!(
                "expected 40 hex characters, got {}",
                hex_str.len()
            )));
        }

        let bytes = hex::decode(hex_str)
            .map_err(|e| EthError::InvalidAddress(format!("invalid hex: {e}")))?;

        Address::from_slice(&bytes)
    }

    /// Builds an address from exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EthError> {
        let addr: [u8; 20] = bytes.try_into().map_err(|_| {
            EthError::InvalidAddress(format!("expected 20 bytes, got {}", bytes.len()))
        })?;
        Ok(Address(addr))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Renders the EIP-55 mixed-case checksum form, for display only.
    pub fn to_checksum(&self) -> String {
        let hex_part = hex::encode(self.0);

        // EIP-55: hash the lowercase hex address (without 0x).
        let hash = Keccak256::digest(hex_part.as_bytes());

        let mut checksummed = String::with_capacity(42);
        checksummed.push_str("0x");

        for (i, c) in hex_part.chars().enumerate() {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                checksummed.push(c.to_ascii_uppercase());
            } else {
                checksummed.push(c);
            }
        }

        checksummed
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = EthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::parse(&s).map_err(serde::de::Error::custom)
    }
}
