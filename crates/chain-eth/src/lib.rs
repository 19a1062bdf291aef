//! Ethereum primitives for the token watcher.
//!
//! This crate provides:
//! - A case-insensitive 20-byte address type (with EIP-55 rendering for display)
//! - Minimal ABI encoding for static-type function calls and event topics
//! - ERC-20 call encoding and `Transfer` log decoding
//! - Exact decimal formatting of wei and token base units
//! - Hex helpers for JSON-RPC `DATA` and `QUANTITY` strings

pub mod abi;
pub mod address;
pub mod erc20;
pub mod error;
pub mod hexstr;
pub mod units;

pub use address::Address;
pub use alloy_primitives::{B256, U256};
pub use error::EthError;
pub use units::Amount;
