//! Read-only ERC-20 and ETH queries over Ethereum JSON-RPC.
//!
//! Each flow takes the transport by reference and owns nothing else, so the
//! flows can run concurrently on separate tasks with no coordination.

pub mod balance;
pub mod error;
pub mod token;
pub mod transfers;

#[cfg(test)]
mod testing;

pub use balance::eth_balance;
pub use error::QueryError;
pub use token::{token_balance, token_balance_scaled, token_decimals, DEFAULT_TOKEN_DECIMALS};
pub use transfers::{
    latest_transfers, latest_transfers_to, recent_transfers, TransferQuery, TransferRecord,
};
