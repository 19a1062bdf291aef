//! ERC-20 balance queries via `eth_call`.

use chain_eth::abi::decode_uint256;
use chain_eth::erc20::{decode_decimals, encode_balance_of, encode_decimals};
use chain_eth::hexstr::decode_hex;
use chain_eth::{Address, Amount, U256};
use eth_rpc::methods::{self, ETH_CALL};
use eth_rpc::{BlockTag, CallRequest, Transport};
use tracing::{debug, instrument};

use crate::error::{malformed, QueryError};

/// Scaling used by [`token_balance`] regardless of the token's own decimals.
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

/// Token balance of `owner`, scaled by a fixed 10^18.
///
/// Tokens that declare other decimals (USDC uses 6) come out mis-scaled;
/// use [`token_balance_scaled`] for those.
#[instrument(skip_all, fields(contract = %contract, owner = %owner))]
pub async fn token_balance<T: Transport + ?Sized>(
    transport: &T,
    contract: &Address,
    owner: &Address,
) -> Result<Amount, QueryError> {
    let raw = balance_of(transport, contract, owner).await?;
    Ok(Amount::new(raw, DEFAULT_TOKEN_DECIMALS))
}

/// The token's `decimals()` value.
#[instrument(skip_all, fields(contract = %contract))]
pub async fn token_decimals<T: Transport + ?Sized>(
    transport: &T,
    contract: &Address,
) -> Result<u8, QueryError> {
    let data = call(transport, contract, &encode_decimals()?).await?;
    let bytes = decode_hex(&data).map_err(malformed(ETH_CALL, &data))?;
    decode_decimals(&bytes).map_err(malformed(ETH_CALL, &data))
}

/// Token balance of `owner`, scaled by the token's own `decimals()`.
#[instrument(skip_all, fields(contract = %contract, owner = %owner))]
pub async fn token_balance_scaled<T: Transport + ?Sized>(
    transport: &T,
    contract: &Address,
    owner: &Address,
) -> Result<Amount, QueryError> {
    let decimals = token_decimals(transport, contract).await?;
    debug!(decimals, "token decimals resolved");
    let raw = balance_of(transport, contract, owner).await?;
    Ok(Amount::new(raw, decimals))
}

/// Raw `balanceOf(owner)` in token base units.
pub async fn balance_of<T: Transport + ?Sized>(
    transport: &T,
    contract: &Address,
    owner: &Address,
) -> Result<U256, QueryError> {
    let data = call(transport, contract, &encode_balance_of(owner)?).await?;
    let bytes = decode_hex(&data).map_err(malformed(ETH_CALL, &data))?;
    decode_uint256(&bytes).map_err(malformed(ETH_CALL, &data))
}

async fn call<T: Transport + ?Sized>(
    transport: &T,
    contract: &Address,
    calldata: &[u8],
) -> Result<String, QueryError> {
    let request = CallRequest::new(*contract, calldata);
    Ok(methods::call(transport, &request, BlockTag::Latest).await?)
}
