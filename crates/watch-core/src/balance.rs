use chain_eth::hexstr::parse_quantity;
use chain_eth::{Address, Amount};
use eth_rpc::methods::{self, ETH_GET_BALANCE};
use eth_rpc::{BlockTag, Transport};
use tracing::instrument;

use crate::error::{malformed, QueryError};

/// Native ETH balance of `address` at the latest block, scaled to ether.
#[instrument(skip_all, fields(address = %address))]
pub async fn eth_balance<T: Transport + ?Sized>(
    transport: &T,
    address: &Address,
) -> Result<Amount, QueryError> {
    let raw = methods::get_balance(transport, address, BlockTag::Latest).await?;
    let wei = parse_quantity(&raw).map_err(malformed(ETH_GET_BALANCE, &raw))?;
    Ok(Amount::from_wei(wei))
}
