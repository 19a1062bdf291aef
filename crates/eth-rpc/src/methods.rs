//! Typed wrappers for the `eth_*` methods the watcher uses.
//!
//! These only shape the JSON; hex strings in results are returned as-is for
//! the codec to interpret.

use chain_eth::Address;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::TransportError;
use crate::transport::Transport;
use crate::types::{BlockTag, CallRequest, LogEntry, LogFilter};

pub const ETH_BLOCK_NUMBER: &str = "eth_blockNumber";
pub const ETH_GET_LOGS: &str = "eth_getLogs";
pub const ETH_GET_BALANCE: &str = "eth_getBalance";
pub const ETH_CALL: &str = "eth_call";

fn from_result<R: DeserializeOwned>(method: &str, result: Value) -> Result<R, TransportError> {
    serde_json::from_value(result).map_err(|source| TransportError::UnexpectedResult {
        method: method.to_string(),
        source,
    })
}

/// `eth_blockNumber`: the head block as a hex quantity.
pub async fn block_number<T: Transport + ?Sized>(transport: &T) -> Result<String, TransportError> {
    let result = transport.send(ETH_BLOCK_NUMBER, Vec::new()).await?;
    from_result(ETH_BLOCK_NUMBER, result)
}

/// `eth_getLogs`: logs matching `filter`, in node order. A `null` result is
/// treated as no logs.
pub async fn get_logs<T: Transport + ?Sized>(
    transport: &T,
    filter: &LogFilter,
) -> Result<Vec<LogEntry>, TransportError> {
    let result = transport.send(ETH_GET_LOGS, vec![json!(filter)]).await?;
    let logs: Option<Vec<LogEntry>> = from_result(ETH_GET_LOGS, result)?;
    Ok(logs.unwrap_or_default())
}

/// `eth_getBalance`: the wei balance of `address` as a hex quantity.
pub async fn get_balance<T: Transport + ?Sized>(
    transport: &T,
    address: &Address,
    block: BlockTag,
) -> Result<String, TransportError> {
    let result = transport
        .send(ETH_GET_BALANCE, vec![json!(address), json!(block)])
        .await?;
    from_result(ETH_GET_BALANCE, result)
}

/// `eth_call`: the raw return data of a message call as hex.
pub async fn call<T: Transport + ?Sized>(
    transport: &T,
    request: &CallRequest,
    block: BlockTag,
) -> Result<String, TransportError> {
    let result = transport
        .send(ETH_CALL, vec![json!(request), json!(block)])
        .await?;
    from_result(ETH_CALL, result)
}
