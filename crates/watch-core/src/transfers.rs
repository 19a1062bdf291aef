//! ERC-20 `Transfer` log queries.

use chain_eth::abi::address_to_topic;
use chain_eth::erc20::{decode_transfer, transfer_topic};
use chain_eth::hexstr::{decode_hex, parse_quantity_u64, parse_word};
use chain_eth::{Address, B256, U256};
use eth_rpc::methods::{self, ETH_BLOCK_NUMBER, ETH_GET_LOGS};
use eth_rpc::{BlockTag, LogEntry, LogFilter, Transport};
use tracing::{debug, instrument};

use crate::error::{malformed, QueryError};

/// A decoded token transfer, with the log's position when the node gave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub block_number: Option<u64>,
    pub log_index: Option<u64>,
    pub transaction_hash: Option<B256>,
}

/// Parameters for [`recent_transfers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferQuery {
    /// Maximum number of records returned.
    pub limit: usize,
    /// Blocks scanned by the first `eth_getLogs` request.
    pub initial_window: u64,
    /// The window doubles up to this many blocks.
    pub max_window: u64,
    /// Only transfers to this address (topics[2]).
    pub recipient: Option<Address>,
}

impl Default for TransferQuery {
    fn default() -> Self {
        TransferQuery {
            limit: 50,
            initial_window: 100,
            max_window: 10_000,
            recipient: None,
        }
    }
}

/// Builds the `eth_getLogs` filter for `Transfer` events of `contract`.
pub fn transfer_filter(
    contract: &Address,
    from_block: BlockTag,
    to_block: BlockTag,
    recipient: Option<&Address>,
) -> LogFilter {
    let filter = LogFilter::new(*contract)
        .from_block(from_block)
        .to_block(to_block)
        .topic(Some(transfer_topic()));

    match recipient {
        Some(to) => filter.topic(None).topic(Some(address_to_topic(to))),
        None => filter,
    }
}

/// Decodes one `eth_getLogs` entry into a [`TransferRecord`].
pub fn decode_transfer_log(log: &LogEntry) -> Result<TransferRecord, QueryError> {
    let topics = log
        .topics
        .iter()
        .map(|t| parse_word(t).map_err(malformed(ETH_GET_LOGS, t)))
        .collect::<Result<Vec<_>, _>>()?;
    let data = decode_hex(&log.data).map_err(malformed(ETH_GET_LOGS, &log.data))?;

    let transfer = decode_transfer(&topics, &data).map_err(|e| {
        let payload = format!("topics={:?} data={}", log.topics, log.data);
        malformed(ETH_GET_LOGS, &payload)(e)
    })?;

    let quantity = |raw: &Option<String>| -> Result<Option<u64>, QueryError> {
        raw.as_deref()
            .map(|s| parse_quantity_u64(s).map_err(malformed(ETH_GET_LOGS, s)))
            .transpose()
    };

    Ok(TransferRecord {
        from: transfer.from,
        to: transfer.to,
        value: transfer.value,
        block_number: quantity(&log.block_number)?,
        log_index: quantity(&log.log_index)?,
        transaction_hash: log
            .transaction_hash
            .as_deref()
            .map(|s| parse_word(s).map_err(malformed(ETH_GET_LOGS, s)))
            .transpose()?,
    })
}

/// `Transfer` events of `contract` in the latest block, in node order.
///
/// Any malformed log fails the whole query; no partial list is returned.
#[instrument(skip_all, fields(contract = %contract))]
pub async fn latest_transfers<T: Transport + ?Sized>(
    transport: &T,
    contract: &Address,
) -> Result<Vec<TransferRecord>, QueryError> {
    let filter = transfer_filter(contract, BlockTag::Latest, BlockTag::Latest, None);
    fetch_transfers(transport, &filter).await
}

/// Like [`latest_transfers`], restricted to transfers sent to `recipient`.
#[instrument(skip_all, fields(contract = %contract, recipient = %recipient))]
pub async fn latest_transfers_to<T: Transport + ?Sized>(
    transport: &T,
    contract: &Address,
    recipient: &Address,
) -> Result<Vec<TransferRecord>, QueryError> {
    let filter = transfer_filter(contract, BlockTag::Latest, BlockTag::Latest, Some(recipient));
    fetch_transfers(transport, &filter).await
}

/// Up to `query.limit` of the most recent `Transfer` events of `contract`.
///
/// Scans `[head - window + 1, head]` and doubles the window until enough
/// events are found, `max_window` is reached, or the genesis block is
/// covered. The newest records are kept, in ascending node order.
#[instrument(skip_all, fields(contract = %contract, limit = query.limit))]
pub async fn recent_transfers<T: Transport + ?Sized>(
    transport: &T,
    contract: &Address,
    query: &TransferQuery,
) -> Result<Vec<TransferRecord>, QueryError> {
    if query.limit == 0 {
        return Ok(Vec::new());
    }

    let raw_head = methods::block_number(transport).await?;
    let head = parse_quantity_u64(&raw_head).map_err(malformed(ETH_BLOCK_NUMBER, &raw_head))?;

    let max_window = query.max_window.max(1);
    let mut window = query.initial_window.clamp(1, max_window);

    loop {
        let from = head.saturating_sub(window - 1);
        let filter = transfer_filter(
            contract,
            BlockTag::Number(from),
            BlockTag::Number(head),
            query.recipient.as_ref(),
        );
        let mut records = fetch_transfers(transport, &filter).await?;

        if records.len() >= query.limit || window >= max_window || from == 0 {
            let excess = records.len().saturating_sub(query.limit);
            records.drain(..excess);
            return Ok(records);
        }

        debug!(window, found = records.len(), "widening block window");
        window = window.saturating_mul(2).min(max_window);
    }
}

async fn fetch_transfers<T: Transport + ?Sized>(
    transport: &T,
    filter: &LogFilter,
) -> Result<Vec<TransferRecord>, QueryError> {
    let logs = methods::get_logs(transport, filter).await?;
    debug!(count = logs.len(), "decoding transfer logs");
    logs.iter()
        .filter(|log| {
            if log.removed {
                debug!(tx = ?log.transaction_hash, "skipping log removed by a reorg");
            }
            !log.removed
        })
        .map(decode_transfer_log)
        .collect()
}
