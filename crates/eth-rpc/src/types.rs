use std::fmt;

use chain_eth::hexstr::encode_hex;
use chain_eth::{Address, B256};
use serde::{Deserialize, Serialize, Serializer};

/// A block reference accepted by `eth_getLogs`, `eth_getBalance` and `eth_call`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockTag {
    Earliest,
    #[default]
    Latest,
    Pending,
    Number(u64),
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockTag::Earliest => f.write_str("earliest"),
            BlockTag::Latest => f.write_str("latest"),
            BlockTag::Pending => f.write_str("pending"),
            BlockTag::Number(n) => write!(f, "{n:#x}"),
        }
    }
}

impl Serialize for BlockTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Filter object for `eth_getLogs`.
///
/// `topics` is positional: `None` matches any value at that position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub from_block: BlockTag,
    pub to_block: BlockTag,
    pub address: Address,
    pub topics: Vec<Option<B256>>,
}

impl LogFilter {
    /// A filter on `address` covering only the latest block, with no topics.
    pub fn new(address: Address) -> Self {
        LogFilter {
            from_block: BlockTag::Latest,
            to_block: BlockTag::Latest,
            address,
            topics: Vec::new(),
        }
    }

    pub fn from_block(mut self, block: BlockTag) -> Self {
        self.from_block = block;
        self
    }

    pub fn to_block(mut self, block: BlockTag) -> Self {
        self.to_block = block;
        self
    }

    /// Appends the next positional topic.
    pub fn topic(mut self, topic: Option<B256>) -> Self {
        self.topics.push(topic);
        self
    }
}

/// A log as returned by the node. Hex fields are kept raw until decoded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
    #[serde(default)]
    pub block_number: Option<String>,
    #[serde(default)]
    pub log_index: Option<String>,
    #[serde(default)]
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub removed: bool,
}

/// Message call object for `eth_call`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    pub data: String,
}

impl CallRequest {
    /// A call to `to` with no sender.
    pub fn new(to: Address, data: &[u8]) -> Self {
        CallRequest {
            from: None,
            to,
            data: encode_hex(data),
        }
    }
}
