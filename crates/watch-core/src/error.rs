use chain_eth::hexstr::fragment;
use chain_eth::EthError;
use eth_rpc::TransportError;
use thiserror::Error;

/// Failure of a query flow.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The node answered, but the payload does not decode.
    #[error("{method} returned malformed data {fragment}")]
    MalformedData {
        method: &'static str,
        fragment: String,
        #[source]
        source: EthError,
    },

    /// Building the request failed, e.g. an unsupported ABI type.
    #[error(transparent)]
    Codec(#[from] EthError),
}

impl QueryError {
    pub fn is_transport(&self) -> bool {
        matches!(self, QueryError::Transport(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, QueryError::MalformedData { .. })
    }
}

/// Wraps a decode failure with the RPC method and a slice of the raw payload.
///
/// The fragment is only built when the returned closure runs.
pub(crate) fn malformed<'a>(
    method: &'static str,
    payload: &'a str,
) -> impl FnOnce(EthError) -> QueryError + 'a {
    move |source| QueryError::MalformedData {
        method,
        fragment: fragment(payload),
        source,
    }
}
