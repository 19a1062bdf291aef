use thiserror::Error;

/// Ethereum codec errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EthError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unsupported ABI type: {0}")]
    UnsupportedType(String),

    #[error("malformed data: {0}")]
    MalformedData(String),
}
