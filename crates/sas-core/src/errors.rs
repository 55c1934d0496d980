//! Error types shared by every SAS crate.
//!
//! Each variant corresponds to one failure class a caller can act on. There is
//! no retry layer anywhere in the workspace: errors surface directly.

use thiserror::Error;

pub type SasResult<T> = Result<T, SasError>;

#[derive(Debug, Error)]
pub enum SasError {
    /// Unknown (chain, network) pair, invalid client config, or a write attempted without a signer.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Object or record absent on-chain.
    #[error("not found: {0}")]
    NotFound(String),

    /// On-chain representation does not match the expected record layout.
    #[error("decode error: {0}")]
    Decode(String),

    /// The registry version pointer has no corresponding table, or went backwards.
    #[error("stale registry version {version}: {detail}")]
    StaleVersion { version: u64, detail: String },

    /// The chain rejected the transaction or it did not finalize.
    #[error("transaction failed: {0}")]
    Transaction(String),

    /// Transport failure or an RPC-level error object.
    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("unsupported on {chain}: {operation}")]
    Unsupported { chain: String, operation: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl SasError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn stale_version(version: u64, detail: impl Into<String>) -> Self {
        Self::StaleVersion {
            version,
            detail: detail.into(),
        }
    }

    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction(msg.into())
    }

    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    pub fn unsupported(chain: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Unsupported {
            chain: chain.into(),
            operation: operation.into(),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Stable short code, useful for CLI/JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::NotFound(_) => "not_found",
            Self::Decode(_) => "decode",
            Self::StaleVersion { .. } => "stale_version",
            Self::Transaction(_) => "transaction",
            Self::Rpc(_) => "rpc",
            Self::Unsupported { .. } => "unsupported",
            Self::InvalidArgument(_) => "invalid_argument",
        }
    }
}

impl From<serde_json::Error> for SasError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
