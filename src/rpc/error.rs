//! Error taxonomy for RPC calls

use reqwest::StatusCode;

use super::envelope::RemoteFault;

/// Everything that can go wrong with a single call.
///
/// `Transport`, `Status` and `Malformed` mean the call itself did not make
/// it there and back. `Remote` is the backend saying no. `Decode` means a
/// well-formed result did not have the shape the caller asked for.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("Invalid server URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("rpc transport error calling {method}: {source}")]
    Transport {
        method: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("rpc call {method} timed out")]
    Timeout { method: String },

    #[error("rpc http status {status} calling {method}")]
    Status { method: String, status: StatusCode },

    #[error("malformed rpc response for {method}: {source}")]
    Malformed {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{fault}")]
    Remote { method: String, fault: RemoteFault },

    #[error("unexpected result shape from {method}: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode params for {method}: {source}")]
    Encode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RpcError {
    /// True for failures delivering or receiving the call
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RpcError::Transport { .. }
                | RpcError::Timeout { .. }
                | RpcError::Status { .. }
                | RpcError::Malformed { .. }
        )
    }

    /// The backend fault, if this is one
    pub fn remote_fault(&self) -> Option<&RemoteFault> {
        match self {
            RpcError::Remote { fault, .. } => Some(fault),
            _ => None,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, RpcError::Decode { .. })
    }
}
