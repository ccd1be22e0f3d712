//! RPC transport module
//!
//! Provides the JSON-RPC client for the agent-editor sidecar.

mod client;
mod envelope;
mod error;
mod types;

pub use client::{call, RpcClient, RpcTransport};
pub use envelope::{correlation_id, RemoteFault, PROTOCOL_VERSION};
pub use error::RpcError;
pub use types::*;
