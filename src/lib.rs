//! agent-editor - command-line client for the agent-editor knowledge service
//!
//! Every command is one JSON-RPC call to a running sidecar. Three pieces carry
//! the weight:
//!
//! - [`rpc`]: the transport, one POST per call, with a typed error taxonomy
//! - [`progress`]: live import progress tailed from a file the sidecar appends to
//! - [`export`]: json / jsonl / tar writers for exported documents

pub mod cli;
pub mod config;
pub mod export;
pub mod output;
pub mod progress;
pub mod rpc;

pub use config::Config;
pub use export::{ExportDoc, ExportFormat};
pub use rpc::{RpcClient, RpcError, RpcTransport};
