//! JSON-RPC 2.0 envelopes exchanged with the sidecar

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version carried by every envelope
pub const PROTOCOL_VERSION: &str = "2.0";

/// Request envelope (one per call)
#[derive(Debug, Serialize)]
pub struct CallEnvelope<'a, P: Serialize> {
    #[serde(rename = "jsonrpc")]
    pub protocol: &'static str,
    pub id: String,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<&'a P>,
}

impl<'a, P: Serialize> CallEnvelope<'a, P> {
    pub fn new(method: &'a str, params: Option<&'a P>) -> Self {
        Self {
            protocol: PROTOCOL_VERSION,
            id: correlation_id(),
            method,
            params,
        }
    }
}

/// Response envelope
#[derive(Debug, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "jsonrpc", alias = "protocol", default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RemoteFault>,
}

/// Deliberate error returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteFault {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for RemoteFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rpc error {}: {}", self.code, self.message)?;
        if let Some(data) = &self.data {
            write!(f, " ({})", data)?;
        }
        Ok(())
    }
}

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Build a correlation id from the wall clock in nanoseconds.
///
/// A process-wide sequence number is appended so two calls issued within the
/// same clock tick still get distinct ids.
pub fn correlation_id() -> String {
    let nanos = Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_else(|| Utc::now().timestamp_micros() * 1_000);
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", nanos, seq)
}
