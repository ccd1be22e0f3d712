//! RPC sidecar HTTP client
//!
//! Every remote operation is one POST of a JSON-RPC envelope to `<base>/rpc`.
//! No retries happen here: a caller that wants another attempt calls again.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::envelope::{CallEnvelope, ResponseEnvelope};
use super::error::RpcError;
use crate::config::ServerConfig;

/// The single seam between command handlers and the network
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Issue one call and return the raw result value
    async fn call_raw(&self, method: &str, params: Option<Value>) -> Result<Value, RpcError>;
}

/// Call `method` and decode its result into `R`.
///
/// A missing `result` decodes as JSON `null`, so `R = ()` or `Option<_>`
/// accept an empty success.
pub async fn call<T, P, R>(transport: &T, method: &str, params: &P) -> Result<R, RpcError>
where
    T: RpcTransport + ?Sized,
    P: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let params = serde_json::to_value(params).map_err(|source| RpcError::Encode {
        method: method.to_string(),
        source,
    })?;
    let params = match params {
        Value::Null => None,
        other => Some(other),
    };

    let result = transport.call_raw(method, params).await?;
    serde_json::from_value(result).map_err(|source| RpcError::Decode {
        method: method.to_string(),
        source,
    })
}

/// HTTP client for the agent-editor RPC sidecar
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: Client,
    endpoint: Url,
    token: Option<String>,
    timeout: Duration,
}

impl RpcClient {
    /// Create new client from server config
    pub fn from_config(config: &ServerConfig) -> Result<Self, RpcError> {
        Self::new(
            &config.url,
            config.token.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Create new client with explicit parameters
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, RpcError> {
        let raw = format!("{}/rpc", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&raw).map_err(|source| RpcError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;

        let client = Client::builder().build().map_err(RpcError::Client)?;

        Ok(Self {
            client,
            endpoint,
            token: token.filter(|t| !t.is_empty()),
            timeout,
        })
    }

    /// Same client, different per-call timeout
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Add auth header if token is set
    fn auth_header(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref token) = self.token {
            builder.header("Authorization", format!("Bearer {}", token))
        } else {
            builder
        }
    }

    fn transport_error(method: &str, source: reqwest::Error) -> RpcError {
        if source.is_timeout() {
            RpcError::Timeout {
                method: method.to_string(),
            }
        } else {
            RpcError::Transport {
                method: method.to_string(),
                source,
            }
        }
    }
}

#[async_trait]
impl RpcTransport for RpcClient {
    async fn call_raw(&self, method: &str, params: Option<Value>) -> Result<Value, RpcError> {
        let envelope = CallEnvelope::new(method, params.as_ref());
        tracing::debug!(method, id = %envelope.id, endpoint = %self.endpoint, "rpc call");

        let resp = self
            .auth_header(self.client.post(self.endpoint.clone()))
            .timeout(self.timeout)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| Self::transport_error(method, e))?;

        let status = resp.status();
        tracing::debug!(method, id = %envelope.id, %status, "rpc response");
        if !status.is_success() {
            return Err(RpcError::Status {
                method: method.to_string(),
                status,
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| Self::transport_error(method, e))?;
        let reply: ResponseEnvelope =
            serde_json::from_slice(&body).map_err(|source| RpcError::Malformed {
                method: method.to_string(),
                source,
            })?;

        if let Some(reply_id) = reply.id.as_ref().and_then(Value::as_str) {
            if reply_id != envelope.id {
                tracing::warn!(method, sent = %envelope.id, received = %reply_id, "rpc id mismatch");
            }
        }

        if let Some(fault) = reply.error {
            return Err(RpcError::Remote {
                method: method.to_string(),
                fault,
            });
        }

        Ok(reply.result.unwrap_or(Value::Null))
    }
}
