//! Pluggable HTTP transports for the calendar fetch.
//!
//! The strategy is picked once when the fetcher is built; the fetch path
//! itself never branches on environment.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, FetchError};
use crate::storage::config::TransportConfig;

/// Status and body of a completed GET.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Issues a single GET and returns the raw response.
///
/// Implementations only fail with `FetchError::Transport`; status and body
/// interpretation belongs to the fetcher.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name for logs (e.g. "direct", "onion").
    fn name(&self) -> &str;

    async fn get(&self, url: &str) -> Result<RawResponse, FetchError>;
}

/// Which transport to route upstream requests through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Direct,
    Onion,
}

/// Plain HTTPS client.
pub struct DirectTransport {
    client: reqwest::Client,
}

impl DirectTransport {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for DirectTransport {
    fn name(&self) -> &str {
        "direct"
    }

    async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        send(&self.client, url).await
    }
}

/// HTTPS client routed through a Tor SOCKS5 proxy.
pub struct OnionTransport {
    client: reqwest::Client,
}

impl OnionTransport {
    /// `proxy` is a SOCKS URL such as `socks5h://127.0.0.1:9050`; `socks5h`
    /// resolves names through the proxy as well.
    pub fn new(proxy: &str, timeout: Duration) -> Result<Self, FetchError> {
        let proxy = reqwest::Proxy::all(proxy)?;
        let client = reqwest::Client::builder()
            .proxy(proxy)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for OnionTransport {
    fn name(&self) -> &str {
        "onion"
    }

    async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        send(&self.client, url).await
    }
}

async fn send(client: &reqwest::Client, url: &str) -> Result<RawResponse, FetchError> {
    let resp = client.get(url).send().await?;
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    Ok(RawResponse { status, body })
}

/// Resolve the effective transport mode from the configured one and the
/// value of `SLOTWATCH_ENV`.
///
/// `dev` forces a direct connection regardless of config.
pub fn effective_mode(configured: TransportMode, env: Option<&str>) -> TransportMode {
    match env {
        Some("dev") => TransportMode::Direct,
        _ => configured,
    }
}

/// Build the transport described by `config`, honoring `SLOTWATCH_ENV`.
pub fn from_config(
    config: &TransportConfig,
    timeout: Duration,
) -> Result<Box<dyn Transport>, ConfigError> {
    let env = std::env::var("SLOTWATCH_ENV").ok();
    build(effective_mode(config.mode, env.as_deref()), config, timeout)
}

/// Build the transport for an already resolved `mode`.
pub fn build(
    mode: TransportMode,
    config: &TransportConfig,
    timeout: Duration,
) -> Result<Box<dyn Transport>, ConfigError> {
    let invalid = |e: FetchError| ConfigError::InvalidValue {
        key: "transport".into(),
        message: e.to_string(),
    };

    let transport: Box<dyn Transport> = match mode {
        TransportMode::Direct => Box::new(DirectTransport::new(timeout).map_err(invalid)?),
        TransportMode::Onion => Box::new(
            OnionTransport::new(&config.onion_proxy, timeout).map_err(invalid)?,
        ),
    };
    tracing::debug!(transport = transport.name(), "selected upstream transport");
    Ok(transport)
}
