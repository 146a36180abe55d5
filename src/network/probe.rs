use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio::net::TcpStream;

/// One query of the device's connectivity.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn is_connected(&self) -> Result<bool>;
}

/// Reports online when a TCP connection to the backend host succeeds in time.
#[derive(Clone, Debug)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Probe the host and port of an API base URL.
    pub fn for_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let url = reqwest::Url::parse(base_url).with_context(|| format!("Invalid API URL: {base_url}"))?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow!("API URL has no host: {base_url}"))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| anyhow!("API URL has no port: {base_url}"))?;
        Ok(Self::new(host, port, timeout))
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn is_connected(&self) -> Result<bool> {
        let address = (self.host.as_str(), self.port);
        match tokio::time::timeout(self.timeout, TcpStream::connect(address)).await {
            Ok(Ok(_)) => Ok(true),
            Ok(Err(_)) | Err(_) => Ok(false),
        }
    }
}
