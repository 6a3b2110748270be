use async_trait::async_trait;
use reqwest::Client;
use std::error::Error as StdError;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{FetchError, ProbeError, ValidationError};
use crate::prober::HeadProbe;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: default_user_agent(),
        }
    }
}

pub fn default_user_agent() -> String {
    format!("manifest-validator/{}", env!("CARGO_PKG_VERSION"))
}

/// Async HTTP client used to download manifests and probe artifact URLs
pub struct HttpProbeClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpProbeClient {
    /// Create a new async HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self, ValidationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(ValidationError::from)?;

        Ok(Self { client, config })
    }

    /// Download a text document, failing on any non-success status
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let http_error = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };

        let response = timeout(self.timeout(), self.client.get(url).send())
            .await
            .map_err(|_| self.fetch_timeout(url))?
            .map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        timeout(self.timeout(), response.text())
            .await
            .map_err(|_| self.fetch_timeout(url))?
            .map_err(http_error)
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_seconds)
    }

    fn fetch_timeout(&self, url: &str) -> FetchError {
        FetchError::Timeout {
            url: url.to_string(),
            timeout_seconds: self.config.timeout_seconds,
        }
    }
}

#[async_trait]
impl HeadProbe for HttpProbeClient {
    async fn head(&self, url: &str) -> Result<u16, ProbeError> {
        let response = timeout(self.timeout(), self.client.head(url).send())
            .await
            .map_err(|_| ProbeError::Timeout {
                timeout_seconds: self.config.timeout_seconds,
            })?
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::Timeout {
                        timeout_seconds: self.config.timeout_seconds,
                    }
                } else {
                    ProbeError::Transport {
                        details: describe_transport_error(&e),
                    }
                }
            })?;

        let status = response.status().as_u16();
        debug!(url, status, "HEAD request completed");
        Ok(status)
    }
}

/// Flatten a reqwest error and its sources into one line
fn describe_transport_error(error: &reqwest::Error) -> String {
    let mut details = error.to_string();
    let mut source = StdError::source(error);
    while let Some(cause) = source {
        details.push_str(": ");
        details.push_str(&cause.to_string());
        source = StdError::source(cause);
    }
    details
}
