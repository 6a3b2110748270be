//! Concurrent reachability probing
//!
//! Every entry of a [`UrlSet`] gets its own tokio task issuing one HEAD
//! request. All tasks are started up front and the prober waits for every one
//! of them before returning; there is no early exit on failure. Results fan
//! back in through the join barrier only.

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::collector::{CheckDetails, UrlSet};
use crate::error::{ProbeError, ValidationError};
use crate::report::{Report, Reports};

/// The only status accepted as available, after redirects were followed
pub const HTTP_OK: u16 = 200;

/// A single reachability check returning the HTTP status code
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HeadProbe: Send + Sync {
    async fn head(&self, url: &str) -> Result<u16, ProbeError>;
}

/// Prober configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    /// Upper bound for a single probe, on top of the client's own timeout
    pub timeout: Duration,
    /// Maximum number of probes in flight; `None` starts all at once
    pub max_concurrent: Option<usize>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_concurrent: None,
        }
    }
}

/// Fans out one HEAD probe per URL and collects one report per URL
pub struct ConcurrentProber {
    probe: Arc<dyn HeadProbe>,
    config: ProbeConfig,
}

impl ConcurrentProber {
    pub fn new(probe: Arc<dyn HeadProbe>, config: ProbeConfig) -> Self {
        Self { probe, config }
    }

    /// Probe every URL of the set. The returned order is unspecified.
    pub async fn probe(&self, urls: &UrlSet) -> Reports {
        if urls.is_empty() {
            return Reports::new();
        }

        let semaphore = self
            .config
            .max_concurrent
            .map(|limit| Arc::new(Semaphore::new(limit)));

        info!(
            urls = urls.len(),
            max_concurrent = ?self.config.max_concurrent,
            "Probing URLs"
        );

        let tasks = urls.iter().map(|(url, details)| {
            let probe = Arc::clone(&self.probe);
            let semaphore = semaphore.clone();
            let timeout = self.config.timeout;
            let task_url = url.clone();
            let task_details = details.clone();

            let handle = tokio::spawn(async move {
                // Holding the permit for the whole check bounds the in-flight probes
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                check_url(probe.as_ref(), &task_url, &task_details, timeout).await
            });

            let url = url.clone();
            let details = details.clone();
            async move {
                handle.await.unwrap_or_else(|e| {
                    let error = ValidationError::ProbeNetwork {
                        url,
                        source: ProbeError::Aborted {
                            details: e.to_string(),
                        },
                    };
                    network_failure_report(&error, &details)
                })
            }
        });

        let reports: Reports = join_all(tasks).await.into_iter().collect();
        info!(
            errors = reports.error_count(),
            available = reports.status_count(),
            "Probing finished"
        );
        reports
    }
}

/// Run one probe and turn its outcome into exactly one report
pub async fn check_url(
    probe: &dyn HeadProbe,
    url: &str,
    details: &CheckDetails,
    timeout: Duration,
) -> Report {
    let outcome = tokio::time::timeout(timeout, probe.head(url))
        .await
        .unwrap_or(Err(ProbeError::Timeout {
            timeout_seconds: timeout.as_secs(),
        }));

    match outcome {
        Err(source) => {
            warn!(url, error = %source, "Probe failed");
            let error = ValidationError::ProbeNetwork {
                url: url.to_string(),
                source,
            };
            network_failure_report(&error, details)
        }
        Ok(status) if status != HTTP_OK => {
            warn!(url, status, "Probe returned a non-success status");
            let error = ValidationError::ProbeStatus {
                url: url.to_string(),
                status,
            };
            Report::error(format!("{}. (Check reason: {})", error, details))
        }
        Ok(status) => {
            debug!(url, status, "Resource available");
            Report::status(format!(
                "OK: Resource {} is available. (Reason for check: {})",
                url, details
            ))
        }
    }
}

fn network_failure_report(error: &ValidationError, details: &CheckDetails) -> Report {
    Report::error(format!("{}. (Check reason: {})", error, details))
}
