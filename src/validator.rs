//! Manifest validation engine
//!
//! Runs the whole pipeline for one manifest:
//! - **Fetch**: read the manifest from a URL or a file
//! - **Schema check**: semantic validation of the whole document
//! - **Collection**: derive the deduplicated URL set for every platform
//! - **Probing**: one concurrent HEAD request per unique URL
//! - **Aggregation**: structural errors and probe reports merged into one verdict
//!
//! Fetch and schema failures are fatal and end the run with a single error
//! report. Everything else is accumulated so that one run surfaces every
//! discoverable problem.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::collector::UrlCollector;
use crate::error::{Result, ValidationError};
use crate::fetch::{ManifestLocation, fetch_manifest};
use crate::http_client::HttpProbeClient;
use crate::platform::{Platform, default_platforms};
use crate::prober::{ConcurrentProber, HeadProbe, ProbeConfig};
use crate::report::{Reports, aggregate};
use crate::schema::validate_manifest;

/// Validation options
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOptions {
    /// Only run the schema check
    pub skip_url_check: bool,
    /// Do not derive JAR URLs from `-jar` arguments
    pub skip_jar_check: bool,
    /// Platforms the manifest is specialized for
    pub platforms: Vec<Platform>,
    /// Probe timeout and concurrency cap
    pub probe: ProbeConfig,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            skip_url_check: false,
            skip_jar_check: false,
            platforms: default_platforms(),
            probe: ProbeConfig::default(),
        }
    }
}

/// Validates deployment manifests end to end
pub struct ManifestValidator {
    client: Arc<HttpProbeClient>,
    collector: UrlCollector,
    prober: ConcurrentProber,
    options: ValidationOptions,
}

impl ManifestValidator {
    /// Probe with the same HTTP client that fetches the manifest
    pub fn new(client: HttpProbeClient, options: ValidationOptions) -> Result<Self> {
        let client = Arc::new(client);
        let probe: Arc<dyn HeadProbe> = client.clone();
        Self::with_probe(client, probe, options)
    }

    /// Use a separate probe implementation
    pub fn with_probe(
        client: Arc<HttpProbeClient>,
        probe: Arc<dyn HeadProbe>,
        options: ValidationOptions,
    ) -> Result<Self> {
        if options.platforms.is_empty() {
            return Err(ValidationError::Config(
                "At least one platform must be checked".to_string(),
            ));
        }
        if options.probe.timeout == Duration::ZERO {
            return Err(ValidationError::Config(
                "Probe timeout must be greater than 0".to_string(),
            ));
        }
        match options.probe.max_concurrent {
            Some(0) => {
                return Err(ValidationError::Config(
                    "Maximum concurrent probes must be greater than 0".to_string(),
                ));
            }
            Some(max) if max > Semaphore::MAX_PERMITS => {
                return Err(ValidationError::Config(format!(
                    "Maximum concurrent probes must not exceed {}",
                    Semaphore::MAX_PERMITS
                )));
            }
            _ => {}
        }

        Ok(Self {
            collector: UrlCollector::new(options.platforms.clone(), options.skip_jar_check),
            prober: ConcurrentProber::new(probe, options.probe.clone()),
            client,
            options,
        })
    }

    /// Fetch and validate the manifest at `location`
    pub async fn validate(&self, location: &ManifestLocation) -> Reports {
        match fetch_manifest(location, &self.client).await {
            Ok(text) => self.validate_text(&text, &location.to_string()).await,
            Err(e) => {
                let error = ValidationError::from(e);
                warn!(%error, "Manifest retrieval failed");
                Reports::fatal(&error)
            }
        }
    }

    /// Validate manifest text; `origin` names the manifest in reports
    pub async fn validate_text(&self, text: &str, origin: &str) -> Reports {
        let document = match validate_manifest(text, &self.options.platforms) {
            Ok(document) => document,
            Err(source) => {
                let error = ValidationError::ManifestSchema {
                    location: origin.to_string(),
                    source,
                };
                warn!(%error, "Manifest failed schema validation");
                return Reports::fatal(&error);
            }
        };

        if self.options.skip_url_check {
            info!("URL check skipped");
            return Reports::new();
        }

        let (urls, structural) = self.collector.collect(&document);
        info!(
            urls = urls.len(),
            structural_errors = structural.len(),
            "URLs collected"
        );

        let probes = self.prober.probe(&urls).await;
        aggregate(structural, probes)
    }
}
