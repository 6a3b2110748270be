//! # manifest-validator Library
//!
//! Validates multi-platform deployment manifests: the manifest is checked
//! against its schema, specialized for every target platform, and each
//! artifact URL it implies is probed concurrently with an HTTP HEAD request.

pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http_client;
pub mod manifest;
pub mod output;
pub mod platform;
pub mod prober;
pub mod report;
pub mod resolver;
pub mod schema;
pub mod validator;

pub use cli::{Cli, OutputFormat};
pub use collector::{CheckDetails, Derivation, Reason, UrlCollector, UrlSet};
pub use config::{Config, ConfigError, ConfigManager, EnvProvider, SystemEnvProvider};
pub use error::{
    FetchError, PathError, ProbeError, SchemaError, StructuralError, ValidationError,
};
pub use fetch::{ManifestLocation, fetch_manifest};
pub use http_client::{HttpClientConfig, HttpProbeClient};
pub use manifest::{Manifest, ManifestDocument};
pub use output::Output;
pub use platform::{Platform, PlatformError, default_platforms};
pub use prober::{ConcurrentProber, HeadProbe, ProbeConfig, check_url};
pub use report::{Report, Reports, aggregate};
pub use schema::validate_manifest;
pub use validator::{ManifestValidator, ValidationOptions};
