use crate::cli::{Cli, OutputFormat};
use crate::http_client::{HttpClientConfig, default_user_agent};
use crate::platform::Platform;
use crate::prober::ProbeConfig;
use crate::validator::ValidationOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

const ENV_PREFIX: &str = "MANIFEST_VALIDATOR_";

const CONFIG_FILE_NAMES: [&str; 4] = [
    "manifest-validator.toml",
    "manifest-validator.json",
    ".manifest-validator.toml",
    ".manifest-validator.json",
];

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub checks: CheckConfig,
    pub output: OutputConfig,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum number of HEAD requests in flight; unbounded when unset
    pub max_concurrent_probes: Option<usize>,
    /// User agent string
    pub user_agent: String,
}

/// What is checked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CheckConfig {
    pub skip_url_check: bool,
    pub skip_jar_check: bool,
    /// Platforms as `<os>-<arch>`
    pub platforms: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormatConfig,
    /// Suppress informational reports
    pub errors_only: bool,
    /// Debug logging
    pub verbose: bool,
}

/// Output format configuration (serializable version of CLI OutputFormat)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    #[default]
    Human,
    Json,
    Summary,
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputFormatConfig::Human,
            OutputFormat::Json => OutputFormatConfig::Json,
            OutputFormat::Summary => OutputFormatConfig::Summary,
        }
    }
}

impl From<OutputFormatConfig> for OutputFormat {
    fn from(format: OutputFormatConfig) -> Self {
        match format {
            OutputFormatConfig::Human => OutputFormat::Human,
            OutputFormatConfig::Json => OutputFormat::Json,
            OutputFormatConfig::Summary => OutputFormat::Summary,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            max_concurrent_probes: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            skip_url_check: false,
            skip_jar_check: false,
            platforms: crate::platform::default_platforms()
                .iter()
                .map(Platform::to_string)
                .collect(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormatConfig::Human,
            errors_only: false,
            verbose: false,
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        let mut config = match &cli.config {
            Some(config_path) => Self::load_from_file(config_path).await?,
            None => Self::find_config_file().await?.unwrap_or_default(),
        };

        config = Self::apply_environment_overrides(config)?;
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Result<Option<Config>> {
        for name in &CONFIG_FILE_NAMES {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("manifest-validator");
            for name in &CONFIG_FILE_NAMES {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        let var = |name: &str| env.get(&format!("{}{}", ENV_PREFIX, name));

        // Network settings
        if let Some(timeout) = var("TIMEOUT") {
            config.network.timeout_seconds = parse_env("TIMEOUT", &timeout)?;
        }
        if let Some(max) = var("MAX_CONCURRENT") {
            config.network.max_concurrent_probes = Some(parse_env("MAX_CONCURRENT", &max)?);
        }
        if let Some(user_agent) = var("USER_AGENT") {
            config.network.user_agent = user_agent;
        }

        // Check settings
        if let Some(skip) = var("SKIP_URL_CHECK") {
            config.checks.skip_url_check = parse_env("SKIP_URL_CHECK", &skip)?;
        }
        if let Some(skip) = var("SKIP_JAR_CHECK") {
            config.checks.skip_jar_check = parse_env("SKIP_JAR_CHECK", &skip)?;
        }
        if let Some(platforms) = var("PLATFORMS") {
            config.checks.platforms = platforms
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Output settings
        if let Some(errors_only) = var("ERRORS_ONLY") {
            config.output.errors_only = parse_env("ERRORS_ONLY", &errors_only)?;
        }
        if let Some(verbose) = var("VERBOSE") {
            config.output.verbose = parse_env("VERBOSE", &verbose)?;
        }
        if let Some(format) = var("FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "human" => OutputFormatConfig::Human,
                "json" => OutputFormatConfig::Json,
                "summary" => OutputFormatConfig::Summary,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid {}FORMAT value: {}",
                        ENV_PREFIX, format
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if let Some(timeout) = cli.timeout {
            config.network.timeout_seconds = timeout;
        }
        if cli.max_concurrent.is_some() {
            config.network.max_concurrent_probes = cli.max_concurrent;
        }

        // Flags can only switch a setting on
        config.checks.skip_url_check |= cli.skip_url_check;
        config.checks.skip_jar_check |= cli.skip_jar_check;
        if !cli.platforms.is_empty() {
            config.checks.platforms = cli.platforms.clone();
        }

        if let Some(format) = cli.format {
            config.output.format = format.into();
        }
        config.output.errors_only |= cli.errors_only;
        config.output.verbose |= cli.verbose;

        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.network.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if config.network.max_concurrent_probes == Some(0) {
            return Err(ConfigError::Validation(
                "Maximum concurrent probes must be greater than 0".to_string(),
            ));
        }

        if let Some(max) = config.network.max_concurrent_probes
            && max > Semaphore::MAX_PERMITS
        {
            return Err(ConfigError::Validation(format!(
                "Maximum concurrent probes must not exceed {}",
                Semaphore::MAX_PERMITS
            )));
        }

        Self::get_platforms(config)?;

        Ok(())
    }

    /// Parse the configured platforms, rejecting an empty or repeated set
    pub fn get_platforms(config: &Config) -> Result<Vec<Platform>> {
        if config.checks.platforms.is_empty() {
            return Err(ConfigError::Validation(
                "At least one platform must be specified".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut platforms = Vec::with_capacity(config.checks.platforms.len());
        for value in &config.checks.platforms {
            let platform: Platform = value
                .parse()
                .map_err(|e| ConfigError::Validation(format!("{}", e)))?;
            if !seen.insert(platform.clone()) {
                return Err(ConfigError::Validation(format!(
                    "Platform {} is listed more than once",
                    platform
                )));
            }
            platforms.push(platform);
        }
        Ok(platforms)
    }

    /// Convert configuration to Duration for network timeout
    pub fn get_timeout_duration(config: &Config) -> Duration {
        Duration::from_secs(config.network.timeout_seconds)
    }

    pub fn http_client_config(config: &Config) -> HttpClientConfig {
        HttpClientConfig {
            timeout_seconds: config.network.timeout_seconds,
            user_agent: config.network.user_agent.clone(),
        }
    }

    pub fn validation_options(config: &Config) -> Result<ValidationOptions> {
        Ok(ValidationOptions {
            skip_url_check: config.checks.skip_url_check,
            skip_jar_check: config.checks.skip_jar_check,
            platforms: Self::get_platforms(config)?,
            probe: ProbeConfig {
                timeout: Self::get_timeout_duration(config),
                max_concurrent: config.network.max_concurrent_probes,
            },
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        ConfigError::Environment(format!("Invalid {}{} value: {}", ENV_PREFIX, name, value))
    })
}
