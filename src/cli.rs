use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// How reports are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per report, errors highlighted
    #[default]
    Human,
    /// Machine-readable JSON document
    Json,
    /// Counts only
    Summary,
}

/// Deployment manifest validator
#[derive(Parser, Debug, Clone)]
#[command(name = "manifest-validator")]
#[command(
    about = "Validate a deployment manifest and check that every artifact it references is reachable"
)]
#[command(version)]
#[command(after_help = "EXAMPLES:
    manifest-validator https://cdn.example/deployment-config.json
    manifest-validator --skip-url-check deployment-config.json
    manifest-validator --platform linux-amd64 --errors-only deployment-config.json")]
pub struct Cli {
    /// URL or path of the deployment manifest
    #[arg(help = "URL or file path of the deployment manifest")]
    pub manifest: String,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Only check the manifest itself, not the URLs it references
    #[arg(long = "skip-url-check")]
    pub skip_url_check: bool,

    /// Do not check JAR files passed to Java commands with -jar
    #[arg(long = "skip-jar-check")]
    pub skip_jar_check: bool,

    /// Platform to check as <os>-<arch>; repeat to check several
    #[arg(short = 'p', long = "platform", action = clap::ArgAction::Append)]
    pub platforms: Vec<String>,

    /// HTTP request timeout in seconds
    #[arg(short = 't', long = "timeout")]
    pub timeout: Option<u64>,

    /// Maximum number of concurrent HEAD requests
    #[arg(long = "max-concurrent")]
    pub max_concurrent: Option<usize>,

    /// Only print errors
    #[arg(short = 'e', long = "errors-only")]
    pub errors_only: bool,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
