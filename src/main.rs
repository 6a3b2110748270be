use std::process::ExitCode;

use anyhow::Context;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use manifest_validator::{
    Cli, Config, ConfigManager, HttpProbeClient, ManifestLocation, ManifestValidator, Output,
};

const EXIT_VALIDATION_FAILED: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let config = match ConfigManager::load_config(&cli).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    init_logging(config.output.verbose);
    debug!(?config, "Configuration loaded");

    match run(&cli, &config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_VALIDATION_FAILED),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "warn,manifest_validator=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Returns whether the manifest passed
async fn run(cli: &Cli, config: &Config) -> anyhow::Result<bool> {
    let options = ConfigManager::validation_options(config)?;
    let client = HttpProbeClient::new(ConfigManager::http_client_config(config))
        .context("Failed to create HTTP client")?;
    let validator = ManifestValidator::new(client, options)?;

    let location = ManifestLocation::parse(&cli.manifest);
    let reports = validator.validate(&location).await;

    let output = Output::new(config.output.format.into(), config.output.errors_only);
    print!("{}", output.format_reports(&reports)?);

    Ok(!reports.has_error())
}
