mod config;
mod logging;
mod statsd;

use clap::{Args, Parser, Subcommand};
use config::{Config, ConfigError};
use gateway::AppState;
use gateway::errors::GatewayError;
use logging::LoggingError;
use statsd::MetricsError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about = "Summarizes Azure DevOps work items over HTTP")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve the HTTP API
    Serve(ConfigArgs),
    /// Load and validate a config file, then exit
    ValidateConfig(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error("could not build HTTP client: {0}")]
    Client(#[from] azure_devops::ClientError),
    #[error("could not start runtime: {0}")]
    Runtime(std::io::Error),
    #[error(transparent)]
    Serve(#[from] GatewayError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match &cli.command {
        CliCommand::Serve(args) => serve(&args.config),
        CliCommand::ValidateConfig(args) => validate(&args.config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn validate(path: &Path) -> Result<(), CliError> {
    let config = Config::from_file(path)?;
    println!(
        "{} is valid ({} v{} on {})",
        path.display(),
        config.api.title,
        config.api.version,
        config.api.listener.address()
    );
    Ok(())
}

fn serve(path: &Path) -> Result<(), CliError> {
    let config = Config::from_file(path)?;
    let _sentry = logging::init(&config.common.logging)?;
    if let Some(metrics) = &config.common.metrics {
        statsd::init(metrics)?;
    }

    tracing::info!("Starting {} v{}", config.api.title, config.api.version);
    tracing::info!(
        organization = %config.azure_devops.organization,
        project = %config.azure_devops.project,
        base_url = %config.azure_devops.base_url,
        "Default Azure DevOps connection"
    );

    let state = AppState::new(config.api, config.azure_devops)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    rt.block_on(gateway::serve(state))?;

    Ok(())
}
