use serde::Deserialize;
use std::fs::File;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Full,
    #[default]
    Compact,
    Pretty,
    Json,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or any `EnvFilter` directive.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
    /// Also log to this file, rotated by size
    pub file: Option<PathBuf>,
    pub max_file_size_mb: u64,
    pub backup_count: usize,
    pub sentry_dsn: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".into(),
            format: LogFormat::default(),
            file: None,
            max_file_size_mb: 10,
            backup_count: 5,
            sentry_dsn: None,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    #[serde(default)]
    pub api: gateway::config::Config,
    #[serde(default)]
    pub azure_devops: azure_devops::config::Config,
}

impl Config {
    /// Loads and validates the config file at `path`.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.api.validate()?;
        self.azure_devops.validate()?;

        let logging = &self.common.logging;
        if logging.file.is_some() && logging.max_file_size_mb == 0 {
            return Err(ValidationError::InvalidMaxFileSize);
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("api: {0}")]
    Api(#[from] gateway::config::ValidationError),
    #[error("azure_devops: {0}")]
    AzureDevOps(#[from] azure_devops::config::ValidationError),
    #[error("logging: max_file_size_mb cannot be 0 when a log file is set")]
    InvalidMaxFileSize,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Validation(#[from] ValidationError),
}
