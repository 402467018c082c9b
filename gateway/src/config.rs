use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Empty API title")]
    EmptyTitle,
}

/// HTTP API configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Reported by the root endpoint and logged at startup
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub listener: Listener,
}

fn default_title() -> String {
    "Azure DevOps Summarizer API".into()
}

fn default_version() -> String {
    "1.0.0".into()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            title: default_title(),
            version: default_version(),
            listener: Listener::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        self.listener.validate()
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "0.0.0.0".into(),
            port: 8000,
        }
    }
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Work Item Gateway
version: 2.1.0
listener:
    host: 127.0.0.1
    port: 9000
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.title, "Work Item Gateway");
        assert_eq!(config.listener.address(), "127.0.0.1:9000");
    }

    #[test]
    fn test_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.listener.address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_validation_errors() {
        let mut config = Config::default();
        config.listener.port = 0;
        assert_eq!(config.validate().unwrap_err(), ValidationError::InvalidPort);

        let mut config = Config::default();
        config.title = String::new();
        assert_eq!(config.validate().unwrap_err(), ValidationError::EmptyTitle);

        // Invalid port type
        assert!(serde_yaml::from_str::<Config>("listener: {host: a, port: not_a_number}").is_err());
    }
}
