use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Connect timeout cannot be 0")]
    InvalidConnectTimeout,

    #[error("Request timeout cannot be 0")]
    InvalidRequestTimeout,
}

/// Fallback connection values and query defaults.
///
/// Used whenever a request does not carry its own `X-Azure-*` override
/// headers or a Basic authorization token.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub organization: String,
    pub project: String,
    pub access_token: String,
    pub base_url: String,
    /// Assignee used when a request omits `assigned_to`
    pub default_user: String,
    /// Iteration filter used when a request omits `iteration`
    pub default_iteration: String,
    pub timeouts: Timeouts,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            organization: "your-org".into(),
            project: "YourProject".into(),
            access_token: "your-pat-token".into(),
            base_url: "https://your-org.visualstudio.com".into(),
            default_user: "user@company.com".into(),
            default_iteration: "Project\\Sprint\\Iteration".into(),
            timeouts: Timeouts::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.timeouts.validate()
    }
}

/// Timeouts applied to every upstream call.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Timeouts {
    pub connect_secs: u64,
    /// Covers the whole request, including reading the response body
    pub request_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            connect_secs: 10,
            request_secs: 30,
        }
    }
}

impl Timeouts {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.connect_secs == 0 {
            return Err(ValidationError::InvalidConnectTimeout);
        }
        if self.request_secs == 0 {
            return Err(ValidationError::InvalidRequestTimeout);
        }
        Ok(())
    }

    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}
