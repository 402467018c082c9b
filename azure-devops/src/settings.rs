use crate::auth::token_from_basic_header;
use crate::config::Config;
use serde::Deserialize;

/// Effective upstream connection for a single request.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub organization: String,
    pub project: String,
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// Per-request values that take precedence over the configured defaults.
#[derive(Clone, Copy, Debug, Default)]
pub struct Overrides<'a> {
    pub organization: Option<&'a str>,
    pub project: Option<&'a str>,
    pub base_url: Option<&'a str>,
    /// Raw `Authorization` header value
    pub authorization: Option<&'a str>,
}

impl ConnectionSettings {
    /// Merges request overrides with the configured defaults.
    ///
    /// Empty overrides count as absent. A token is only taken from an
    /// `Authorization: Basic base64(":" + token)` header, anything else falls
    /// back to the configured token without failing.
    pub fn resolve(overrides: &Overrides<'_>, defaults: &Config) -> Self {
        fn pick(value: Option<&str>, default: &str) -> String {
            value
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        }

        let access_token = overrides
            .authorization
            .and_then(token_from_basic_header)
            .unwrap_or_else(|| defaults.access_token.clone());

        ConnectionSettings {
            organization: pick(overrides.organization, &defaults.organization),
            project: pick(overrides.project, &defaults.project),
            base_url: pick(overrides.base_url, &defaults.base_url),
            access_token,
        }
    }

    /// Prefixes `https://` when the base URL carries no http(s) scheme.
    pub fn with_scheme(mut self) -> Self {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            self.base_url = format!("https://{}", self.base_url);
        }
        self
    }
}
