//! Per-request connection overrides. Any of these headers may be missing, in
//! which case the configured default is used for that value.

use crate::AppState;
use axum::extract::FromRequestParts;
use azure_devops::{ConnectionSettings, Overrides};
use http::HeaderMap;
use http::header::AUTHORIZATION;
use http::request::Parts;
use std::convert::Infallible;

pub const ORGANIZATION: &str = "x-azure-organization";
pub const PROJECT: &str = "x-azure-project";
pub const BASE_URL: &str = "x-azure-baseurl";

/// Header values that are not visible ASCII count as absent.
pub fn overrides(headers: &HeaderMap) -> Overrides<'_> {
    Overrides {
        organization: header(headers, ORGANIZATION),
        project: header(headers, PROJECT),
        base_url: header(headers, BASE_URL),
        authorization: header(headers, AUTHORIZATION.as_str()),
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Connection settings resolved from the request headers and the configured
/// defaults. Never rejects a request.
pub struct Connection(pub ConnectionSettings);

impl FromRequestParts<AppState> for Connection {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let settings = ConnectionSettings::resolve(&overrides(&parts.headers), &state.defaults);
        tracing::debug!(
            organization = %settings.organization,
            project = %settings.project,
            base_url = %settings.base_url,
            token_length = settings.access_token.len(),
            "Resolved connection settings"
        );
        Ok(Connection(settings))
    }
}
