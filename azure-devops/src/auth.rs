//! Azure DevOps accepts a personal access token as the password of a Basic
//! credential with an empty user name.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const BASIC_PREFIX: &str = "Basic ";

/// Builds the `Authorization` header value for a personal access token.
pub fn basic_auth_header(token: &str) -> String {
    let encoded = STANDARD.encode(format!(":{token}"));
    format!("{BASIC_PREFIX}{encoded}")
}

/// Extracts the token from a `Basic base64(":" + token)` header value.
///
/// Returns `None` for any other scheme, undecodable payloads, payloads that
/// carry a user name, and empty tokens.
pub fn token_from_basic_header(value: &str) -> Option<String> {
    let encoded = value.strip_prefix(BASIC_PREFIX)?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;

    match decoded.strip_prefix(':') {
        Some(token) if !token.is_empty() => Some(token.to_string()),
        _ => None,
    }
}
