pub mod health;
pub mod iterations;
pub mod test_connection;
pub mod work_item_details;
pub mod work_items;

use crate::errors::ApiError;
use crate::metrics_defs::UPSTREAM_ERRORS;
use azure_devops::ClientError;

/// Logs and counts an upstream failure that fails the whole request.
fn upstream_failure(endpoint: &'static str) -> impl FnOnce(ClientError) -> ApiError {
    move |err| {
        tracing::error!(endpoint, error = %err, "Upstream request failed");
        shared::counter!(UPSTREAM_ERRORS, "endpoint" => endpoint).increment(1);
        ApiError::from(err)
    }
}
