use crate::AppState;
use crate::errors::ApiError;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use azure_devops::wiql::ID;
use azure_devops::{ClientError, ConnectionSettings};
use http::StatusCode;
use serde::Serialize;

/// Assignee of the probe query.
const PROBE_USER: &str = "test@example.com";

const INVALID_TOKEN: &str = "Invalid Personal Access Token (PAT) or insufficient permissions. Please check:\n\
1. Your PAT is not expired\n\
2. Your PAT has 'Project and Team (read)' permissions\n\
3. You have access to the organization and project";

const PROJECT_NOT_FOUND: &str = "Project or organization not found. Please verify the organization name and project name are correct.";

#[derive(Serialize, Debug)]
pub struct ConnectionStatus {
    pub status: &'static str,
    pub message: &'static str,
}

impl ConnectionStatus {
    fn success(message: &'static str) -> Self {
        ConnectionStatus {
            status: "success",
            message,
        }
    }
}

/// Checks that the given connection settings can query work items.
///
/// `POST /test-connection` with `{organization, project, baseUrl, accessToken}`.
/// Request headers are ignored. Every failure is answered with 400.
pub async fn handler(
    State(state): State<AppState>,
    body: Result<Json<ConnectionSettings>, JsonRejection>,
) -> Result<Json<ConnectionStatus>, ApiError> {
    let Json(settings) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let settings = settings.with_scheme();
    tracing::info!(
        organization = %settings.organization,
        project = %settings.project,
        base_url = %settings.base_url,
        token_length = settings.access_token.len(),
        "Testing connection"
    );

    match state.client.probe(&settings, &[ID], PROBE_USER).await {
        Ok(()) => {
            tracing::info!("Connection test successful");
            Ok(Json(ConnectionStatus::success("Connection successful")))
        }
        Err(err) => {
            tracing::warn!(error = %err, "Connection test failed");
            classify(err)
        }
    }
}

fn classify(err: ClientError) -> Result<Json<ConnectionStatus>, ApiError> {
    let detail = match err {
        // A query too large to answer still proves the connection works
        ClientError::Status { status, body }
            if status == StatusCode::BAD_REQUEST && body.contains("size limit") =>
        {
            return Ok(Json(ConnectionStatus::success(
                "Connection successful (large dataset detected)",
            )));
        }
        ClientError::Status { status, .. } if status == StatusCode::UNAUTHORIZED => {
            INVALID_TOKEN.to_string()
        }
        ClientError::Status { status, .. } if status == StatusCode::NOT_FOUND => {
            PROJECT_NOT_FOUND.to_string()
        }
        err @ ClientError::Status { .. } => err.to_string(),
        other => format!("Connection failed: {other}"),
    };

    Err(ApiError::BadRequest(detail))
}
