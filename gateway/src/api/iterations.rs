use super::upstream_failure;
use crate::AppState;
use crate::errors::ApiError;
use crate::headers::Connection;
use axum::Json;
use axum::extract::{Query, State};
use azure_devops::shape::Iteration;
use azure_devops::wiql::{ITERATION_FIELDS, ITERATION_PATH};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Deserialize, Debug)]
pub struct Params {
    assigned_to: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct IterationsResponse {
    pub iterations: Vec<Iteration>,
    pub count: usize,
}

/// Distinct iterations of the work items assigned to a user, sorted by path.
///
/// `GET /my-iterations?assigned_to=<user>`
pub async fn handler(
    State(state): State<AppState>,
    Connection(settings): Connection,
    Query(params): Query<Params>,
) -> Result<Json<IterationsResponse>, ApiError> {
    let assigned_to = params
        .assigned_to
        .unwrap_or_else(|| state.defaults.default_user.clone());
    tracing::info!(%assigned_to, "Fetching iterations");

    let ids = state
        .client
        .query_by_assignee(&settings, ITERATION_FIELDS, &assigned_to)
        .await
        .map_err(upstream_failure("my_iterations"))?;

    if ids.is_empty() {
        return Ok(Json(IterationsResponse {
            iterations: Vec::new(),
            count: 0,
        }));
    }

    let paths: BTreeSet<String> = state
        .client
        .fetch_details(&settings, &ids, Some(&[ITERATION_PATH][..]))
        .await
        .map_err(upstream_failure("my_iterations"))?
        .into_iter()
        .filter_map(|item| item.fields.iteration_path)
        .filter(|path| !path.is_empty())
        .collect();

    let iterations: Vec<Iteration> = paths.into_iter().map(Iteration::from).collect();
    tracing::info!(count = iterations.len(), "Found unique iterations");

    Ok(Json(IterationsResponse {
        count: iterations.len(),
        iterations,
    }))
}
