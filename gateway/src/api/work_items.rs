use super::upstream_failure;
use crate::AppState;
use crate::errors::ApiError;
use crate::headers::Connection;
use axum::Json;
use axum::extract::{Query, State};
use azure_devops::shape::WorkItemSummary;
use azure_devops::wiql::SUMMARY_FIELDS;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
pub struct Params {
    assigned_to: Option<String>,
    iteration: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct WorkItemsResponse {
    pub work_items: Vec<WorkItemSummary>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Filters>,
}

#[derive(Serialize, Debug)]
pub struct Filters {
    pub assigned_to: String,
    pub iteration: String,
}

/// Lists the work items assigned to a user.
///
/// `GET /work-items?assigned_to=<user>&iteration=<path fragment>`
///
/// Both parameters fall back to the configured defaults when omitted. The
/// iteration is matched as a substring of each item's iteration path after
/// the details are fetched; an explicitly empty `iteration` disables the
/// filter.
pub async fn handler(
    State(state): State<AppState>,
    Connection(settings): Connection,
    Query(params): Query<Params>,
) -> Result<Json<WorkItemsResponse>, ApiError> {
    let assigned_to = params
        .assigned_to
        .unwrap_or_else(|| state.defaults.default_user.clone());
    let iteration = params
        .iteration
        .unwrap_or_else(|| state.defaults.default_iteration.clone());
    tracing::info!(%assigned_to, %iteration, "Fetching work items");

    let ids = state
        .client
        .query_by_assignee(&settings, SUMMARY_FIELDS, &assigned_to)
        .await
        .map_err(upstream_failure("work_items"))?;
    tracing::info!(count = ids.len(), "Found work items from WIQL query");

    if ids.is_empty() {
        return Ok(Json(WorkItemsResponse {
            work_items: Vec::new(),
            count: 0,
            filters: None,
        }));
    }

    let work_items: Vec<WorkItemSummary> = state
        .client
        .fetch_details(&settings, &ids, None)
        .await
        .map_err(upstream_failure("work_items"))?
        .into_iter()
        .map(WorkItemSummary::from)
        .filter(|item| in_iteration(&item.iteration, &iteration))
        .collect();
    tracing::info!(count = work_items.len(), "Work items left after filtering");

    Ok(Json(WorkItemsResponse {
        count: work_items.len(),
        work_items,
        filters: Some(Filters {
            assigned_to,
            iteration,
        }),
    }))
}

fn in_iteration(path: &str, filter: &str) -> bool {
    filter.is_empty() || path.contains(filter)
}
