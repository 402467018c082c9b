use crate::AppState;
use crate::errors::ApiError;
use crate::headers::Connection;
use crate::metrics_defs::DETAIL_FAILURES;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use azure_devops::shape::{DetailRecord, WorkItemDetail};
use azure_devops::{Client, ClientError, ConnectionSettings};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug)]
pub struct Params {
    /// A single ID or a comma separated list, e.g. `537902,537904`
    work_item_id: String,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum DetailsResponse {
    Single(DetailRecord),
    Many {
        work_items: Vec<DetailRecord>,
        count: usize,
    },
}

/// Full details, comments and children of one or more work items.
///
/// `GET /work-item-details?work_item_id=<id>[,<id>...]`
///
/// Items are fetched one after another. A failing item becomes an
/// `{id, error}` record and does not affect the others. A single requested
/// ID is answered with the bare record.
pub async fn handler(
    State(state): State<AppState>,
    Connection(settings): Connection,
    params: Result<Query<Params>, QueryRejection>,
) -> Result<Json<DetailsResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    let ids: Vec<&str> = params.work_item_id.split(',').map(str::trim).collect();
    tracing::info!(?ids, "Fetching work item details");

    let mut records = Vec::with_capacity(ids.len());
    for id in &ids {
        let record = match fetch_detail(&state.client, &settings, id).await {
            Ok(detail) => DetailRecord::Found(Box::new(detail)),
            Err(err) => {
                tracing::warn!(id, error = %err, "Failed to fetch work item details");
                shared::counter!(DETAIL_FAILURES).increment(1);
                DetailRecord::failed(id, err)
            }
        };
        records.push(record);
    }
    tracing::info!(count = records.len(), "Processed work items");

    if records.len() == 1
        && let Some(record) = records.pop()
    {
        return Ok(Json(DetailsResponse::Single(record)));
    }

    Ok(Json(DetailsResponse::Many {
        count: records.len(),
        work_items: records,
    }))
}

async fn fetch_detail(
    client: &Client,
    settings: &ConnectionSettings,
    id: &str,
) -> Result<WorkItemDetail, ClientError> {
    let item = client.fetch_work_item(settings, id).await?;
    let comments = client.fetch_comments(settings, id).await?;
    let children = client.fetch_children(settings, &item.relations).await?;

    Ok(WorkItemDetail::new(item, comments, children))
}
