//! Partial schemas of the upstream payloads. Only the fields the gateway reads
//! are modelled, everything else is ignored.

use serde::Deserialize;

/// Relation type of a parent to child link.
pub const HIERARCHY_FORWARD: &str = "System.LinkTypes.Hierarchy-Forward";

pub type WorkItemId = u64;

#[derive(Debug, Deserialize)]
pub struct WiqlResult {
    #[serde(rename = "workItems", default)]
    pub work_items: Vec<WorkItemReference>,
}

#[derive(Debug, Deserialize)]
pub struct WorkItemReference {
    pub id: WorkItemId,
}

#[derive(Debug, Deserialize)]
pub struct WorkItemList {
    #[serde(default)]
    pub value: Vec<WorkItem>,
}

#[derive(Debug, Deserialize)]
pub struct WorkItem {
    pub id: WorkItemId,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Fields {
    #[serde(rename = "System.Title")]
    pub title: Option<String>,
    #[serde(rename = "System.State")]
    pub state: Option<String>,
    #[serde(rename = "System.WorkItemType")]
    pub work_item_type: Option<String>,
    #[serde(rename = "System.AssignedTo")]
    pub assigned_to: Option<IdentityRef>,
    #[serde(rename = "System.CreatedBy")]
    pub created_by: Option<IdentityRef>,
    #[serde(rename = "System.CreatedDate")]
    pub created_date: Option<String>,
    #[serde(rename = "System.ChangedDate")]
    pub changed_date: Option<String>,
    #[serde(rename = "System.IterationPath")]
    pub iteration_path: Option<String>,
    #[serde(rename = "System.AreaPath")]
    pub area_path: Option<String>,
    #[serde(rename = "System.Description")]
    pub description: Option<String>,
    #[serde(rename = "Microsoft.VSTS.Common.AcceptanceCriteria")]
    pub acceptance_criteria: Option<String>,
    #[serde(rename = "Microsoft.VSTS.Common.Priority")]
    pub priority: Option<i64>,
    #[serde(rename = "Microsoft.VSTS.Scheduling.StoryPoints")]
    pub story_points: Option<f64>,
    #[serde(rename = "System.Tags")]
    pub tags: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IdentityRef {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Relation {
    #[serde(default)]
    pub rel: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentList {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
pub struct Comment {
    pub id: u64,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "createdBy")]
    pub created_by: Option<IdentityRef>,
    #[serde(rename = "createdDate")]
    pub created_date: Option<String>,
}

/// Display name of an optional identity, as the gateway reports it.
pub fn display_name(identity: Option<&IdentityRef>) -> Option<String> {
    identity.and_then(|i| i.display_name.clone())
}
