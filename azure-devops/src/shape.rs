//! Flattens upstream work items into the gateway's response records.

use crate::types::{self, HIERARCHY_FORWARD, Relation, WorkItem, WorkItemId, display_name};
use serde::Serialize;

// Applied in order. Child descriptions stop before `&nbsp;`.
const MARKUP_REPLACEMENTS: &[(&str, &str)] = &[
    ("<div>", ""),
    ("</div>", ""),
    ("<br>", "\n"),
    ("&nbsp;", " "),
];
const CHILD_MARKUP_REPLACEMENTS: &[(&str, &str)] = &[("<div>", ""), ("</div>", ""), ("<br>", "\n")];

const WORK_ITEMS_SEGMENT: &str = "/workItems/";

/// Removes the handful of HTML fragments the upstream rich text editor emits.
pub fn clean_html(text: &str) -> String {
    replace_all(text, MARKUP_REPLACEMENTS)
}

/// Like [`clean_html`] but leaves `&nbsp;` in place.
pub fn clean_child_html(text: &str) -> String {
    replace_all(text, CHILD_MARKUP_REPLACEMENTS)
}

fn replace_all(text: &str, replacements: &[(&str, &str)]) -> String {
    replacements
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Last `\` separated segment of an iteration path.
pub fn iteration_name(path: &str) -> &str {
    path.rsplit('\\').next().unwrap_or(path)
}

pub fn iteration_is_active(path: &str) -> bool {
    path.contains("Active")
}

/// IDs of the children linked from `relations`, in relation order.
///
/// Only forward hierarchy links count; the ID is whatever follows the last
/// `/workItems/` of the related URL.
pub fn child_ids(relations: &[Relation]) -> Vec<String> {
    relations
        .iter()
        .filter(|relation| relation.rel == HIERARCHY_FORWARD)
        .filter_map(|relation| {
            relation
                .url
                .rsplit_once(WORK_ITEMS_SEGMENT)
                .map(|(_, id)| id.to_string())
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkItemSummary {
    pub id: WorkItemId,
    pub title: Option<String>,
    pub state: Option<String>,
    pub assigned_to: Option<String>,
    pub work_item_type: Option<String>,
    pub iteration: String,
    pub created_date: Option<String>,
    pub url: String,
}

impl From<WorkItem> for WorkItemSummary {
    fn from(item: WorkItem) -> Self {
        let fields = item.fields;
        WorkItemSummary {
            id: item.id,
            assigned_to: display_name(fields.assigned_to.as_ref()),
            title: fields.title,
            state: fields.state,
            work_item_type: fields.work_item_type,
            iteration: fields.iteration_path.unwrap_or_default(),
            created_date: fields.created_date,
            url: item.url,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Comment {
    pub id: u64,
    pub text: String,
    pub created_by: Option<String>,
    pub created_date: Option<String>,
}

impl From<types::Comment> for Comment {
    fn from(comment: types::Comment) -> Self {
        Comment {
            id: comment.id,
            created_by: display_name(comment.created_by.as_ref()),
            text: comment.text,
            created_date: comment.created_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChildSummary {
    pub id: WorkItemId,
    pub title: Option<String>,
    pub state: Option<String>,
    pub work_item_type: Option<String>,
    pub assigned_to: Option<String>,
    pub description: Option<String>,
}

impl From<WorkItem> for ChildSummary {
    fn from(item: WorkItem) -> Self {
        let fields = item.fields;
        ChildSummary {
            id: item.id,
            assigned_to: display_name(fields.assigned_to.as_ref()),
            title: fields.title,
            state: fields.state,
            work_item_type: fields.work_item_type,
            description: fields
                .description
                .filter(|d| !d.is_empty())
                .map(|d| clean_child_html(&d)),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkItemDetail {
    pub id: WorkItemId,
    pub title: Option<String>,
    pub description: String,
    pub acceptance_criteria: String,
    pub state: Option<String>,
    pub work_item_type: Option<String>,
    pub assigned_to: Option<String>,
    pub created_by: Option<String>,
    pub created_date: Option<String>,
    pub changed_date: Option<String>,
    pub iteration: Option<String>,
    pub area: Option<String>,
    pub priority: Option<i64>,
    pub story_points: Option<f64>,
    pub tags: Option<String>,
    pub comments: Vec<Comment>,
    pub child_work_items: Vec<ChildSummary>,
    pub child_count: usize,
    pub url: String,
}

impl WorkItemDetail {
    pub fn new(item: WorkItem, comments: Vec<types::Comment>, children: Vec<WorkItem>) -> Self {
        let fields = item.fields;
        let child_work_items: Vec<ChildSummary> =
            children.into_iter().map(ChildSummary::from).collect();

        WorkItemDetail {
            id: item.id,
            title: fields.title,
            description: clean_html(fields.description.as_deref().unwrap_or_default()),
            acceptance_criteria: clean_html(
                fields.acceptance_criteria.as_deref().unwrap_or_default(),
            ),
            state: fields.state,
            work_item_type: fields.work_item_type,
            assigned_to: display_name(fields.assigned_to.as_ref()),
            created_by: display_name(fields.created_by.as_ref()),
            created_date: fields.created_date,
            changed_date: fields.changed_date,
            iteration: fields.iteration_path,
            area: fields.area_path,
            priority: fields.priority,
            story_points: fields.story_points,
            tags: fields.tags,
            comments: comments.into_iter().map(Comment::from).collect(),
            child_count: child_work_items.len(),
            child_work_items,
            url: item.url,
        }
    }
}

/// One entry of a work item details response.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum DetailRecord {
    Found(Box<WorkItemDetail>),
    Failed { id: String, error: String },
}

impl DetailRecord {
    pub fn failed(id: &str, error: impl std::fmt::Display) -> Self {
        DetailRecord::Failed {
            id: id.to_string(),
            error: format!("Failed to fetch details: {error}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Iteration {
    pub path: String,
    pub name: String,
    pub is_active: bool,
}

impl From<String> for Iteration {
    fn from(path: String) -> Self {
        Iteration {
            name: iteration_name(&path).to_string(),
            is_active: iteration_is_active(&path),
            path,
        }
    }
}
