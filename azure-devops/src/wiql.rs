//! Work Item Query Language statements.

use serde::Serialize;

pub const ID: &str = "System.Id";
pub const TITLE: &str = "System.Title";
pub const STATE: &str = "System.State";
pub const ASSIGNED_TO: &str = "System.AssignedTo";
pub const ITERATION_PATH: &str = "System.IterationPath";
pub const WORK_ITEM_TYPE: &str = "System.WorkItemType";

/// Fields selected when listing a user's work items.
pub const SUMMARY_FIELDS: &[&str] = &[ID, TITLE, STATE, ASSIGNED_TO, ITERATION_PATH, WORK_ITEM_TYPE];

/// Fields selected when collecting a user's iterations.
pub const ITERATION_FIELDS: &[&str] = &[ID, ITERATION_PATH];

/// Request body of the `wiql` endpoint.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Wiql {
    pub query: String,
}

impl Wiql {
    /// Selects `fields` of every work item assigned to `assignee`.
    ///
    /// Iteration is never part of the statement, callers filter on it after
    /// fetching details.
    pub fn assigned_to(fields: &[&str], assignee: &str) -> Self {
        let columns = fields
            .iter()
            .map(|field| format!("[{field}]"))
            .collect::<Vec<_>>()
            .join(", ");

        Wiql {
            query: format!(
                "SELECT {columns} FROM WorkItems WHERE [{ASSIGNED_TO}] = '{}'",
                quote(assignee)
            ),
        }
    }
}

// WIQL string literals escape a quote by doubling it.
fn quote(value: &str) -> String {
    value.replace('\'', "''")
}
