//! Listing remote tasks in priority order.

use super::{CommandResult, json_string};
use crate::Result;
use crate::api::TaskApi;
use crate::models::priority::{priority_score, sort_by_priority};
use crate::models::{RemoteTask, StatusFilter};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    pub status: StatusFilter,
    pub count: usize,
    /// Most important first
    pub tasks: Vec<RemoteTask>,
}

impl CommandResult for ListResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        if self.tasks.is_empty() {
            return format!("No {} tasks.", self.status);
        }

        let mut lines = vec![format!("{} {} tasks:\n", self.count, self.status)];
        for task in &self.tasks {
            let bucket = task.urgency_bucket();
            let category = task.category.as_deref().unwrap_or("-");
            lines.push(format!(
                "  {} [{:9}] {:>5.2}  {}  ({})",
                bucket.icon(),
                bucket,
                priority_score(task),
                task.title,
                category
            ));
        }
        lines.join("\n")
    }
}

/// Fetch tasks with the given status and order them by priority.
pub fn list(api: &dyn TaskApi, status: StatusFilter) -> Result<ListResult> {
    let mut tasks = api.list_tasks(status)?;
    sort_by_priority(&mut tasks);
    Ok(ListResult {
        status,
        count: tasks.len(),
        tasks,
    })
}
