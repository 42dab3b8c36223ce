//! `filter_tasks`: tasks matching a status and/or priority.

use async_trait::async_trait;
use std::sync::Arc;
use taskpilot_core::error::ToolError;
use taskpilot_core::task::{TaskFilter, TaskStore};
use taskpilot_core::tool::{Tool, ToolResult};
use crate::args::Args;

pub struct FilterTasksTool {
    store: Arc<dyn TaskStore>,
}

impl FilterTasksTool {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for FilterTasksTool {
    fn name(&self) -> &str {
        "filter_tasks"
    }

    fn description(&self) -> &str {
        "Filters tasks by status or priority. Omit both to get every task."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "status": {
                    "type": "string",
                    "enum": ["todo", "in_progress", "done"]
                },
                "priority": {
                    "type": "string",
                    "enum": ["low", "medium", "high"]
                }
            }
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args = Args::new(&arguments)?;
        let filter = TaskFilter {
            status: args.status()?,
            priority: args.priority()?,
        };

        let tasks = self.store.list(filter).await?;
        Ok(ToolResult::TaskList { tasks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskpilot_core::task::{NewTask, TaskPriority, TaskStatus};
    use taskpilot_store::InMemoryTaskStore;

    async fn seeded() -> Arc<InMemoryTaskStore> {
        let store = Arc::new(InMemoryTaskStore::new());
        store.create(NewTask { priority: TaskPriority::High, ..NewTask::titled("urgent fix") }).await.unwrap();
        store.create(NewTask { status: TaskStatus::Done, ..NewTask::titled("old chore") }).await.unwrap();
        store.create(NewTask::titled("plain")).await.unwrap();
        store
    }

    fn titles(result: ToolResult) -> Vec<String> {
        match result {
            ToolResult::TaskList { tasks } => tasks.into_iter().map(|t| t.title).collect(),
            other => panic!("expected a task list, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn filters_by_priority() {
        let tool = FilterTasksTool::new(seeded().await);
        let result = tool.execute(json!({"priority": "high"})).await.unwrap();
        assert_eq!(titles(result), vec!["urgent fix"]);
    }

    #[tokio::test]
    async fn filters_by_status_leniently() {
        let tool = FilterTasksTool::new(seeded().await);
        let result = tool.execute(json!({"status": "Done"})).await.unwrap();
        assert_eq!(titles(result), vec!["old chore"]);

        let result = tool.execute(json!({"status": "todo", "priority": "medium"})).await.unwrap();
        assert_eq!(titles(result), vec!["plain"]);
    }

    #[tokio::test]
    async fn invalid_status_is_rejected() {
        let tool = FilterTasksTool::new(seeded().await);
        let err = tool.execute(json!({"status": "blocked"})).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid status: blocked");
    }
}
