//! `update_task`: change fields of an existing task.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use taskpilot_core::error::ToolError;
use taskpilot_core::task::{TaskStore, TaskUpdate};
use taskpilot_core::tool::{Tool, ToolResult};
use tracing::debug;
use crate::args::Args;

pub struct UpdateTaskTool {
    store: Arc<dyn TaskStore>,
}

impl UpdateTaskTool {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for UpdateTaskTool {
    fn name(&self) -> &str {
        "update_task"
    }

    fn description(&self) -> &str {
        "Updates a task by ID. Fields you can update: title, description, status, due_date, priority."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "task_id": { "type": "integer" },
                "title": { "type": "string" },
                "description": { "type": "string" },
                "status": {
                    "type": "string",
                    "enum": ["todo", "in_progress", "done"]
                },
                "due_date": {
                    "type": "string",
                    "description": "e.g. '2026-03-14', 'in 2 days', 'friday at 5pm'"
                },
                "priority": {
                    "type": "string",
                    "enum": ["low", "medium", "high"]
                }
            },
            "required": ["task_id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args = Args::new(&arguments)?;
        let task_id = args.required_id("task_id")?;
        let update = TaskUpdate {
            title: args.opt_str("title")?,
            description: args.opt_str("description")?,
            status: args.status()?,
            priority: args.priority()?,
            due_date: args.due_date(Utc::now())?,
        };

        // Nothing to change: report on existence without touching the row.
        let found = if update.is_empty() {
            self.store.get(task_id).await?.is_some()
        } else {
            self.store.update(task_id, update).await?.is_some()
        };
        debug!(task_id, found, "update_task");

        if found {
            Ok(ToolResult::info(format!("Task {task_id} updated successfully.")))
        } else {
            Ok(ToolResult::error(format!("Task with ID {task_id} not found.")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskpilot_core::task::{NewTask, TaskPriority, TaskStatus};
    use taskpilot_store::InMemoryTaskStore;

    #[tokio::test]
    async fn updates_selected_fields() {
        let store = Arc::new(InMemoryTaskStore::new());
        store.create(NewTask::titled("Write report")).await.unwrap();
        let tool = UpdateTaskTool::new(store.clone());

        let result = tool
            .execute(json!({"task_id": 1, "status": "in progress", "priority": "low"}))
            .await
            .unwrap();
        assert_eq!(result, ToolResult::info("Task 1 updated successfully."));

        let task = store.get(1).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::Low);
        assert_eq!(task.title, "Write report");
    }

    #[tokio::test]
    async fn unknown_id_is_a_domain_error() {
        let store = Arc::new(InMemoryTaskStore::new());
        let tool = UpdateTaskTool::new(store);
        let result = tool.execute(json!({"task_id": 9, "title": "x"})).await.unwrap();
        assert_eq!(result, ToolResult::error("Task with ID 9 not found."));
    }

    #[tokio::test]
    async fn bad_status_leaves_task_untouched() {
        let store = Arc::new(InMemoryTaskStore::new());
        store.create(NewTask::titled("Write report")).await.unwrap();
        let tool = UpdateTaskTool::new(store.clone());

        let err = tool
            .execute(json!({"task_id": 1, "title": "Renamed", "status": "paused"}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid status: paused");
        assert_eq!(store.get(1).await.unwrap().unwrap().title, "Write report");
        assert_eq!(store.mutations(), 1);
    }

    #[tokio::test]
    async fn string_task_id_is_accepted() {
        let store = Arc::new(InMemoryTaskStore::new());
        store.create(NewTask::titled("a")).await.unwrap();
        let tool = UpdateTaskTool::new(store);
        let result = tool.execute(json!({"task_id": "1", "status": "done"})).await.unwrap();
        assert!(!result.is_error());
    }
}
