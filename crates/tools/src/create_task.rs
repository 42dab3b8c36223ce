//! `create_task`: add a task to the store.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use taskpilot_core::error::ToolError;
use taskpilot_core::task::{NewTask, TaskStore};
use taskpilot_core::tool::{Tool, ToolResult};
use tracing::debug;
use crate::args::Args;

pub struct CreateTaskTool {
    store: Arc<dyn TaskStore>,
}

impl CreateTaskTool {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CreateTaskTool {
    fn name(&self) -> &str {
        "create_task"
    }

    fn description(&self) -> &str {
        "Creates a new task with a title and optional description, due date, and priority."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Short title of the task"
                },
                "description": {
                    "type": "string",
                    "description": "Longer free-form details"
                },
                "due_date": {
                    "type": "string",
                    "description": "When the task is due, e.g. '2026-03-14 17:00', 'tomorrow', 'next friday'"
                },
                "priority": {
                    "type": "string",
                    "enum": ["low", "medium", "high"],
                    "description": "Defaults to medium"
                }
            },
            "required": ["title"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args = Args::new(&arguments)?;
        let new_task = NewTask {
            title: args.required_str("title")?,
            description: args.opt_str("description")?,
            priority: args.priority()?.unwrap_or_default(),
            due_date: args.due_date(Utc::now())?,
            ..NewTask::default()
        };

        let task = self.store.create(new_task).await?;
        debug!(task_id = task.id, "create_task");

        Ok(ToolResult::info(format!(
            "Task '{}' created successfully with ID {}.",
            task.title, task.id
        )))
    }
}
