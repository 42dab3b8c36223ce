//! `delete_task`: remove a task by id, or the first whose title matches.

use async_trait::async_trait;
use std::sync::Arc;
use taskpilot_core::error::ToolError;
use taskpilot_core::task::{DeleteTarget, TaskStore};
use taskpilot_core::tool::{Tool, ToolResult};
use tracing::debug;
use crate::args::Args;

pub struct DeleteTaskTool {
    store: Arc<dyn TaskStore>,
}

impl DeleteTaskTool {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for DeleteTaskTool {
    fn name(&self) -> &str {
        "delete_task"
    }

    fn description(&self) -> &str {
        "Deletes a task by ID or matching title. Provide either task_id or title."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "task_id": { "type": "integer" },
                "title": {
                    "type": "string",
                    "description": "Text contained in the task title (case-insensitive)"
                }
            }
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args = Args::new(&arguments)?;
        // Id 0 never names a task; treat it as "not given" so a title still applies.
        let task_id = args.opt_id("task_id")?.filter(|id| *id != 0);
        let target = match (task_id, args.opt_str("title")?) {
            (Some(id), _) => DeleteTarget::Id(id),
            (None, Some(title)) => DeleteTarget::TitleContains(title),
            (None, None) => {
                return Ok(ToolResult::error(
                    "You must provide either a task ID or a title to delete.",
                ));
            }
        };

        let deleted = self.store.delete(target).await?;
        debug!(deleted, "delete_task");

        if deleted {
            Ok(ToolResult::info("Task successfully deleted."))
        } else {
            Ok(ToolResult::error("Task not found."))
        }
    }
}
