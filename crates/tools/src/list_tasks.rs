//! `list_tasks`: every task, in id order.

use async_trait::async_trait;
use std::sync::Arc;
use taskpilot_core::error::ToolError;
use taskpilot_core::task::{TaskFilter, TaskStore};
use taskpilot_core::tool::{Tool, ToolResult};

pub struct ListTasksTool {
    store: Arc<dyn TaskStore>,
}

impl ListTasksTool {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for ListTasksTool {
    fn name(&self) -> &str {
        "list_tasks"
    }

    fn description(&self) -> &str {
        "Lists all tasks."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let tasks = self.store.list(TaskFilter::default()).await?;
        Ok(ToolResult::TaskList { tasks })
    }
}
