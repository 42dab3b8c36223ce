//! Task tools for TaskPilot.
//!
//! The five operations the model may request: create, list, filter,
//! update, and delete tasks. Each tool validates and coerces its arguments
//! (priority, status, natural-language due dates) before it touches the
//! store, so a rejected call never mutates anything.

pub mod args;
pub mod due_date;

pub mod create_task;
pub mod delete_task;
pub mod filter_tasks;
pub mod list_tasks;
pub mod update_task;

use std::sync::Arc;
use taskpilot_core::error::ToolError;
use taskpilot_core::task::TaskStore;
use taskpilot_core::tool::ToolRegistry;

pub use create_task::CreateTaskTool;
pub use delete_task::DeleteTaskTool;
pub use filter_tasks::FilterTasksTool;
pub use list_tasks::ListTasksTool;
pub use update_task::UpdateTaskTool;

/// Build the registry of all task tools over `store`.
pub fn default_registry(store: Arc<dyn TaskStore>) -> Result<ToolRegistry, ToolError> {
    ToolRegistry::builder()
        .with_tool(CreateTaskTool::new(store.clone()))
        .with_tool(ListTasksTool::new(store.clone()))
        .with_tool(FilterTasksTool::new(store.clone()))
        .with_tool(UpdateTaskTool::new(store.clone()))
        .with_tool(DeleteTaskTool::new(store))
        .build()
}
