//! Tool trait and the registry of operations the model may request.
//!
//! Tools are registered once at startup into an immutable [`ToolRegistry`]
//! that is shared read-only by every session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use crate::error::ToolError;
use crate::provider::ToolDefinition;
use crate::task::Task;

/// Outcome of one tool call, as fed back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolResult {
    Info { message: String },
    Error { message: String },
    TaskList { tasks: Vec<Task> },
}

impl ToolResult {
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// One-line description used in logs.
    pub fn summary(&self) -> String {
        match self {
            Self::Info { message } => message.clone(),
            Self::Error { message } => format!("error: {message}"),
            Self::TaskList { tasks } => format!("{} task(s)", tasks.len()),
        }
    }
}

/// The core Tool trait.
///
/// `execute` must validate and coerce its arguments before touching the
/// store, returning [`ToolError::InvalidArgument`] on a bad value.
/// Domain-level misses (e.g. unknown task id) are `Ok(ToolResult::Error)`.
#[async_trait]
pub trait Tool: Send + Sync + 'static {
    /// The unique name of this tool (e.g., "create_task").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Collects tools before the registry is frozen.
#[derive(Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistryBuilder {
    pub fn with_tool(mut self, tool: impl Tool) -> Self {
        self.tools.push(Arc::new(tool));
        self
    }

    /// Freeze the registry. Fails if two tools share a name.
    pub fn build(self) -> std::result::Result<ToolRegistry, ToolError> {
        let mut tools = HashMap::with_capacity(self.tools.len());
        for tool in self.tools {
            let name = tool.name().to_string();
            if tools.insert(name.clone(), tool).is_some() {
                return Err(ToolError::DuplicateName(name));
            }
        }
        Ok(ToolRegistry { tools })
    }
}

/// A fixed mapping from tool name to tool.
///
/// The agent loop uses this to:
/// 1. Get tool definitions to send to the LLM
/// 2. Resolve tools when the LLM requests them
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// An empty registry; every lookup misses.
    pub fn empty() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Look up a tool by exact name.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// All tool definitions, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<_> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// List all registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
