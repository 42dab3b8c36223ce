//! Shared test doubles for the agent crate.

use crate::oracle::{AgentTurn, DecisionOracle};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use taskpilot_core::error::{OracleError, ToolError};
use taskpilot_core::message::{Message, ToolCallRequest};
use taskpilot_core::tool::{Tool, ToolResult};

/// Build a tool call from a JSON object literal.
pub fn call(id: &str, name: &str, arguments: Value) -> ToolCallRequest {
    let arguments = match arguments {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    ToolCallRequest::new(id, name, arguments)
}

/// An oracle that plays back a fixed script of decisions.
///
/// Panics if asked for more decisions than it was given.
pub struct ScriptedOracle {
    script: Mutex<VecDeque<Result<AgentTurn, OracleError>>>,
    seen: Mutex<Vec<usize>>,
}

impl ScriptedOracle {
    pub fn new(script: Vec<Result<AgentTurn, OracleError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn turns(turns: Vec<AgentTurn>) -> Self {
        Self::new(turns.into_iter().map(Ok).collect())
    }

    /// History lengths observed at each decision.
    pub fn history_lengths(&self) -> Vec<usize> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl DecisionOracle for ScriptedOracle {
    async fn decide(&self, history: &[Message]) -> Result<AgentTurn, OracleError> {
        self.seen.lock().unwrap().push(history.len());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("ScriptedOracle: script exhausted at history length {}", history.len()))
    }
}

/// An oracle that requests `list_tasks` forever.
#[derive(Default)]
pub struct AlwaysToolOracle {
    calls: AtomicUsize,
}

impl AlwaysToolOracle {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DecisionOracle for AlwaysToolOracle {
    async fn decide(&self, _history: &[Message]) -> Result<AgentTurn, OracleError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AgentTurn::ToolRequest(vec![call(
            &format!("call_{n}"),
            "list_tasks",
            Value::Object(Default::default()),
        )]))
    }
}

/// An oracle that never answers.
pub struct StalledOracle;

#[async_trait]
impl DecisionOracle for StalledOracle {
    async fn decide(&self, _history: &[Message]) -> Result<AgentTurn, OracleError> {
        std::future::pending().await
    }
}

/// A tool whose execution panics.
pub struct PanickingTool;

#[async_trait]
impl Tool for PanickingTool {
    fn name(&self) -> &str {
        "explode"
    }

    fn description(&self) -> &str {
        "Always panics"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _arguments: Value) -> Result<ToolResult, ToolError> {
        panic!("boom")
    }
}

/// A tool that sleeps before answering.
pub struct SlowTool(pub Duration);

#[async_trait]
impl Tool for SlowTool {
    fn name(&self) -> &str {
        "slow"
    }

    fn description(&self) -> &str {
        "Sleeps, then succeeds"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _arguments: Value) -> Result<ToolResult, ToolError> {
        tokio::time::sleep(self.0).await;
        Ok(ToolResult::info("done"))
    }
}
