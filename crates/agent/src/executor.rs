//! Runs one batch of tool calls.

use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use taskpilot_core::error::ToolError;
use taskpilot_core::message::ToolCallRequest;
use taskpilot_core::tool::{ToolRegistry, ToolResult};
use tokio::task::JoinError;
use tracing::{debug, warn};

/// Executes batches of tool calls against a fixed registry.
///
/// Never fails as a whole: every request yields exactly one [`ToolResult`],
/// and results come back in request order.
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(30),
        }
    }

    /// Upper bound on a single call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run every call of the batch concurrently.
    ///
    /// Calls are spawned up front, so they run to completion even if the
    /// returned future is dropped.
    pub async fn execute_batch(&self, calls: &[ToolCallRequest]) -> Vec<ToolResult> {
        let handles: Vec<_> = calls
            .iter()
            .map(|call| {
                let tool = self.registry.resolve(&call.tool_name);
                let arguments = serde_json::Value::Object(call.arguments.clone());
                let timeout = self.timeout;
                tokio::spawn(async move {
                    let Some(tool) = tool else {
                        return None;
                    };
                    let started = Instant::now();
                    let outcome = tokio::time::timeout(timeout, tool.execute(arguments))
                        .await
                        .unwrap_or_else(|_| {
                            Err(ToolError::Timeout {
                                timeout_secs: timeout.as_secs(),
                            })
                        });
                    Some((outcome, started.elapsed()))
                })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .zip(calls)
            .map(|(joined, call)| settle(call, joined))
            .collect()
    }
}

type Joined = Result<Option<(Result<ToolResult, ToolError>, Duration)>, JoinError>;

/// Turn one call's outcome into the result fed back to the model.
fn settle(call: &ToolCallRequest, joined: Joined) -> ToolResult {
    let name = call.tool_name.as_str();
    match joined {
        Ok(None) => {
            warn!(tool = name, "Unknown tool requested");
            ToolResult::error(ToolError::NotFound(name.to_string()).to_string())
        }
        Ok(Some((Ok(result), elapsed))) => {
            debug!(
                tool = name,
                call_id = %call.id,
                duration_ms = elapsed.as_millis() as u64,
                is_error = result.is_error(),
                "Tool call finished"
            );
            result
        }
        Ok(Some((Err(e), _))) if e.is_rejection() => {
            debug!(tool = name, error = %e, "Tool rejected arguments");
            ToolResult::error(e.to_string())
        }
        Ok(Some((Err(e), elapsed))) => {
            warn!(
                tool = name,
                duration_ms = elapsed.as_millis() as u64,
                error = %e,
                "Tool call failed"
            );
            execution_error(name, e)
        }
        Err(join_error) => {
            let detail = match join_error.try_into_panic() {
                Ok(payload) => panic_message(payload.as_ref()),
                Err(e) => e.to_string(),
            };
            warn!(tool = name, detail = %detail, "Tool call panicked");
            execution_error(name, detail)
        }
    }
}

fn execution_error(name: &str, detail: impl std::fmt::Display) -> ToolResult {
    ToolResult::error(format!("Error executing tool '{name}': {detail}"))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{call, PanickingTool, SlowTool};
    use serde_json::json;
    use taskpilot_core::task::{NewTask, TaskPriority, TaskStatus, TaskStore};
    use taskpilot_store::{InMemoryTaskStore, SqliteTaskStore};

    fn task_registry(store: Arc<InMemoryTaskStore>) -> Arc<ToolRegistry> {
        Arc::new(taskpilot_tools::default_registry(store).unwrap())
    }

    #[tokio::test]
    async fn unknown_tool_does_not_affect_neighbours() {
        let store = Arc::new(InMemoryTaskStore::new());
        let executor = ToolExecutor::new(task_registry(store.clone()));

        let results = executor
            .execute_batch(&[
                call("c1", "create_task", json!({"title": "A"})),
                call("c2", "foo_tool", json!({})),
            ])
            .await;

        assert_eq!(results.len(), 2);
        assert!(!results[0].is_error());
        assert!(results[0].summary().contains("created successfully"));
        assert_eq!(results[1], ToolResult::error("Tool 'foo_tool' not found"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn results_keep_request_order_despite_failures() {
        let store = Arc::new(InMemoryTaskStore::new());
        let executor = ToolExecutor::new(task_registry(store.clone()));

        let calls = vec![
            call("c1", "create_task", json!({"title": "first"})),
            call("c2", "create_task", json!({"title": "bad", "priority": "urgent"})),
            call("c3", "nope", json!({})),
            call("c4", "update_task", json!({"task_id": 999, "status": "done"})),
            call("c5", "list_tasks", json!({})),
        ];
        let results = executor.execute_batch(&calls).await;

        assert_eq!(results.len(), calls.len());
        assert!(!results[0].is_error());
        assert_eq!(results[1], ToolResult::error("Invalid priority: urgent"));
        assert_eq!(results[2], ToolResult::error("Tool 'nope' not found"));
        assert_eq!(results[3], ToolResult::error("Task with ID 999 not found."));
        assert!(!results[4].is_error());
    }

    #[tokio::test]
    async fn invalid_priority_leaves_store_untouched() {
        let store = Arc::new(InMemoryTaskStore::new());
        let executor = ToolExecutor::new(task_registry(store.clone()));
        let before = store.mutations();

        let results = executor
            .execute_batch(&[call("c1", "create_task", json!({"title": "x", "priority": "urgent"}))])
            .await;

        assert_eq!(results[0], ToolResult::error("Invalid priority: urgent"));
        assert_eq!(store.mutations(), before);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_tasks_twice_is_identical() {
        let store = Arc::new(InMemoryTaskStore::new());
        let executor = ToolExecutor::new(task_registry(store.clone()));
        executor
            .execute_batch(&[
                call("c1", "create_task", json!({"title": "one"})),
                call("c2", "create_task", json!({"title": "two", "priority": "high"})),
            ])
            .await;

        let first = executor.execute_batch(&[call("l1", "list_tasks", json!({}))]).await;
        let second = executor.execute_batch(&[call("l2", "list_tasks", json!({}))]).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn created_task_is_listed_with_defaults() {
        let store = Arc::new(InMemoryTaskStore::new());
        let executor = ToolExecutor::new(task_registry(store.clone()));

        executor
            .execute_batch(&[call("c1", "create_task", json!({"title": "Buy milk"}))])
            .await;
        let results = executor.execute_batch(&[call("l1", "list_tasks", json!({}))]).await;

        let ToolResult::TaskList { tasks } = &results[0] else {
            panic!("expected a task list, got {:?}", results[0]);
        };
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy milk");
        assert_eq!(tasks[0].status, TaskStatus::Todo);
        assert_eq!(tasks[0].priority, TaskPriority::Medium);
    }

    #[tokio::test]
    async fn sibling_updates_of_one_sqlite_task_both_apply() {
        let store: Arc<dyn TaskStore> =
            Arc::new(SqliteTaskStore::new("sqlite::memory:").await.unwrap());
        let registry = Arc::new(taskpilot_tools::default_registry(store.clone()).unwrap());
        let executor = ToolExecutor::new(registry);

        for _ in 0..10 {
            let task = store.create(NewTask::titled("Pay rent")).await.unwrap();
            let results = executor
                .execute_batch(&[
                    call("u1", "update_task", json!({"task_id": task.id, "status": "done"})),
                    call("u2", "update_task", json!({"task_id": task.id, "priority": "high"})),
                ])
                .await;

            let expected = ToolResult::info(format!("Task {} updated successfully.", task.id));
            assert_eq!(results, vec![expected.clone(), expected]);

            let stored = store.get(task.id).await.unwrap().unwrap();
            assert_eq!(stored.status, TaskStatus::Done);
            assert_eq!(stored.priority, TaskPriority::High);
        }
    }

    #[tokio::test]
    async fn panic_is_contained() {
        let registry = ToolRegistry::builder().with_tool(PanickingTool).build().unwrap();
        let executor = ToolExecutor::new(Arc::new(registry));

        let results = executor
            .execute_batch(&[call("c1", "explode", json!({})), call("c2", "missing", json!({}))])
            .await;

        assert_eq!(results.len(), 2);
        let ToolResult::Error { message } = &results[0] else {
            panic!("expected an error result");
        };
        assert!(message.starts_with("Error executing tool 'explode': panicked"));
        assert_eq!(results[1], ToolResult::error("Tool 'missing' not found"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_tool_times_out() {
        let registry = ToolRegistry::builder()
            .with_tool(SlowTool(Duration::from_secs(60)))
            .build()
            .unwrap();
        let executor = ToolExecutor::new(Arc::new(registry)).with_timeout(Duration::from_secs(2));

        let results = executor.execute_batch(&[call("c1", "slow", json!({}))]).await;
        assert_eq!(
            results[0],
            ToolResult::error("Error executing tool 'slow': timed out after 2s")
        );
    }

    #[tokio::test]
    async fn empty_batch_yields_nothing() {
        let executor = ToolExecutor::new(Arc::new(ToolRegistry::empty()));
        assert!(executor.execute_batch(&[]).await.is_empty());
    }
}
