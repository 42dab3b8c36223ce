//! The agent reasoning loop implementation.

use crate::executor::ToolExecutor;
use crate::oracle::{AgentTurn, DecisionOracle, ProviderOracle};
use std::sync::Arc;
use std::time::Duration;
use taskpilot_config::AppConfig;
use taskpilot_core::error::TurnError;
use taskpilot_core::message::{Conversation, Message, ToolCallRequest};
use taskpilot_core::provider::Provider;
use taskpilot_core::tool::ToolRegistry;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Where one run currently stands.
enum LoopState {
    AwaitingDecision,
    ExecutingTools(Vec<ToolCallRequest>),
    Terminated(String),
}

/// Result of a run that ended in an answer.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub answer: String,
    /// Decision cycles used, including the final one.
    pub iterations: u32,
    /// Tool calls executed across all batches.
    pub tool_calls: usize,
}

/// Alternates between the decision oracle and the tool executor until the
/// oracle answers.
pub struct AgentLoop {
    oracle: Arc<dyn DecisionOracle>,

    executor: ToolExecutor,

    /// Maximum decision cycles per run
    max_iterations: u32,
}

impl AgentLoop {
    pub fn new(oracle: Arc<dyn DecisionOracle>, executor: ToolExecutor) -> Self {
        Self {
            oracle,
            executor,
            max_iterations: 25,
        }
    }

    /// Wire a provider-backed loop from configuration.
    pub fn from_config(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        let mut oracle = ProviderOracle::new(provider, &config.default_model, &tools)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_timeout(Duration::from_secs(config.agent.oracle_timeout_secs));
        if let Some(prompt) = &config.agent.system_prompt {
            oracle = oracle.with_system_prompt(prompt);
        }

        let executor =
            ToolExecutor::new(tools).with_timeout(Duration::from_secs(config.agent.tool_timeout_secs));

        Self::new(Arc::new(oracle), executor).with_max_iterations(config.agent.max_iterations)
    }

    /// Set the maximum number of decision cycles.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Drive `conversation` until the oracle answers.
    ///
    /// Only appends to the conversation. Cancellation is observed before each
    /// decision and abandons an in-flight decision; a batch of tool calls
    /// that has started always finishes and has its results recorded.
    pub async fn run(
        &self,
        conversation: &mut Conversation,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome, TurnError> {
        info!(
            conversation_id = %conversation.id,
            messages = conversation.len(),
            "Processing conversation"
        );

        let mut state = LoopState::AwaitingDecision;
        let mut iterations = 0u32;
        let mut tool_calls = 0usize;

        loop {
            state = match state {
                LoopState::AwaitingDecision => {
                    if cancel.is_cancelled() {
                        debug!(conversation_id = %conversation.id, "Run cancelled");
                        return Err(TurnError::Cancelled);
                    }

                    if iterations >= self.max_iterations {
                        warn!(
                            conversation_id = %conversation.id,
                            iterations,
                            "Max decision cycles reached"
                        );
                        return Err(TurnError::LoopBudgetExceeded {
                            max_iterations: self.max_iterations,
                        });
                    }
                    iterations += 1;

                    debug!(
                        conversation_id = %conversation.id,
                        iteration = iterations,
                        "Agent loop iteration"
                    );

                    let turn = tokio::select! {
                        _ = cancel.cancelled() => {
                            debug!(conversation_id = %conversation.id, "Decision abandoned");
                            return Err(TurnError::Cancelled);
                        }
                        turn = self.oracle.decide(conversation.messages()) => turn?,
                    };

                    match turn {
                        AgentTurn::Answer(text) if text.trim().is_empty() => {
                            warn!(conversation_id = %conversation.id, "Model returned an empty answer");
                            return Err(TurnError::EmptyResponse);
                        }
                        AgentTurn::ToolRequest(calls) if calls.is_empty() => {
                            warn!(conversation_id = %conversation.id, "Model requested an empty batch");
                            return Err(TurnError::EmptyResponse);
                        }
                        AgentTurn::Answer(text) => {
                            conversation.push(Message::agent(text.clone()));
                            LoopState::Terminated(text)
                        }
                        AgentTurn::ToolRequest(calls) => {
                            conversation.push(Message::agent_tool_request(calls.clone()));
                            LoopState::ExecutingTools(calls)
                        }
                    }
                }

                LoopState::ExecutingTools(calls) => {
                    debug!(
                        conversation_id = %conversation.id,
                        tool_count = calls.len(),
                        "Executing tool calls"
                    );

                    let results = self.executor.execute_batch(&calls).await;
                    tool_calls += calls.len();
                    for (call, result) in calls.iter().zip(results) {
                        conversation.push(Message::tool_result(call, result));
                    }
                    LoopState::AwaitingDecision
                }

                LoopState::Terminated(answer) => {
                    info!(
                        conversation_id = %conversation.id,
                        iterations,
                        tool_calls,
                        "Run finished"
                    );
                    return Ok(TurnOutcome {
                        answer,
                        iterations,
                        tool_calls,
                    });
                }
            };
        }
    }
}
