//! Maps one inbound chat message to exactly one outbound reply.

use crate::loop_runner::AgentLoop;
use taskpilot_core::error::TurnError;
use taskpilot_core::message::Conversation;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Sent when the model produced nothing usable.
pub const NO_RESPONSE: &str = "No response from AI agent.";

/// Run one turn for `text` in a fresh conversation and render the reply.
///
/// Returns `None` only when the turn was cancelled; the channel is gone and
/// nothing should be sent.
pub async fn reply(agent: &AgentLoop, text: &str, cancel: &CancellationToken) -> Option<String> {
    let mut conversation = Conversation::seeded(text);
    match agent.run(&mut conversation, cancel).await {
        Ok(outcome) => Some(outcome.answer),
        Err(TurnError::Cancelled) => None,
        Err(e) => {
            warn!(conversation_id = %conversation.id, error = %e, "Turn ended without an answer");
            Some(diagnostic(&e))
        }
    }
}

/// The user-facing text for a failed turn.
pub fn diagnostic(error: &TurnError) -> String {
    match error {
        TurnError::EmptyResponse => NO_RESPONSE.to_string(),
        TurnError::LoopBudgetExceeded { max_iterations } => format!(
            "I've reached the maximum number of tool call iterations ({max_iterations}). \
             Please provide further guidance."
        ),
        other => format!("AI agent error: {other}"),
    }
}
