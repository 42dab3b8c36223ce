//! The decision step: given the history, answer or request tools.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use taskpilot_core::error::OracleError;
use taskpilot_core::message::{Message, ToolCallRequest};
use taskpilot_core::provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
use taskpilot_core::tool::ToolRegistry;
use tracing::{debug, warn};

/// One well-formed decision.
///
/// A response either carries tool requests or it does not; there is no
/// mixed form.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentTurn {
    Answer(String),
    ToolRequest(Vec<ToolCallRequest>),
}

/// Anything that can make the decision step. The model-backed
/// implementation is [`ProviderOracle`]; tests script their own.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    async fn decide(&self, history: &[Message]) -> Result<AgentTurn, OracleError>;
}

/// A [`DecisionOracle`] backed by an LLM [`Provider`].
///
/// The system prompt is sent with every request but never becomes part of
/// the conversation.
pub struct ProviderOracle {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    system_prompt: String,
    tools: Vec<ToolDefinition>,
    timeout: Duration,
}

impl ProviderOracle {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, tools: &ToolRegistry) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            system_prompt: default_system_prompt(Utc::now().date_naive()),
            tools: tools.definitions(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Upper bound on one provider call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl DecisionOracle for ProviderOracle {
    async fn decide(&self, history: &[Message]) -> Result<AgentTurn, OracleError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            system_prompt: Some(self.system_prompt.clone()),
            messages: history.to_vec(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: self.tools.clone(),
        };

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| {
                warn!(provider = self.provider.name(), "Model call timed out");
                OracleError::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                }
            })??;

        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Model responded"
            );
        }

        interpret(response)
    }
}

/// Validate a raw provider response into an [`AgentTurn`].
///
/// Every tool call needs a name and arguments that form a JSON object
/// (an empty string counts as `{}`). Calls without an id get `call_<index>`.
pub fn interpret(response: ProviderResponse) -> Result<AgentTurn, OracleError> {
    if response.tool_calls.is_empty() {
        return Ok(AgentTurn::Answer(response.content));
    }

    let calls = response
        .tool_calls
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            let name = raw.name.trim();
            if name.is_empty() {
                return Err(OracleError::Malformed(format!(
                    "tool call #{index} has no name"
                )));
            }

            let arguments = if raw.arguments.trim().is_empty() {
                serde_json::Map::new()
            } else {
                match serde_json::from_str::<serde_json::Value>(&raw.arguments) {
                    Ok(serde_json::Value::Object(map)) => map,
                    Ok(other) => {
                        return Err(OracleError::Malformed(format!(
                            "arguments of '{name}' are not an object: {other}"
                        )));
                    }
                    Err(e) => {
                        return Err(OracleError::Malformed(format!(
                            "arguments of '{name}' are not valid JSON: {e}"
                        )));
                    }
                }
            };

            let id = if raw.id.trim().is_empty() {
                format!("call_{index}")
            } else {
                raw.id
            };

            Ok(ToolCallRequest::new(id, name, arguments))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AgentTurn::ToolRequest(calls))
}

/// The built-in prompt for the task assistant.
pub fn default_system_prompt(today: NaiveDate) -> String {
    format!(
        "You are TaskPilot, an assistant that manages the user's task list.\n\
         Use the available tools to create, list, filter, update, and delete tasks; \
         never claim to have changed a task without calling a tool.\n\
         Statuses are todo, in_progress, and done. Priorities are low, medium, and high.\n\
         When a tool reports an error, explain it briefly or try again with corrected arguments.\n\
         Once the work is done, reply with a short plain-text summary.\n\
         Today is {} ({}).",
        today.format("%Y-%m-%d"),
        today.format("%A"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_core::error::ProviderError;
    use taskpilot_core::provider::ProviderToolCall;
    use std::sync::Mutex;

    fn response(content: &str, calls: Vec<ProviderToolCall>) -> ProviderResponse {
        ProviderResponse {
            content: content.into(),
            tool_calls: calls,
            usage: None,
            model: "mock-model".into(),
        }
    }

    fn raw(id: &str, name: &str, arguments: &str) -> ProviderToolCall {
        ProviderToolCall {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    #[test]
    fn text_only_is_an_answer() {
        let turn = interpret(response("All done.", vec![])).unwrap();
        assert_eq!(turn, AgentTurn::Answer("All done.".into()));
    }

    #[test]
    fn tool_calls_win_over_text() {
        let turn = interpret(response(
            "Let me check.",
            vec![raw("c1", "list_tasks", ""), raw("", "create_task", r#"{"title":"A"}"#)],
        ))
        .unwrap();

        let AgentTurn::ToolRequest(calls) = turn else {
            panic!("expected a tool request");
        };
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "c1");
        assert!(calls[0].arguments.is_empty());
        assert_eq!(calls[1].id, "call_1");
        assert_eq!(calls[1].arguments["title"], "A");
    }

    #[test]
    fn nameless_call_is_malformed() {
        let err = interpret(response("", vec![raw("c1", "  ", "{}")])).unwrap_err();
        assert!(matches!(err, OracleError::Malformed(_)));
    }

    #[test]
    fn non_object_arguments_are_malformed() {
        let err = interpret(response("", vec![raw("c1", "list_tasks", "[1,2]")])).unwrap_err();
        assert!(err.to_string().contains("not an object"));

        let err = interpret(response("", vec![raw("c1", "list_tasks", "{oops")])).unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn system_prompt_mentions_today() {
        let prompt = default_system_prompt(NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());
        assert!(prompt.contains("2026-03-11"));
        assert!(prompt.contains("Wednesday"));
    }

    /// Records the last request it saw.
    struct RecordingProvider {
        last: Mutex<Option<ProviderRequest>>,
        delay: Duration,
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            *self.last.lock().unwrap() = Some(request);
            tokio::time::sleep(self.delay).await;
            Ok(response("ok", vec![]))
        }
    }

    #[tokio::test]
    async fn request_carries_prompt_history_and_tools() {
        let provider = Arc::new(RecordingProvider {
            last: Mutex::new(None),
            delay: Duration::ZERO,
        });
        let oracle = ProviderOracle::new(provider.clone(), "test-model", &ToolRegistry::empty())
            .with_system_prompt("be brief")
            .with_max_tokens(256);

        let history = vec![Message::human("hi")];
        let turn = oracle.decide(&history).await.unwrap();
        assert_eq!(turn, AgentTurn::Answer("ok".into()));

        let request = provider.last.lock().unwrap().take().unwrap();
        assert_eq!(request.model, "test-model");
        assert_eq!(request.system_prompt.as_deref(), Some("be brief"));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.max_tokens, Some(256));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_provider_times_out() {
        let provider = Arc::new(RecordingProvider {
            last: Mutex::new(None),
            delay: Duration::from_secs(120),
        });
        let oracle = ProviderOracle::new(provider, "m", &ToolRegistry::empty())
            .with_timeout(Duration::from_secs(5));

        let err = oracle.decide(&[Message::human("hi")]).await.unwrap_err();
        assert!(matches!(err, OracleError::Timeout { timeout_secs: 5 }));
    }
}
