//! Message and Conversation domain types.
//!
//! These are the values that flow through one orchestration run:
//! the channel seeds a human message → the model answers or requests tools →
//! tool results are appended → the model answers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::tool::ToolResult;

/// Unique identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The end user
    Human,
    /// The model
    Agent,
    /// Outcome of one tool call
    Tool,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Correlation id; the matching tool-result message carries it back.
    pub id: String,

    pub tool_name: String,

    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

impl ToolCallRequest {
    pub fn new(
        id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// A single entry in conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,

    pub role: Role,

    /// Text content. For tool results, the JSON encoding of `result`.
    pub content: String,

    /// Tool calls requested by the agent (agent messages only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,

    /// For tool results: the request this answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolResult>,

    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn base(role: Role, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
            tool_name: None,
            result: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a new human message.
    pub fn human(content: impl Into<String>) -> Self {
        Self::base(Role::Human, content.into())
    }

    /// Create a terminal agent message (no tool calls).
    pub fn agent(content: impl Into<String>) -> Self {
        Self::base(Role::Agent, content.into())
    }

    /// Create an agent message that requests tools.
    pub fn agent_tool_request(calls: Vec<ToolCallRequest>) -> Self {
        let mut msg = Self::base(Role::Agent, String::new());
        msg.tool_calls = calls;
        msg
    }

    /// Create the tool-result message answering `call`.
    pub fn tool_result(call: &ToolCallRequest, result: ToolResult) -> Self {
        let content = serde_json::to_string(&result).unwrap_or_else(|_| result.summary());
        let mut msg = Self::base(Role::Tool, content);
        msg.tool_call_id = Some(call.id.clone());
        msg.tool_name = Some(call.tool_name.clone());
        msg.result = Some(result);
        msg
    }

    pub fn requests_tools(&self) -> bool {
        self.role == Role::Agent && !self.tool_calls.is_empty()
    }
}

/// The append-only history of one orchestration run.
///
/// Messages can only be appended; nothing already pushed is mutated or
/// removed. Insertion order is causal order.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub id: ConversationId,

    messages: Vec<Message>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new empty conversation.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// A fresh conversation seeded with one human message.
    pub fn seeded(text: impl Into<String>) -> Self {
        let mut conv = Self::new();
        conv.push(Message::human(text));
        conv
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Does the most recent agent turn carry tool requests?
    ///
    /// Only the presence of the request sequence matters, not its content.
    pub fn should_continue(&self) -> bool {
        self.last().is_some_and(Message::requests_tools)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str) -> ToolCallRequest {
        ToolCallRequest::new(format!("call_{name}"), name, serde_json::Map::new())
    }

    #[test]
    fn create_human_message() {
        let msg = Message::human("Hello, agent!");
        assert_eq!(msg.role, Role::Human);
        assert_eq!(msg.content, "Hello, agent!");
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn seeded_conversation_has_one_human_message() {
        let conv = Conversation::seeded("Add a task");
        assert_eq!(conv.len(), 1);
        assert_eq!(conv.messages()[0].role, Role::Human);
        assert!(!conv.should_continue());
    }

    #[test]
    fn continuation_follows_last_agent_message() {
        let mut conv = Conversation::seeded("list my tasks");
        conv.push(Message::agent_tool_request(vec![call("list_tasks")]));
        assert!(conv.should_continue());

        conv.push(Message::tool_result(&call("list_tasks"), ToolResult::TaskList { tasks: vec![] }));
        assert!(!conv.should_continue());

        conv.push(Message::agent("You have no tasks."));
        assert!(!conv.should_continue());
    }

    #[test]
    fn empty_tool_request_does_not_continue() {
        let mut conv = Conversation::seeded("hi");
        conv.push(Message::agent_tool_request(vec![]));
        assert!(!conv.should_continue());
    }

    #[test]
    fn tool_result_message_is_correlated() {
        let req = call("create_task");
        let msg = Message::tool_result(&req, ToolResult::info("done"));
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_create_task"));
        assert_eq!(msg.tool_name.as_deref(), Some("create_task"));
        assert!(msg.content.contains(r#""type":"info""#));
    }

    #[test]
    fn conversation_tracks_updates() {
        let mut conv = Conversation::new();
        let created = conv.created_at;
        conv.push(Message::human("First message"));
        assert_eq!(conv.len(), 1);
        assert!(conv.updated_at >= created);
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = Message::agent_tool_request(vec![call("list_tasks")]);
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role, Role::Agent);
        assert_eq!(back.tool_calls, msg.tool_calls);
    }
}
