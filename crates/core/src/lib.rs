//! # TaskPilot Core
//!
//! Domain types, traits, and error definitions for the TaskPilot agent.
//! This crate has **zero framework dependencies**: it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the agent loop is a trait here. Implementations
//! live in their respective crates, so tests can swap in scripted stubs
//! and all crates depend inward on core.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;
pub mod task;
pub mod agent;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, Role, Conversation, ConversationId, ToolCallRequest};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ProviderToolCall, ToolDefinition};
pub use tool::{Tool, ToolResult, ToolRegistry, ToolRegistryBuilder};
pub use task::{Task, TaskStore, TaskStatus, TaskPriority, NewTask, TaskUpdate, TaskFilter, DeleteTarget};
pub use agent::AgentConfig;
