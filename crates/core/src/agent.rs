//! Agent configuration.

use serde::{Deserialize, Serialize};

/// Limits and prompt for the orchestration loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum decision cycles per turn (safety limit)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Upper bound on a single model call
    #[serde(default = "default_oracle_timeout")]
    pub oracle_timeout_secs: u64,

    /// Upper bound on a single tool call
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,

    /// Overrides the built-in task assistant prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

fn default_max_iterations() -> u32 {
    25
}
fn default_oracle_timeout() -> u64 {
    60
}
fn default_tool_timeout() -> u64 {
    30
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            oracle_timeout_secs: default_oracle_timeout(),
            tool_timeout_secs: default_tool_timeout(),
            system_prompt: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.max_iterations, 25);
        assert_eq!(config.oracle_timeout_secs, 60);
        assert_eq!(config.tool_timeout_secs, 30);
    }

    #[test]
    fn partial_section_fills_defaults() {
        let config: AgentConfig = serde_json::from_str(r#"{"max_iterations": 5}"#).unwrap();
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.tool_timeout_secs, 30);
    }
}
