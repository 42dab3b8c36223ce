//! Error types for the TaskPilot domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] aggregates them.

use thiserror::Error;

/// The top-level error type for all TaskPilot operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Agent turn errors ---
    #[error("Turn failed: {0}")]
    Turn(#[from] TurnError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures of a single tool call.
///
/// The `Display` strings of `NotFound` and the argument variants are the
/// exact messages fed back to the model; every other variant is wrapped by
/// the executor as `Error executing tool '<name>': <detail>`.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool '{0}' not found")]
    NotFound(String),

    #[error("Invalid {field}: {value}")]
    InvalidArgument { field: String, value: String },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    ExecutionFailed(String),

    #[error("timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Tool '{0}' is registered more than once")]
    DuplicateName(String),
}

impl ToolError {
    /// Shorthand for a rejected argument value.
    pub fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether the failure happened before the tool touched anything.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::InvalidArgument { .. } | Self::InvalidArguments(_)
        )
    }
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// A decision step that could not produce a usable turn.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("Malformed model response: {0}")]
    Malformed(String),

    #[error("Model did not respond within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

/// Terminal conditions of one orchestration run.
#[derive(Debug, Clone, Error)]
pub enum TurnError {
    #[error("Decision step failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("Exceeded the limit of {max_iterations} decision cycles")]
    LoopBudgetExceeded { max_iterations: u32 },

    #[error("The model returned no usable response")]
    EmptyResponse,

    #[error("Turn cancelled")]
    Cancelled,
}
