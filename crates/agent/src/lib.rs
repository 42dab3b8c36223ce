//! The orchestration loop for TaskPilot.
//!
//! One run alternates between two steps:
//!
//! 1. **Decide**: the [`DecisionOracle`] reads the history and either
//!    answers or requests a batch of tool calls
//! 2. **Execute**: the [`ToolExecutor`] runs the batch and every result is
//!    appended to the history
//!
//! The run ends on the first answer, or fails when the decision budget is
//! spent, the oracle fails, or the caller cancels.

pub mod channel;
pub mod executor;
pub mod loop_runner;
pub mod oracle;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use executor::ToolExecutor;
pub use loop_runner::{AgentLoop, TurnOutcome};
pub use oracle::{AgentTurn, DecisionOracle, ProviderOracle};
