//! Error types for moltbot
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

use crate::api::ClientError;
use crate::decision::DecisionError;
use crate::domain::ActionKind;

/// All error types that can occur in the agent
#[derive(Debug, Error)]
pub enum AgentError {
    /// Fetching the feed failed; the whole tick is abandoned
    #[error("Fetch failed: {0}")]
    Fetch(#[source] ClientError),

    /// One action's API call failed; the tick continues
    #[error("{kind} action failed: {source}")]
    Action {
        kind: ActionKind,
        #[source]
        source: ClientError,
    },

    /// The decision strategy failed or timed out; the whole tick is abandoned
    #[error("{0}")]
    Decision(#[from] DecisionError),
}

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;
