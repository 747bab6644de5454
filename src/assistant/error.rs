use thiserror::Error;

use crate::client::ClientError;
use crate::llm::ChatError;

/// Turn-level failures. Each one ends the turn; none of them outlive it.
///
/// An unresolved intent and missing required parameters are not errors:
/// the first routes to the model, the second is a
/// [`TurnOutcome`](super::TurnOutcome).
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("persistence service call failed: {0}")]
    Persistence(#[from] ClientError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("model proposed malformed arguments for {tool}: {source}")]
    MalformedToolArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model requested unknown tool: {0}")]
    UnknownTool(String),
}
