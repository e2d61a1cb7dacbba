//! Error types for the `book-agent` crate.

use thiserror::Error;

/// Errors that end a conversation turn.
///
/// Tool failures are not represented here: they are rendered as text and
/// returned to the model (see [`ToolError`](crate::tools::ToolError)).
#[derive(Debug, Error)]
pub enum AgentError {
    /// Missing or invalid configuration, e.g. no API key.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote model could not be reached or rejected the request.
    #[error("Model error ({model}): {message}")]
    Model {
        /// The model that produced the error.
        model: String,
        /// A description of the failure.
        message: String,
    },

    /// The remote model answered with something that cannot be decoded.
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}

/// A convenience result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;
