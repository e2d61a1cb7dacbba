//! The bounded tool-calling loop for a single conversation turn.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::AgentConfig;
use crate::content::{Content, ModelTurn};
use crate::error::Result;
use crate::model::LanguageModel;
use crate::tools::Toolbox;

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The model answered with text.
    Done,
    /// The tool-call budget ran out; the reply is the last model text, possibly empty.
    Exhausted,
}

/// The result of [`BookAgent::chat`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentReply {
    pub text: String,
    pub outcome: TurnOutcome,
    /// Number of tools dispatched during the turn.
    pub tool_calls: usize,
}

/// Answers questions about the book with a language model and the book tools.
///
/// The agent holds no per-conversation state; every call to [`chat`](Self::chat)
/// starts a fresh exchange, so one instance can serve concurrent requests.
pub struct BookAgent {
    model: Arc<dyn LanguageModel>,
    toolbox: Toolbox,
    config: AgentConfig,
}

impl BookAgent {
    pub fn new(model: Arc<dyn LanguageModel>, toolbox: Toolbox, config: AgentConfig) -> Self {
        Self { model, toolbox, config }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn toolbox(&self) -> &Toolbox {
        &self.toolbox
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Run one turn: send the message, execute requested tools, and return the
    /// model's final text.
    ///
    /// Only model failures are errors. Tool failures are passed back to the
    /// model as text, and hitting the iteration cap returns the last text seen.
    #[instrument(skip_all, fields(model = %self.model.name(), message_len = message.len()))]
    pub async fn chat(&self, message: &str) -> Result<AgentReply> {
        let declarations = self.toolbox.declarations();
        let mut contents = vec![Content::user_text(self.config.opening_message(message))];
        let mut tool_calls = 0;

        loop {
            let response = self.model.generate(&contents, &declarations).await?;

            match ModelTurn::from(&response) {
                ModelTurn::Text(text) => {
                    info!(tool_calls, "turn complete");
                    return Ok(AgentReply { text, outcome: TurnOutcome::Done, tool_calls });
                }
                ModelTurn::ToolRequest { text, .. } if tool_calls >= self.config.max_iterations => {
                    warn!(tool_calls, "tool-call limit reached; returning last model text");
                    return Ok(AgentReply { text, outcome: TurnOutcome::Exhausted, tool_calls });
                }
                ModelTurn::ToolRequest { call, .. } => {
                    let result = self.toolbox.dispatch(&call).await;
                    debug!(tool = %call.name, result_len = result.len(), "tool result ready");
                    contents.push(response);
                    contents.push(Content::function_result(call.name, result));
                    tool_calls += 1;
                }
            }
        }
    }
}

impl std::fmt::Debug for BookAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookAgent")
            .field("model", &self.model.name())
            .field("toolbox", &self.toolbox)
            .field("max_iterations", &self.config.max_iterations)
            .finish()
    }
}
