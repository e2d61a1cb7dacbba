//! Local tools the model may call.
//!
//! Every tool returns `Result<String, ToolError>`. The [`Toolbox`] is the only
//! place a failure is turned into text for the model, so a broken corpus or a
//! bad argument never ends the conversation turn.

mod chapters;
mod search;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::content::{FunctionDeclaration, ToolCall};

pub use chapters::ChapterListTool;
pub use search::SearchBookTool;

/// Why a tool could not produce its result.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The persisted corpus is absent or unreadable.
    #[error("Embeddings not found. Run build-corpus to create them first ({0})")]
    CorpusNotBuilt(String),

    /// The query could not be embedded.
    #[error("embedding the query failed: {0}")]
    Embedding(String),

    /// The index rejected the query.
    #[error("search failed: {0}")]
    Search(String),

    /// The model asked for a tool that is not registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A required argument is missing or has the wrong type.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

/// A named operation exposed to the model.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments, or `None` for a tool without arguments.
    fn parameters_schema(&self) -> Option<Value>;

    async fn execute(&self, args: &Map<String, Value>) -> Result<String, ToolError>;

    fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// The registered tools, looked up by name.
#[derive(Clone, Default)]
pub struct Toolbox {
    tools: Vec<Arc<dyn Tool>>,
}

impl Toolbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard book toolbox: semantic search plus the chapter list.
    pub fn book(search: SearchBookTool, chapters: ChapterListTool) -> Self {
        Self::new().with_tool(Arc::new(search)).with_tool(Arc::new(chapters))
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn declarations(&self) -> Vec<FunctionDeclaration> {
        self.tools.iter().map(|tool| tool.declaration()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// Run `call` and return the text the model will see.
    pub async fn dispatch(&self, call: &ToolCall) -> String {
        info!(tool = %call.name, "calling tool");
        let result = match self.get(&call.name) {
            Some(tool) => tool.execute(&call.arguments).await,
            None => Err(ToolError::UnknownTool(call.name.clone())),
        };
        match result {
            Ok(text) => text,
            Err(e @ ToolError::UnknownTool(_)) => {
                warn!(tool = %call.name, "model requested an unknown tool");
                e.to_string()
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool failed");
                format!("Error executing {}: {e}", call.name)
            }
        }
    }
}

impl std::fmt::Debug for Toolbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.tools.iter().map(|tool| tool.name()).collect();
        f.debug_struct("Toolbox").field("tools", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    #[async_trait]
    impl Tool for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "always fails"
        }

        fn parameters_schema(&self) -> Option<Value> {
            None
        }

        async fn execute(&self, _args: &Map<String, Value>) -> Result<String, ToolError> {
            Err(ToolError::InvalidArguments("missing required 'query' argument".into()))
        }
    }

    fn call(name: &str) -> ToolCall {
        ToolCall { name: name.into(), arguments: Map::new() }
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_as_text() {
        let toolbox = Toolbox::new().with_tool(Arc::new(Failing));
        assert_eq!(toolbox.dispatch(&call("delete_repo")).await, "Unknown tool: delete_repo");
    }

    #[tokio::test]
    async fn tool_failure_is_rendered_with_tool_name() {
        let toolbox = Toolbox::new().with_tool(Arc::new(Failing));
        assert_eq!(
            toolbox.dispatch(&call("failing")).await,
            "Error executing failing: invalid arguments: missing required 'query' argument"
        );
    }

    #[test]
    fn declarations_follow_registration_order() {
        let toolbox = Toolbox::new()
            .with_tool(Arc::new(Failing))
            .with_tool(Arc::new(ChapterListTool::default()));
        let names: Vec<String> = toolbox.declarations().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["failing", "get_chapter_list"]);
    }
}
