//! # book-agent
//!
//! A tool-calling question-answering agent for a single book.
//!
//! [`BookAgent`] sends the user's question to a [`LanguageModel`] together with
//! two tool declarations (`search_book_content` and `get_chapter_list`). When
//! the model asks for a tool, the agent runs it through the [`Toolbox`], sends
//! the result back, and repeats until the model answers with text or the
//! tool-call budget is spent.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use book_agent::{AgentConfig, BookAgent, ChapterListTool, GeminiModel, SearchBookTool, Toolbox};
//!
//! let search = SearchBookTool::from_files(&corpus_files, embedder);
//! let toolbox = Toolbox::book(search, ChapterListTool::default());
//! let agent = BookAgent::new(Arc::new(GeminiModel::new(api_key)?), toolbox, AgentConfig::default());
//! let reply = agent.chat("What is branching in Git?").await?;
//! println!("{}", reply.text);
//! ```

pub mod agent;
pub mod config;
pub mod content;
pub mod error;
pub mod gemini;
pub mod model;
pub mod tools;

pub use agent::{AgentReply, BookAgent, TurnOutcome};
pub use config::{AgentConfig, ChapterList, GenerationConfig};
pub use content::{Content, FunctionCall, FunctionDeclaration, ModelTurn, Part, Role, ToolCall};
pub use error::{AgentError, Result};
pub use gemini::GeminiModel;
pub use model::LanguageModel;
pub use tools::{ChapterListTool, SearchBookTool, Tool, ToolError, Toolbox};
