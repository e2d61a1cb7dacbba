//! Agent configuration: model choice, sampling parameters, loop bound, and the
//! static book description the agent is primed with.

use serde::{Deserialize, Serialize};

/// The default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Tool dispatches allowed within one conversation turn.
pub const MAX_TOOL_ITERATIONS: usize = 5;

/// Instruction prepended to the first user message of every turn.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = r#"You are a helpful AI assistant for the book "The Version Control Revolution: Git for Non-Developers".

Your role:
- Answer questions about Git, version control, GitHub, and related topics
- Use the search_book_content tool to find relevant information from the book
- Explain concepts in simple, beginner-friendly language
- Provide practical examples and analogies
- Be encouraging and patient with learners

When a user asks a question:
1. Use the search_book_content tool to find relevant book content
2. Synthesize the information into a clear, helpful answer
3. Add your own explanations to make concepts easier to understand
4. If the question is not covered in the book, say so politely and offer general help

Keep responses concise but complete. Use markdown formatting for readability."#;

/// Chapter titles of the book, in reading order.
pub const DEFAULT_CHAPTERS: [&str; 6] = [
    "Chapter 1: The Chaos of 'Final_v2_REAL.docx'",
    "Chapter 2: The Anatomy of Git",
    "Chapter 3: Your First Time Machine",
    "Chapter 4: Branching: Parallel Universes",
    "Chapter 5: The Cloud: GitHub & Beyond",
    "Chapter 6: Git in the Real World",
];

/// Sampling parameters sent with every model request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { temperature: 0.3, top_p: 0.9, top_k: 40 }
    }
}

/// Ordered chapter titles, independent of the indexed corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterList {
    titles: Vec<String>,
}

impl ChapterList {
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { titles: titles.into_iter().map(Into::into).collect() }
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// One `"{n}. {title}"` line per chapter, numbered from 1.
    pub fn render(&self) -> String {
        self.titles
            .iter()
            .enumerate()
            .map(|(i, title)| format!("{}. {title}", i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ChapterList {
    fn default() -> Self {
        Self::new(DEFAULT_CHAPTERS)
    }
}

/// Configuration for a [`BookAgent`](crate::BookAgent).
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub model: String,
    pub generation: GenerationConfig,
    pub max_iterations: usize,
    pub system_instruction: String,
    pub chapters: ChapterList,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            generation: GenerationConfig::default(),
            max_iterations: MAX_TOOL_ITERATIONS,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            chapters: ChapterList::default(),
        }
    }
}

impl AgentConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn with_chapters(mut self, chapters: ChapterList) -> Self {
        self.chapters = chapters;
        self
    }

    /// The text of the first user message of a turn.
    pub fn opening_message(&self, user_message: &str) -> String {
        format!("{}\n\nUser: {user_message}", self.system_instruction)
    }
}
