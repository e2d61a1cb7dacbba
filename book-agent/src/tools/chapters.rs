use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{Tool, ToolError};
use crate::config::ChapterList;

/// Lists the book's chapters from configuration, without touching the corpus.
#[derive(Debug, Clone, Default)]
pub struct ChapterListTool {
    chapters: ChapterList,
}

impl ChapterListTool {
    pub fn new(chapters: ChapterList) -> Self {
        Self { chapters }
    }

    /// Numbered chapter titles, one per line.
    pub fn get_chapter_list(&self) -> String {
        self.chapters.render()
    }
}

#[async_trait]
impl Tool for ChapterListTool {
    fn name(&self) -> &str {
        "get_chapter_list"
    }

    fn description(&self) -> &str {
        "Get a list of all chapters in the book. Use this when user asks about book structure or wants to know what topics are covered."
    }

    // Gemini rejects an object schema with no properties.
    fn parameters_schema(&self) -> Option<Value> {
        None
    }

    async fn execute(&self, _args: &Map<String, Value>) -> Result<String, ToolError> {
        Ok(self.get_chapter_list())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_six_numbered_chapters() {
        let list = ChapterListTool::default().get_chapter_list();
        let lines: Vec<&str> = list.lines().collect();
        assert_eq!(lines.len(), 6);
        for (i, line) in lines.iter().enumerate() {
            assert!(line.starts_with(&format!("{}. Chapter {}", i + 1, i + 1)), "{line}");
        }
    }

    #[tokio::test]
    async fn ignores_arguments() {
        let tool = ChapterListTool::new(ChapterList::new(["Intro", "Outro"]));
        let mut args = Map::new();
        args.insert("unexpected".into(), Value::Bool(true));
        assert_eq!(tool.execute(&args).await.unwrap(), "1. Intro\n2. Outro");
    }
}
