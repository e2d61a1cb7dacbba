//! Conversation content exchanged with the model.
//!
//! These types serialize directly to the Gemini `generateContent` wire format
//! (camelCase keys, one JSON object per part). [`ModelTurn`] is the decoded
//! view the orchestration loop works with.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Author of a [`Content`] entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user, and function results sent back on the user's behalf.
    User,
    /// The language model.
    Model,
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Who produced this content. Responses occasionally omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Ordered parts of the message.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// A user message with a single text part.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self { role: Some(Role::User), parts: vec![Part::text(text)] }
    }

    /// A model message with a single text part.
    pub fn model_text(text: impl Into<String>) -> Self {
        Self { role: Some(Role::Model), parts: vec![Part::text(text)] }
    }

    /// A model message requesting one tool call.
    pub fn model_tool_call(name: impl Into<String>, args: Value) -> Self {
        Self {
            role: Some(Role::Model),
            parts: vec![Part::FunctionCall {
                function_call: FunctionCall { name: name.into(), args },
                thought_signature: None,
            }],
        }
    }

    /// The result of a tool call, wrapped as `{"result": text}`.
    pub fn function_result(name: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            role: Some(Role::User),
            parts: vec![Part::FunctionResponse {
                function_response: FunctionResponse {
                    name: name.into(),
                    response: serde_json::json!({ "result": result.into() }),
                },
            }],
        }
    }

    /// Concatenated non-thought text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text, thought, .. } if *thought != Some(true) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The first function call in this content, if any.
    pub fn function_call(&self) -> Option<&FunctionCall> {
        self.parts.iter().find_map(|part| match part {
            Part::FunctionCall { function_call, .. } => Some(function_call),
            _ => None,
        })
    }
}

/// A single part of a [`Content`] message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// The model asks for a tool to be run.
    FunctionCall {
        /// The requested call.
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
        /// Opaque signature that must be echoed back unchanged.
        #[serde(rename = "thoughtSignature", default, skip_serializing_if = "Option::is_none")]
        thought_signature: Option<String>,
    },
    /// The result of a tool call.
    FunctionResponse {
        /// The tool result.
        #[serde(rename = "functionResponse")]
        function_response: FunctionResponse,
    },
    /// Plain text.
    Text {
        /// The text.
        text: String,
        /// Set on the model's reasoning summaries.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thought: Option<bool>,
        /// Opaque signature that must be echoed back unchanged.
        #[serde(rename = "thoughtSignature", default, skip_serializing_if = "Option::is_none")]
        thought_signature: Option<String>,
    },
    /// Any part kind this crate does not interpret; kept so it can be echoed back.
    Other(Value),
}

impl Part {
    /// A plain text part.
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into(), thought: None, thought_signature: None }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the declared tool.
    pub name: String,
    /// JSON arguments; absent arguments decode as `null`.
    #[serde(default)]
    pub args: Value,
}

/// A tool result sent back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    /// Name of the tool that produced the result.
    pub name: String,
    /// The result payload.
    pub response: Value,
}

/// A tool the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Tool name.
    pub name: String,
    /// When the model should use the tool.
    pub description: String,
    /// JSON schema of the arguments; omitted for tools without arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// A decoded tool request: a name plus its argument map.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Name of the requested tool.
    pub name: String,
    /// Arguments keyed by parameter name.
    pub arguments: Map<String, Value>,
}

impl From<&FunctionCall> for ToolCall {
    fn from(call: &FunctionCall) -> Self {
        let arguments = match &call.args {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        Self { name: call.name.clone(), arguments }
    }
}

/// What the model decided to do with its turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    /// A final answer.
    Text(String),
    /// A request to run a tool, with any text the model produced alongside it.
    ToolRequest {
        /// The first tool call in the response.
        call: ToolCall,
        /// Accompanying text, often empty.
        text: String,
    },
}

impl From<&Content> for ModelTurn {
    fn from(content: &Content) -> Self {
        match content.function_call() {
            Some(call) => ModelTurn::ToolRequest { call: call.into(), text: content.text() },
            None => ModelTurn::Text(content.text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_text_turn_ignoring_thoughts() {
        let content: Content = serde_json::from_value(json!({
            "role": "model",
            "parts": [
                {"text": "planning...", "thought": true},
                {"text": "A commit is "},
                {"text": "a snapshot."}
            ]
        }))
        .unwrap();
        assert_eq!(ModelTurn::from(&content), ModelTurn::Text("A commit is a snapshot.".into()));
    }

    #[test]
    fn decodes_first_function_call() {
        let content: Content = serde_json::from_value(json!({
            "role": "model",
            "parts": [
                {"text": "Let me look that up."},
                {"functionCall": {"name": "search_book_content", "args": {"query": "rebase"}},
                 "thoughtSignature": "sig"},
                {"functionCall": {"name": "get_chapter_list", "args": {}}}
            ]
        }))
        .unwrap();

        match ModelTurn::from(&content) {
            ModelTurn::ToolRequest { call, text } => {
                assert_eq!(call.name, "search_book_content");
                assert_eq!(call.arguments["query"], "rebase");
                assert_eq!(text, "Let me look that up.");
            }
            other => panic!("expected tool request, got {other:?}"),
        }
    }

    #[test]
    fn missing_args_become_empty_map() {
        let content: Content = serde_json::from_value(json!({
            "parts": [{"functionCall": {"name": "get_chapter_list"}}]
        }))
        .unwrap();
        assert_eq!(content.role, None);
        match ModelTurn::from(&content) {
            ModelTurn::ToolRequest { call, .. } => assert!(call.arguments.is_empty()),
            other => panic!("expected tool request, got {other:?}"),
        }
    }

    #[test]
    fn unknown_parts_are_preserved() {
        let raw = json!({
            "role": "model",
            "parts": [{"executableCode": {"language": "PYTHON", "code": "print(1)"}}]
        });
        let content: Content = serde_json::from_value(raw.clone()).unwrap();
        assert!(matches!(content.parts[0], Part::Other(_)));
        assert_eq!(serde_json::to_value(&content).unwrap(), raw);
        assert_eq!(ModelTurn::from(&content), ModelTurn::Text(String::new()));
    }

    #[test]
    fn function_result_wire_shape() {
        let content = Content::function_result("get_chapter_list", "1. Intro");
        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            json!({
                "role": "user",
                "parts": [{"functionResponse": {
                    "name": "get_chapter_list",
                    "response": {"result": "1. Intro"}
                }}]
            })
        );
    }

    #[test]
    fn function_call_round_trips_signature() {
        let raw = json!({
            "role": "model",
            "parts": [{"functionCall": {"name": "search_book_content", "args": {"query": "merge"}},
                       "thoughtSignature": "abc"}]
        });
        let content: Content = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&content).unwrap(), raw);
    }
}
