//! Tool handlers module.
//!
//! [`ToolOutput`] is what a tool produces on success; [`ToolHandler`] is the
//! object-safe face of a [`ToolDefinition`] that the registry stores.

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Content, JsonObject};
use serde::Serialize;
use serde_json::Value;

use super::definitions::ToolDefinition;
use super::error::ToolError;
use crate::domains::frappe::{FrappeBackend, FrappeError};

/// Successful output of a tool, before it becomes content blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Plain prose.
    Text(String),
    /// Pretty-printed JSON, optionally preceded by a summary line.
    Json {
        summary: Option<String>,
        value: Value,
    },
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn json(value: Value) -> Self {
        Self::Json {
            summary: None,
            value,
        }
    }

    pub fn summarized(summary: impl Into<String>, value: Value) -> Self {
        Self::Json {
            summary: Some(summary.into()),
            value,
        }
    }

    /// Serialize any result struct.
    pub fn serialize<T: Serialize>(
        summary: Option<String>,
        value: &T,
    ) -> Result<Self, FrappeError> {
        let value = serde_json::to_value(value).map_err(|e| FrappeError::decode(e.to_string()))?;
        Ok(Self::Json { summary, value })
    }

    /// A list result, prefixed with `"{noun} retrieved: N"`.
    pub fn listing(noun: &str, items: Vec<Value>) -> Self {
        Self::summarized(
            format!("{} retrieved: {}", noun, items.len()),
            Value::Array(items),
        )
    }

    pub fn into_call_result(self) -> CallToolResult {
        let text = match self {
            Self::Text(text) => text,
            Self::Json { summary, value } => {
                let body = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
                match summary {
                    Some(summary) => format!("{}\n\n{}", summary, body),
                    None => body,
                }
            }
        };
        CallToolResult::success(vec![Content::text(text)])
    }
}

/// Type-erased tool, as stored in the registry.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Get the name of this tool.
    fn name(&self) -> &'static str;

    /// Decode arguments and run the tool.
    async fn execute(
        &self,
        backend: &FrappeBackend,
        arguments: JsonObject,
    ) -> Result<ToolOutput, ToolError>;
}

/// Adapts a typed [`ToolDefinition`] to [`ToolHandler`].
pub struct TypedHandler<T>(pub T);

#[async_trait]
impl<T: ToolDefinition> ToolHandler for TypedHandler<T> {
    fn name(&self) -> &'static str {
        T::NAME
    }

    async fn execute(
        &self,
        backend: &FrappeBackend,
        arguments: JsonObject,
    ) -> Result<ToolOutput, ToolError> {
        let params: T::Params = serde_json::from_value(Value::Object(arguments))
            .map_err(|e| ToolError::invalid_arguments(T::NAME, e.to_string()))?;
        self.0
            .execute(backend, params)
            .await
            .map_err(|e| ToolError::from_frappe(T::NAME, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;
    use serde_json::json;

    fn text_of(result: &CallToolResult) -> String {
        match &result.content[0].raw {
            RawContent::Text(text) => text.text.clone(),
            other => panic!("expected text content, got {:?}", other),
        }
    }

    #[test]
    fn test_listing_prefixes_summary() {
        let result = ToolOutput::listing("Documents", vec![json!({"name": "A"})]).into_call_result();
        assert_eq!(result.is_error, Some(false));
        let text = text_of(&result);
        assert!(text.starts_with("Documents retrieved: 1\n\n"));
        assert!(text.contains("\"name\": \"A\""));
    }

    #[test]
    fn test_plain_json_has_no_summary() {
        let result = ToolOutput::json(json!({"ok": true})).into_call_result();
        assert_eq!(text_of(&result), "{\n  \"ok\": true\n}");
    }

    #[test]
    fn test_text_output() {
        let result = ToolOutput::text("pong").into_call_result();
        assert_eq!(result.content.len(), 1);
        assert_eq!(text_of(&result), "pong");
    }
}
