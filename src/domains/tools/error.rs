//! Tool-specific error types.

use thiserror::Error;

use crate::domains::frappe::FrappeError;

/// Errors that can occur during tool operations.
///
/// None of these cross the protocol boundary as faults: the registry turns
/// every variant into an `isError` tool result.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Unknown tool: {0}")]
    NotFound(String),

    /// Invalid arguments were provided to the tool.
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    /// The backend call behind the tool failed.
    #[error("{tool} failed: {source}")]
    Backend {
        tool: String,
        #[source]
        source: FrappeError,
    },
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Report every missing required argument at once.
    pub fn missing_arguments(tool: impl Into<String>, missing: &[&str]) -> Self {
        Self::invalid_arguments(
            tool,
            format!("missing required argument(s): {}", missing.join(", ")),
        )
    }

    /// Wrap a backend failure; input problems stay argument errors.
    pub fn from_frappe(tool: impl Into<String>, source: FrappeError) -> Self {
        match source {
            FrappeError::InvalidInput(message) => Self::invalid_arguments(tool, message),
            source => Self::Backend {
                tool: tool.into(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::frappe::ErrorDetail;

    #[test]
    fn test_missing_arguments_names_fields() {
        let err = ToolError::missing_arguments("get_document", &["doctype", "name"]);
        assert_eq!(
            err.to_string(),
            "Invalid arguments for get_document: missing required argument(s): doctype, name"
        );
    }

    #[test]
    fn test_backend_error_carries_tool_and_status() {
        let err = ToolError::from_frappe(
            "list_documents",
            FrappeError::Http {
                status: 500,
                detail: ErrorDetail {
                    message: Some("boom".into()),
                    ..Default::default()
                },
            },
        );
        assert_eq!(
            err.to_string(),
            "list_documents failed: Frappe API returned HTTP 500 - boom"
        );
    }

    #[test]
    fn test_invalid_input_becomes_argument_error() {
        let err = ToolError::from_frappe("list_documents", FrappeError::invalid_input("bad filters"));
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }
}
