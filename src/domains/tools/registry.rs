//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - The table of every tool, built once at startup
//! - Required-argument validation ahead of any backend call
//! - Dispatch that folds every failure into an `isError` result

use std::collections::BTreeMap;

use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::definitions::{
    CallMethodTool, CheckDoctypeExistsTool, CheckDocumentExistsTool, CreateDocumentTool,
    DeleteDocumentTool, FindDoctypesTool, GetApiInstructionsTool, GetDoctypeSchemaTool,
    GetDoctypesInModuleTool, GetDocumentCountTool, GetDocumentTool, GetFieldOptionsTool,
    GetFrappeUsageInfoTool, GetModuleListTool, GetNamingInfoTool, GetRequiredFieldsTool,
    ListDocumentsTool, PingTool, ReconcileBankTransactionTool, ToolDefinition,
    UpdateDocumentTool,
};
use super::error::ToolError;
use super::handlers::{ToolHandler, ToolOutput, TypedHandler};
use crate::domains::frappe::FrappeBackend;

// ============================================================================
// Tool Registry
// ============================================================================

struct ToolEntry {
    tool: Tool,
    /// Top-level `required` properties of the input schema.
    required: Vec<String>,
    handler: Box<dyn ToolHandler>,
}

/// Tool registry - manages all available tools.
///
/// This struct provides a central point for:
/// - Listing all available tools
/// - Dispatching tool calls for every transport
pub struct ToolRegistry {
    backend: FrappeBackend,
    entries: BTreeMap<&'static str, ToolEntry>,
}

impl ToolRegistry {
    /// Create a registry holding every Frappe tool.
    pub fn new(backend: FrappeBackend) -> Self {
        let mut registry = Self {
            backend,
            entries: BTreeMap::new(),
        };

        registry.register(PingTool);
        registry.register(CallMethodTool);
        registry.register(CreateDocumentTool);
        registry.register(GetDocumentTool);
        registry.register(UpdateDocumentTool);
        registry.register(DeleteDocumentTool);
        registry.register(ListDocumentsTool);
        registry.register(ReconcileBankTransactionTool);
        registry.register(GetDoctypeSchemaTool);
        registry.register(GetFieldOptionsTool);
        registry.register(GetFrappeUsageInfoTool);
        registry.register(FindDoctypesTool);
        registry.register(GetModuleListTool);
        registry.register(GetDoctypesInModuleTool);
        registry.register(CheckDoctypeExistsTool);
        registry.register(CheckDocumentExistsTool);
        registry.register(GetDocumentCountTool);
        registry.register(GetNamingInfoTool);
        registry.register(GetRequiredFieldsTool);
        registry.register(GetApiInstructionsTool);

        registry
    }

    fn register<T: ToolDefinition>(&mut self, tool: T) {
        let metadata = T::to_tool();
        let required = metadata
            .input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        self.entries.insert(
            T::NAME,
            ToolEntry {
                tool: metadata,
                required,
                handler: Box::new(TypedHandler(tool)),
            },
        );
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    /// Get all tools as Tool models (metadata).
    ///
    /// This is the single source of truth for all available tools.
    pub fn tools(&self) -> Vec<Tool> {
        self.entries.values().map(|entry| entry.tool.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Required argument names of a tool, `None` for unknown tools.
    pub fn required_arguments(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(|entry| entry.required.as_slice())
    }

    pub fn backend(&self) -> &FrappeBackend {
        &self.backend
    }

    /// Run a tool call to completion.
    ///
    /// Never fails: unknown tools, invalid arguments and backend errors all
    /// come back as a result with `isError: true` and one text block.
    #[instrument(skip(self, arguments))]
    pub async fn dispatch(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        match self.try_dispatch(name, arguments.unwrap_or_default()).await {
            Ok(output) => output.into_call_result(),
            Err(e) => {
                warn!("Tool call failed: {}", e);
                CallToolResult::error(vec![Content::text(e.to_string())])
            }
        }
    }

    async fn try_dispatch(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<ToolOutput, ToolError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| ToolError::not_found(name))?;

        let missing: Vec<&str> = entry
            .required
            .iter()
            .filter(|key| arguments.get(key.as_str()).is_none_or(Value::is_null))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(ToolError::missing_arguments(name, &missing));
        }

        info!("Calling tool {}", name);
        entry.handler.execute(&self.backend, arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::frappe::backend::test_support::backend;
    use crate::domains::frappe::testing::{FakeFrappe, token_credentials};
    use crate::domains::frappe::{ErrorDetail, FrappeError};
    use rmcp::model::RawContent;
    use serde_json::json;
    use std::sync::Arc;

    fn registry_with(fake: &Arc<FakeFrappe>) -> ToolRegistry {
        ToolRegistry::new(backend(fake, token_credentials()))
    }

    fn args(value: Value) -> Option<JsonObject> {
        match value {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    fn text_of(result: &CallToolResult) -> String {
        assert_eq!(result.content.len(), 1);
        match &result.content[0].raw {
            RawContent::Text(text) => text.text.clone(),
            other => panic!("expected text content, got {:?}", other),
        }
    }

    #[test]
    fn test_registry_tool_names() {
        let fake = Arc::new(FakeFrappe::new());
        let registry = registry_with(&fake);
        let names = registry.tool_names();
        assert_eq!(names.len(), 20);
        for name in [
            "ping",
            "call_method",
            "create_document",
            "get_document",
            "update_document",
            "delete_document",
            "list_documents",
            "reconcile_bank_transaction_with_vouchers",
            "get_doctype_schema",
            "get_field_options",
            "get_frappe_usage_info",
            "find_doctypes",
            "get_module_list",
            "get_doctypes_in_module",
            "check_doctype_exists",
            "check_document_exists",
            "get_document_count",
            "get_naming_info",
            "get_required_fields",
            "get_api_instructions",
        ] {
            assert!(names.contains(&name), "missing tool {}", name);
        }
    }

    #[test]
    fn test_required_arguments_come_from_schema() {
        let fake = Arc::new(FakeFrappe::new());
        let registry = registry_with(&fake);
        assert_eq!(
            registry.required_arguments("update_document").unwrap(),
            ["doctype", "name", "values"]
        );
        assert_eq!(registry.required_arguments("list_documents").unwrap(), ["doctype"]);
        assert!(registry.required_arguments("ping").unwrap().is_empty());
        assert!(registry.required_arguments("nope").is_none());
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_result() {
        let fake = Arc::new(FakeFrappe::new());
        let registry = registry_with(&fake);

        let result = registry.dispatch("frobnicate", None).await;
        assert_eq!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "Unknown tool: frobnicate");
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_argument_makes_no_backend_call() {
        let fake = Arc::new(FakeFrappe::new());
        let registry = registry_with(&fake);

        let result = registry
            .dispatch("get_document", args(json!({"doctype": "Customer", "name": null})))
            .await;
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).contains("missing required argument(s): name"));
        assert!(fake.requests().is_empty());
        assert_eq!(fake.login_count(), 0);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_invalid_arguments() {
        let fake = Arc::new(FakeFrappe::new());
        let registry = registry_with(&fake);

        let result = registry
            .dispatch("list_documents", args(json!({"doctype": "Customer", "limit": "ten"})))
            .await;
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).starts_with("Invalid arguments for list_documents"));
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_backend_500_is_normalized() {
        let fake = Arc::new(FakeFrappe::new().respond_with(|_| {
            Err(FrappeError::Http {
                status: 500,
                detail: ErrorDetail::from_json(&json!({
                    "exc_type": "ValidationError",
                    "_server_messages": "[\"{\\\"message\\\": \\\"Customer Group is mandatory\\\"}\"]"
                })),
            })
        }));
        let registry = registry_with(&fake);

        let result = registry
            .dispatch("list_documents", args(json!({"doctype": "Customer"})))
            .await;
        assert_eq!(result.is_error, Some(true));
        let text = text_of(&result);
        assert!(text.starts_with("list_documents failed: Frappe API returned HTTP 500"));
        assert!(text.contains("ValidationError"));
        assert!(text.contains("Customer Group is mandatory"));
    }

    #[tokio::test]
    async fn test_successful_listing() {
        let fake = Arc::new(
            FakeFrappe::new().respond_with(|_| Ok(json!({"data": [{"name": "CUST-0001"}]}))),
        );
        let registry = registry_with(&fake);

        let result = registry
            .dispatch(
                "list_documents",
                args(json!({"doctype": "Customer", "filters": {"disabled": 0}})),
            )
            .await;
        assert_eq!(result.is_error, Some(false));
        let text = text_of(&result);
        assert!(text.starts_with("Documents retrieved: 1\n\n"));
        assert!(text.contains("CUST-0001"));

        let (request, _) = fake.requests().pop().unwrap();
        assert_eq!(request.query_value("filters"), Some(r#"[["disabled","=",0]]"#));
    }

    #[tokio::test]
    async fn test_ping_without_arguments() {
        let fake = Arc::new(FakeFrappe::new());
        let registry = registry_with(&fake);

        let result = registry.dispatch("ping", None).await;
        assert_eq!(result.is_error, Some(false));
        assert_eq!(text_of(&result), "pong");
    }
}
