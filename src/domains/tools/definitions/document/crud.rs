//! Single-document tools: create, get, update, delete.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::domains::frappe::{FrappeBackend, FrappeError};
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::handlers::ToolOutput;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for create_document.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateDocumentParams {
    #[schemars(description = "DocType name, e.g. 'Customer' or 'Sales Invoice'")]
    pub doctype: String,

    #[schemars(description = "Field values of the new document")]
    pub values: Map<String, Value>,
}

/// Parameters for get_document.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetDocumentParams {
    #[schemars(description = "DocType name")]
    pub doctype: String,

    #[schemars(description = "Document name (primary key)")]
    pub name: String,

    #[schemars(description = "Fields to return (default: all)")]
    pub fields: Option<Vec<String>>,
}

/// Parameters for update_document.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateDocumentParams {
    #[schemars(description = "DocType name")]
    pub doctype: String,

    #[schemars(description = "Document name (primary key)")]
    pub name: String,

    #[schemars(description = "Field values to change")]
    pub values: Map<String, Value>,
}

/// Parameters for delete_document.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteDocumentParams {
    #[schemars(description = "DocType name")]
    pub doctype: String,

    #[schemars(description = "Document name (primary key)")]
    pub name: String,
}

fn document_name(doc: &Value) -> &str {
    doc.get("name").and_then(Value::as_str).unwrap_or("(unnamed)")
}

// ============================================================================
// Tool Definitions
// ============================================================================

pub struct CreateDocumentTool;

#[async_trait]
impl ToolDefinition for CreateDocumentTool {
    const NAME: &'static str = "create_document";
    const DESCRIPTION: &'static str = "Create a new document in Frappe. Check get_required_fields first: every mandatory field must be supplied in 'values'.";
    type Params = CreateDocumentParams;

    #[instrument(skip_all, fields(doctype = %params.doctype))]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        if params.values.is_empty() {
            return Err(FrappeError::invalid_input("'values' must not be empty"));
        }
        let doc = backend
            .create_document(&params.doctype, params.values)
            .await?;
        let summary = format!("Created {} {}", params.doctype, document_name(&doc));
        Ok(ToolOutput::summarized(summary, doc))
    }
}

pub struct GetDocumentTool;

#[async_trait]
impl ToolDefinition for GetDocumentTool {
    const NAME: &'static str = "get_document";
    const DESCRIPTION: &'static str =
        "Retrieve a document from Frappe by DocType and name, optionally limited to some fields.";
    type Params = GetDocumentParams;

    #[instrument(skip_all, fields(doctype = %params.doctype, name = %params.name))]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        let doc = backend
            .get_document(&params.doctype, &params.name, params.fields.as_deref())
            .await?;
        Ok(ToolOutput::json(doc))
    }
}

pub struct UpdateDocumentTool;

#[async_trait]
impl ToolDefinition for UpdateDocumentTool {
    const NAME: &'static str = "update_document";
    const DESCRIPTION: &'static str =
        "Update an existing Frappe document. Only the fields present in 'values' are changed.";
    type Params = UpdateDocumentParams;

    #[instrument(skip_all, fields(doctype = %params.doctype, name = %params.name))]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        let doc = backend
            .update_document(&params.doctype, &params.name, params.values)
            .await?;
        let summary = format!("Updated {} {}", params.doctype, params.name);
        Ok(ToolOutput::summarized(summary, doc))
    }
}

pub struct DeleteDocumentTool;

#[async_trait]
impl ToolDefinition for DeleteDocumentTool {
    const NAME: &'static str = "delete_document";
    const DESCRIPTION: &'static str = "Delete a document from Frappe.";
    type Params = DeleteDocumentParams;

    #[instrument(skip_all, fields(doctype = %params.doctype, name = %params.name))]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        backend
            .delete_document(&params.doctype, &params.name)
            .await?;
        Ok(ToolOutput::text(format!(
            "Deleted {} {}",
            params.doctype, params.name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::frappe::backend::test_support::backend;
    use crate::domains::frappe::testing::{FakeFrappe, token_credentials};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_reports_new_name() {
        let fake = Arc::new(
            FakeFrappe::new().respond_with(|_| Ok(json!({"data": {"name": "CUST-0001"}}))),
        );
        let backend = backend(&fake, token_credentials());
        let params: CreateDocumentParams = serde_json::from_value(json!({
            "doctype": "Customer",
            "values": {"customer_name": "Acme"}
        }))
        .unwrap();

        let output = CreateDocumentTool.execute(&backend, params).await.unwrap();
        assert!(matches!(
            output,
            ToolOutput::Json { summary: Some(ref s), .. } if s == "Created Customer CUST-0001"
        ));
    }

    #[tokio::test]
    async fn test_create_with_empty_values_is_rejected_locally() {
        let fake = Arc::new(FakeFrappe::new());
        let backend = backend(&fake, token_credentials());
        let params = CreateDocumentParams {
            doctype: "Customer".into(),
            values: Map::new(),
        };
        tokio_test::assert_err!(CreateDocumentTool.execute(&backend, params).await);
        assert!(fake.requests().is_empty());
    }

    #[test]
    fn test_schema_requires_doctype_and_name() {
        let tool = GetDocumentTool::to_tool();
        let required = tool.input_schema.get("required").cloned().unwrap();
        assert_eq!(required, json!(["doctype", "name"]));
    }
}
