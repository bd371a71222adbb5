//! Listing, counting and existence tools.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::domains::frappe::filters::normalize_optional;
use crate::domains::frappe::{FrappeBackend, FrappeError, ListQuery};
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::handlers::ToolOutput;

const FILTERS_HELP: &str = "Filters: a list of [field, operator, value] triples, or an object \
    mapping field to value (equality) or to [operator, value]";

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for list_documents.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListDocumentsParams {
    #[schemars(description = "DocType name")]
    pub doctype: String,

    #[schemars(description = FILTERS_HELP)]
    pub filters: Option<Value>,

    #[schemars(description = "Fields to return (default: name only)")]
    pub fields: Option<Vec<String>>,

    #[schemars(description = "Maximum number of documents (default 20, 0 for all)")]
    pub limit: Option<u32>,

    #[schemars(description = "Offset of the first document")]
    pub limit_start: Option<u32>,

    #[schemars(description = "Sort order, e.g. 'modified desc'")]
    pub order_by: Option<String>,
}

/// Parameters for get_document_count.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetDocumentCountParams {
    #[schemars(description = "DocType name")]
    pub doctype: String,

    #[schemars(description = FILTERS_HELP)]
    pub filters: Option<Value>,
}

/// Parameters for check_document_exists.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CheckDocumentExistsParams {
    #[schemars(description = "DocType name")]
    pub doctype: String,

    #[schemars(description = "Document name (primary key)")]
    pub name: String,
}

// ============================================================================
// Tool Definitions
// ============================================================================

pub struct ListDocumentsTool;

#[async_trait]
impl ToolDefinition for ListDocumentsTool {
    const NAME: &'static str = "list_documents";
    const DESCRIPTION: &'static str = "List documents of a DocType with optional filters, fields, paging and ordering.";
    type Params = ListDocumentsParams;

    #[instrument(skip_all, fields(doctype = %params.doctype))]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        let mut query = ListQuery::new(params.doctype).with_filters(params.filters)?;
        query.fields = params.fields;
        query.limit = params.limit;
        query.limit_start = params.limit_start;
        query.order_by = params.order_by;

        let documents = backend.list_documents(query).await?;
        Ok(ToolOutput::listing("Documents", documents))
    }
}

pub struct GetDocumentCountTool;

#[async_trait]
impl ToolDefinition for GetDocumentCountTool {
    const NAME: &'static str = "get_document_count";
    const DESCRIPTION: &'static str = "Count the documents of a DocType, optionally matching filters.";
    type Params = GetDocumentCountParams;

    #[instrument(skip_all, fields(doctype = %params.doctype))]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        let filters = normalize_optional(params.filters)?;
        let count = backend
            .count_documents(&params.doctype, filters.as_ref())
            .await?;
        Ok(ToolOutput::summarized(
            format!("{} count: {}", params.doctype, count),
            json!({ "doctype": params.doctype, "count": count }),
        ))
    }
}

pub struct CheckDocumentExistsTool;

#[async_trait]
impl ToolDefinition for CheckDocumentExistsTool {
    const NAME: &'static str = "check_document_exists";
    const DESCRIPTION: &'static str = "Check whether a document with the given name exists.";
    type Params = CheckDocumentExistsParams;

    #[instrument(skip_all, fields(doctype = %params.doctype, name = %params.name))]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        let exists = backend
            .document_exists(&params.doctype, &params.name)
            .await?;
        let summary = if exists {
            format!("{} {} exists", params.doctype, params.name)
        } else {
            format!("{} {} does not exist", params.doctype, params.name)
        };
        Ok(ToolOutput::summarized(
            summary,
            json!({ "doctype": params.doctype, "name": params.name, "exists": exists }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::frappe::backend::test_support::backend;
    use crate::domains::frappe::testing::{FakeFrappe, token_credentials};
    use std::sync::Arc;

    fn params<T: serde::de::DeserializeOwned>(value: Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_list_sends_normalized_filters() {
        let fake = Arc::new(FakeFrappe::new().respond_with(|_| {
            Ok(json!({"data": [{"name": "CUST-1"}, {"name": "CUST-2"}]}))
        }));
        let backend = backend(&fake, token_credentials());

        let output = ListDocumentsTool
            .execute(
                &backend,
                params(json!({
                    "doctype": "Customer",
                    "filters": {"customer_group": "Retail", "creation": [">", "2024-01-01"]},
                    "limit": 5
                })),
            )
            .await
            .unwrap();

        let (request, _) = fake.requests().pop().unwrap();
        assert_eq!(
            request.query_value("filters"),
            Some(r#"[["customer_group","=","Retail"],["creation",">","2024-01-01"]]"#)
        );
        assert_eq!(request.query_value("limit_page_length"), Some("5"));
        assert!(matches!(
            output,
            ToolOutput::Json { summary: Some(ref s), .. } if s == "Documents retrieved: 2"
        ));
    }

    #[tokio::test]
    async fn test_count_with_string_filters() {
        let fake = Arc::new(FakeFrappe::new().respond_with(|_| Ok(json!({"message": 7}))));
        let backend = backend(&fake, token_credentials());

        let output = GetDocumentCountTool
            .execute(
                &backend,
                params(json!({"doctype": "Task", "filters": r#"{"status": "Open"}"#})),
            )
            .await
            .unwrap();

        let (request, _) = fake.requests().pop().unwrap();
        assert_eq!(
            request.query_value("filters"),
            Some(r#"[["status","=","Open"]]"#)
        );
        assert_eq!(
            output,
            ToolOutput::summarized("Task count: 7", json!({"doctype": "Task", "count": 7}))
        );
    }

    #[tokio::test]
    async fn test_count_with_null_filters_counts_everything() {
        let fake = Arc::new(FakeFrappe::new().respond_with(|_| Ok(json!({"message": 12}))));
        let backend = backend(&fake, token_credentials());

        GetDocumentCountTool
            .execute(&backend, params(json!({"doctype": "Task", "filters": null})))
            .await
            .unwrap();

        let (request, _) = fake.requests().pop().unwrap();
        assert_eq!(request.query_value("doctype"), Some("Task"));
        assert_eq!(request.query_value("filters"), None);
    }

    #[tokio::test]
    async fn test_count_rejects_scalar_filters_before_calling() {
        let fake = Arc::new(FakeFrappe::new());
        let backend = backend(&fake, token_credentials());

        let result = GetDocumentCountTool
            .execute(&backend, params(json!({"doctype": "Task", "filters": 42})))
            .await;

        assert!(matches!(result, Err(FrappeError::InvalidInput(_))));
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_document() {
        let fake = Arc::new(FakeFrappe::new().respond_with(|_| Ok(json!({"message": 0}))));
        let backend = backend(&fake, token_credentials());

        let output = CheckDocumentExistsTool
            .execute(&backend, params(json!({"doctype": "Task", "name": "TASK-404"})))
            .await
            .unwrap();

        let ToolOutput::Json { summary, value } = output else {
            panic!("expected JSON output");
        };
        assert_eq!(summary.as_deref(), Some("Task TASK-404 does not exist"));
        assert_eq!(value["exists"], json!(false));
    }
}
