//! Per-DocType introspection tools.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::domains::frappe::{FrappeBackend, FrappeError};
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::handlers::ToolOutput;

/// Parameters shared by the tools taking a single DocType.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DoctypeParams {
    #[schemars(description = "DocType name, e.g. 'Sales Invoice'")]
    pub doctype: String,
}

pub struct GetDoctypeSchemaTool;

#[async_trait]
impl ToolDefinition for GetDoctypeSchemaTool {
    const NAME: &'static str = "get_doctype_schema";
    const DESCRIPTION: &'static str = "Get the definition of a DocType: module, naming, flags and every field with its type, options and mandatory flag.";
    type Params = DoctypeParams;

    #[instrument(skip_all, fields(doctype = %params.doctype))]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        let schema = backend.get_doctype_schema(&params.doctype).await?;
        let summary = format!("Schema of {} ({} fields)", schema.name, schema.fields.len());
        ToolOutput::serialize(Some(summary), &schema)
    }
}

pub struct CheckDoctypeExistsTool;

#[async_trait]
impl ToolDefinition for CheckDoctypeExistsTool {
    const NAME: &'static str = "check_doctype_exists";
    const DESCRIPTION: &'static str = "Check whether a DocType exists on the site.";
    type Params = DoctypeParams;

    #[instrument(skip_all, fields(doctype = %params.doctype))]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        let exists = backend.doctype_exists(&params.doctype).await?;
        let summary = if exists {
            format!("DocType {} exists", params.doctype)
        } else {
            format!("DocType {} does not exist", params.doctype)
        };
        Ok(ToolOutput::summarized(
            summary,
            json!({ "doctype": params.doctype, "exists": exists }),
        ))
    }
}

pub struct GetRequiredFieldsTool;

#[async_trait]
impl ToolDefinition for GetRequiredFieldsTool {
    const NAME: &'static str = "get_required_fields";
    const DESCRIPTION: &'static str =
        "List the mandatory fields of a DocType, to check before create_document.";
    type Params = DoctypeParams;

    #[instrument(skip_all, fields(doctype = %params.doctype))]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        let fields = backend.get_required_fields(&params.doctype).await?;
        let summary = format!("Required fields retrieved: {}", fields.len());
        ToolOutput::serialize(Some(summary), &fields)
    }
}

pub struct GetNamingInfoTool;

#[async_trait]
impl ToolDefinition for GetNamingInfoTool {
    const NAME: &'static str = "get_naming_info";
    const DESCRIPTION: &'static str = "Explain how documents of a DocType are named (autoname, naming rule, naming series, title field).";
    type Params = DoctypeParams;

    #[instrument(skip_all, fields(doctype = %params.doctype))]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        let info = backend.get_naming_info(&params.doctype).await?;
        ToolOutput::serialize(Some(info.explanation.clone()), &info)
    }
}
