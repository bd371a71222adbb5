//! Field option lookup.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::domains::frappe::{FieldOptions, FrappeBackend, FrappeError};
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::handlers::ToolOutput;

/// Parameters for get_field_options.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetFieldOptionsParams {
    #[schemars(description = "DocType name")]
    pub doctype: String,

    #[schemars(description = "Field name within the DocType")]
    pub fieldname: String,

    #[schemars(description = "For Link fields: filters on the linked DocType")]
    pub filters: Option<Value>,

    #[schemars(description = "For Link fields: maximum number of values (default 50)")]
    pub limit: Option<u32>,
}

pub struct GetFieldOptionsTool;

#[async_trait]
impl ToolDefinition for GetFieldOptionsTool {
    const NAME: &'static str = "get_field_options";
    const DESCRIPTION: &'static str = "Get the allowed values of a field: the choices of a Select field, documents of the linked DocType for a Link field, or the child DocType of a Table field.";
    type Params = GetFieldOptionsParams;

    #[instrument(skip_all, fields(doctype = %params.doctype, fieldname = %params.fieldname))]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        let options = backend
            .get_field_options(&params.doctype, &params.fieldname, params.filters, params.limit)
            .await?;
        let summary = match &options {
            FieldOptions::Select { options } => {
                format!("{} options for {}: {}", options.len(), params.fieldname, options.join(", "))
            }
            FieldOptions::Link { doctype, values } => {
                format!("{} {} record(s) for {}", values.len(), doctype, params.fieldname)
            }
            FieldOptions::Table { child_doctype } => {
                format!("{} is a table of {}", params.fieldname, child_doctype)
            }
        };
        ToolOutput::serialize(Some(summary), &options)
    }
}
