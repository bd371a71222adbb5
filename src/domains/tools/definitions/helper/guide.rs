//! Guidance tools backed by the static instruction tables.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::domains::frappe::guide::api_instructions;
use crate::domains::frappe::{FrappeBackend, FrappeError};
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::handlers::ToolOutput;

/// Parameters for get_api_instructions.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetApiInstructionsParams {
    #[schemars(
        description = "DOCUMENT_OPERATIONS, SCHEMA_OPERATIONS, ADVANCED_OPERATIONS or BEST_PRACTICES"
    )]
    pub category: String,

    #[schemars(description = "Operation within the category, e.g. CREATE, LIST, FILTERS")]
    pub operation: String,
}

/// Parameters for get_frappe_usage_info.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GetFrappeUsageInfoParams {
    #[schemars(description = "DocType to summarize")]
    pub doctype: Option<String>,

    #[schemars(description = "Workflow: sales, purchase, project or bank_reconciliation")]
    pub workflow: Option<String>,
}

pub struct GetApiInstructionsTool;

#[async_trait]
impl ToolDefinition for GetApiInstructionsTool {
    const NAME: &'static str = "get_api_instructions";
    const DESCRIPTION: &'static str =
        "Get instructions for using the Frappe tools for one category and operation.";
    type Params = GetApiInstructionsParams;

    async fn execute(
        &self,
        _backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        let text = api_instructions(&params.category, &params.operation)?;
        Ok(ToolOutput::text(format!(
            "{} / {}\n\n{}",
            params.category.to_uppercase(),
            params.operation.to_uppercase(),
            text
        )))
    }
}

pub struct GetFrappeUsageInfoTool;

#[async_trait]
impl ToolDefinition for GetFrappeUsageInfoTool {
    const NAME: &'static str = "get_frappe_usage_info";
    const DESCRIPTION: &'static str = "Get an overview of working with Frappe, optionally focused on a DocType and/or a common workflow.";
    type Params = GetFrappeUsageInfoParams;

    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        let text = backend
            .usage_info(params.doctype.as_deref(), params.workflow.as_deref())
            .await?;
        Ok(ToolOutput::text(text))
    }
}
