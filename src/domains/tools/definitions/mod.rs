//! Tool definitions module.
//!
//! Each tool is a unit struct implementing [`ToolDefinition`]: a name, a
//! description, a typed parameter struct (whose JSON Schema is published to
//! clients and whose `required` list drives argument validation) and an
//! `execute` body running against the [`FrappeBackend`].
//!
//! - `document/` - document CRUD, listing, counting and server methods
//! - `schema/` - DocType introspection and discovery
//! - `helper/` - connectivity check and built-in guidance

pub mod document;
pub mod helper;
pub mod schema;

use async_trait::async_trait;
use rmcp::{handler::server::tool::schema_for_type, model::Tool};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use super::handlers::ToolOutput;
use crate::domains::frappe::{FrappeBackend, FrappeError};

pub use document::{
    CallMethodTool, CheckDocumentExistsTool, CreateDocumentTool, DeleteDocumentTool,
    GetDocumentCountTool, GetDocumentTool, ListDocumentsTool, ReconcileBankTransactionTool,
    UpdateDocumentTool,
};
pub use helper::{GetApiInstructionsTool, GetFrappeUsageInfoTool, PingTool};
pub use schema::{
    CheckDoctypeExistsTool, FindDoctypesTool, GetDoctypeSchemaTool, GetDoctypesInModuleTool,
    GetFieldOptionsTool, GetModuleListTool, GetNamingInfoTool, GetRequiredFieldsTool,
};

/// A tool exposed over MCP.
#[async_trait]
pub trait ToolDefinition: Send + Sync + 'static {
    /// Tool name as registered in MCP.
    const NAME: &'static str;

    /// Tool description shown to clients.
    const DESCRIPTION: &'static str;

    /// Arguments, decoded from the call's JSON object.
    type Params: DeserializeOwned + JsonSchema + Send + 'static;

    /// Run the tool.
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError>;

    /// Create a Tool model for this tool (metadata).
    fn to_tool() -> Tool
    where
        Self: Sized,
    {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<Self::Params>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}
