//! DocType and module discovery.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::instrument;

use crate::domains::frappe::{DocTypeSearch, FrappeBackend, FrappeError};
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::handlers::ToolOutput;

/// Parameters for find_doctypes.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct FindDoctypesParams {
    #[schemars(description = "Part of the DocType name to search for")]
    pub search_term: Option<String>,

    #[schemars(description = "Only DocTypes of this module")]
    pub module: Option<String>,

    #[schemars(description = "Only child tables (true) or only non-tables (false)")]
    pub is_table: Option<bool>,

    #[schemars(description = "Only single DocTypes (true) or only non-singles (false)")]
    pub is_single: Option<bool>,

    #[schemars(description = "Only custom DocTypes (true) or only standard ones (false)")]
    pub is_custom: Option<bool>,

    #[schemars(description = "Maximum number of results (default 20)")]
    pub limit: Option<u32>,
}

impl From<FindDoctypesParams> for DocTypeSearch {
    fn from(params: FindDoctypesParams) -> Self {
        Self {
            search_term: params.search_term,
            module: params.module,
            is_table: params.is_table,
            is_single: params.is_single,
            is_custom: params.is_custom,
            limit: params.limit,
        }
    }
}

/// get_module_list takes no arguments.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct NoParams {}

/// Parameters for get_doctypes_in_module.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ModuleParams {
    #[schemars(description = "Module name, e.g. 'Accounts'")]
    pub module: String,
}

pub struct FindDoctypesTool;

#[async_trait]
impl ToolDefinition for FindDoctypesTool {
    const NAME: &'static str = "find_doctypes";
    const DESCRIPTION: &'static str =
        "Search DocTypes by name, module and kind (table, single, custom).";
    type Params = FindDoctypesParams;

    #[instrument(skip_all)]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        let doctypes = backend.find_doctypes(params.into()).await?;
        Ok(ToolOutput::listing("DocTypes", doctypes))
    }
}

pub struct GetModuleListTool;

#[async_trait]
impl ToolDefinition for GetModuleListTool {
    const NAME: &'static str = "get_module_list";
    const DESCRIPTION: &'static str = "List all modules installed on the site.";
    type Params = NoParams;

    #[instrument(skip_all)]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        _params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        let modules = backend.get_module_list().await?;
        Ok(ToolOutput::listing("Modules", modules))
    }
}

pub struct GetDoctypesInModuleTool;

#[async_trait]
impl ToolDefinition for GetDoctypesInModuleTool {
    const NAME: &'static str = "get_doctypes_in_module";
    const DESCRIPTION: &'static str = "List every DocType belonging to a module.";
    type Params = ModuleParams;

    #[instrument(skip_all, fields(module = %params.module))]
    async fn execute(
        &self,
        backend: &FrappeBackend,
        params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        let doctypes = backend.get_doctypes_in_module(&params.module).await?;
        Ok(ToolOutput::listing("DocTypes", doctypes))
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
    async fn test_find_doctypes_builds_like_filter() {
        let fake = Arc::new(FakeFrappe::new());
        let backend = backend(&fake, token_credentials());
        let params = FindDoctypesParams {
            search_term: Some("Invoice".into()),
            is_table: Some(false),
            ..Default::default()
        };

        FindDoctypesTool.execute(&backend, params).await.unwrap();

        let (request, _) = fake.requests().pop().unwrap();
        assert_eq!(request.path(), "/api/resource/DocType");
        assert_eq!(
            request.query_value("filters"),
            Some(r#"[["name","like","%Invoice%"],["istable","=",0]]"#)
        );
    }

    #[tokio::test]
    async fn test_module_list_accepts_empty_arguments() {
        let fake = Arc::new(
            FakeFrappe::new()
                .respond_with(|_| Ok(json!({"data": [{"name": "Accounts"}, {"name": "CRM"}]}))),
        );
        let backend = backend(&fake, token_credentials());
        let params: NoParams = serde_json::from_value(json!({})).unwrap();

        let output = GetModuleListTool.execute(&backend, params).await.unwrap();
        assert!(matches!(
            output,
            ToolOutput::Json { summary: Some(ref s), .. } if s == "Modules retrieved: 2"
        ));
    }

    #[tokio::test]
    async fn test_doctypes_in_module_filters_by_module() {
        let fake = Arc::new(FakeFrappe::new());
        let backend = backend(&fake, token_credentials());
        let params = ModuleParams {
            module: "Accounts".into(),
        };

        GetDoctypesInModuleTool.execute(&backend, params).await.unwrap();

        let (request, _) = fake.requests().pop().unwrap();
        assert_eq!(
            request.query_value("filters"),
            Some(r#"[["module","=","Accounts"]]"#)
        );
    }
}
