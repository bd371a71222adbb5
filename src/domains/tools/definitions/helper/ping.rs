use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::domains::frappe::{FrappeBackend, FrappeError};
use crate::domains::tools::definitions::ToolDefinition;
use crate::domains::tools::handlers::ToolOutput;

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct PingParams {}

/// Answers locally; never touches the Frappe site.
pub struct PingTool;

#[async_trait]
impl ToolDefinition for PingTool {
    const NAME: &'static str = "ping";
    const DESCRIPTION: &'static str = "Check that the MCP server is responding.";
    type Params = PingParams;

    async fn execute(
        &self,
        _backend: &FrappeBackend,
        _params: Self::Params,
    ) -> Result<ToolOutput, FrappeError> {
        Ok(ToolOutput::text("pong"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::frappe::backend::test_support::backend;
    use crate::domains::frappe::testing::FakeFrappe;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_ping_needs_no_credentials() {
        let fake = Arc::new(FakeFrappe::new());
        let backend = backend(&fake, Default::default());

        let output = PingTool.execute(&backend, PingParams {}).await.unwrap();
        assert_eq!(output, ToolOutput::text("pong"));
        assert!(fake.requests().is_empty());
        assert_eq!(fake.login_count(), 0);
    }
}
