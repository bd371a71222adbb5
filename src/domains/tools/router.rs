//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! Every route forwards to [`ToolRegistry::dispatch`], so the STDIO server
//! and the HTTP transport share one validation and error path.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter};

use super::registry::ToolRegistry;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(registry: Arc<ToolRegistry>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    registry
        .tools()
        .into_iter()
        .fold(ToolRouter::new(), |router, tool| {
            let name = tool.name.to_string();
            let registry = registry.clone();
            router.with_route(ToolRoute::new_dyn(tool, move |ctx: ToolCallContext<'_, S>| {
                let name = name.clone();
                let registry = registry.clone();
                let arguments = ctx.arguments;
                async move { Ok(registry.dispatch(&name, arguments).await) }.boxed()
            }))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::frappe::backend::test_support::backend;
    use crate::domains::frappe::testing::{FakeFrappe, token_credentials};

    struct TestServer {}

    fn test_registry() -> Arc<ToolRegistry> {
        let fake = Arc::new(FakeFrappe::new());
        Arc::new(ToolRegistry::new(backend(&fake, token_credentials())))
    }

    #[test]
    fn test_build_router() {
        let router: ToolRouter<TestServer> = build_tool_router(test_registry());
        let tools = router.list_all();
        assert_eq!(tools.len(), 20);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"ping"));
        assert!(names.contains(&"list_documents"));
        assert!(names.contains(&"reconcile_bank_transaction_with_vouchers"));
        assert!(names.contains(&"get_api_instructions"));
    }

    #[test]
    fn test_registry_matches_router() {
        let registry = test_registry();
        let registry_names = registry.tool_names();

        let router: ToolRouter<TestServer> = build_tool_router(registry);
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

        assert_eq!(registry_names.len(), router_names.len());
        for name in registry_names {
            assert!(router_names.contains(&name));
        }
    }

    #[test]
    fn test_routes_publish_input_schemas() {
        let router: ToolRouter<TestServer> = build_tool_router(test_registry());
        let tool = router
            .list_all()
            .into_iter()
            .find(|t| t.name == "get_document")
            .unwrap();
        assert_eq!(tool.input_schema.get("type").unwrap(), "object");
    }
}
