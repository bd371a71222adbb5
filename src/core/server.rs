//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol by delegating to the tool registry.
//!
//! ## Tool Architecture
//!
//! Tools are defined in `domains/tools/definitions/`, registered once in
//! [`ToolRegistry`] and exposed to rmcp through a router built from it.
//! Names the router does not know still go to the registry, so an unknown
//! tool is reported as an `isError` result rather than a protocol error.
//! **Adding a new tool does NOT require modifying this file!**

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::tool::{ToolCallContext, ToolRouter},
    model::{
        CallToolRequestParam, CallToolResult, Implementation, JsonObject, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::config::Config;
use super::error::Result as CoreResult;
use crate::domains::frappe::{
    AuthCoordinator, FrappeApi, FrappeBackend, HealthReport, HttpFrappeClient,
};
use crate::domains::tools::{ToolRegistry, build_tool_router};

/// Instructions sent to clients on initialization.
pub const INSTRUCTIONS: &str = "Tools for a Frappe / ERPNext site. Start with \
find_doctypes or get_doctype_schema to learn the data model, check \
get_required_fields before create_document, and use get_api_instructions or \
get_frappe_usage_info for guidance. Filters accept [field, operator, value] \
triples or an object of field: value / field: [operator, value].";

/// The main MCP server handler.
///
/// This struct implements the `ServerHandler` trait from rmcp. Clones share
/// the registry and therefore the authentication state.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Every tool, with its backend.
    registry: Arc<ToolRegistry>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a server talking to the Frappe site named in `config`.
    pub fn new(config: Config) -> CoreResult<Self> {
        let client = HttpFrappeClient::new(&config.frappe, &config.credentials)?;
        Ok(Self::with_api(config, Arc::new(client)))
    }

    /// Create a server over any [`FrappeApi`] implementation.
    pub fn with_api(config: Config, api: Arc<dyn FrappeApi>) -> Self {
        let config = Arc::new(config);
        let auth = Arc::new(AuthCoordinator::new(
            api.clone(),
            config.credentials.clone(),
        ));
        let registry = Arc::new(ToolRegistry::new(FrappeBackend::new(api, auth)));
        info!("Registered {} tools", registry.tool_names().len());

        Self {
            tool_router: build_tool_router::<Self>(registry.clone()),
            registry,
            config,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn auth(&self) -> &Arc<AuthCoordinator> {
        self.registry.backend().auth()
    }

    /// Probe both authentication channels.
    pub async fn check_health(&self) -> HealthReport {
        self.auth().check_health().await
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    pub async fn call_tool(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        self.registry.dispatch(name, arguments).await
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, request, context), fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        if !self.registry.contains(&request.name) {
            return Ok(self.registry.dispatch(&request.name, request.arguments).await);
        }
        let tcc = ToolCallContext::new(self, request, context);
        self.tool_router.call(tcc).await
    }
}
