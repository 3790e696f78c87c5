//! MCP server surface of the gateway.
//!
//! `GatewayService` exposes the merged catalog of every backend as its own
//! tool list and forwards each call through the [`Orchestrator`].

use crate::orchestrator::Orchestrator;
use rmcp::ServerHandler;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam,
    ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use std::future::Future;
use std::sync::Arc;

/// MCP server that federates backends behind one catalog.
///
/// # Examples
///
/// ```no_run
/// use mcp_gateway_server::{GatewayService, Orchestrator};
/// use rmcp::ServiceExt;
///
/// # async fn example(orchestrator: Orchestrator) -> anyhow::Result<()> {
/// let service = GatewayService::new(orchestrator);
/// service.serve(rmcp::transport::stdio()).await?.waiting().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GatewayService {
    orchestrator: Arc<Orchestrator>,
}

impl GatewayService {
    /// Wraps an orchestrator.
    #[must_use]
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// The orchestrator serving calls.
    #[must_use]
    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }
}

impl ServerHandler for GatewayService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Gateway to several MCP servers. Tool names are prefixed with their \
                 server namespace. Responses of learned tools are trimmed; fields listed \
                 in '_ghosts' can be requested with the 'include' argument."
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, rmcp::ErrorData>> + Send + '_ {
        async move {
            let tools = self.orchestrator.list_operations().await;
            tracing::debug!("Listing {} tools", tools.len());
            Ok(ListToolsResult {
                tools,
                next_cursor: None,
            })
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, rmcp::ErrorData>> + Send + '_ {
        async move {
            Ok(self
                .orchestrator
                .invoke(&request.name, request.arguments)
                .await)
        }
    }
}
