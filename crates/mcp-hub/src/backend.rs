//! Backend connections.
//!
//! [`BackendConnection`] is the seam between the hub and a tool server.
//! [`StdioBackend`] is the production implementation: a child process
//! speaking MCP over stdio, driven by the rmcp client.

use async_trait::async_trait;
use mcp_gateway_core::{Error, Namespace, Result, ServerConfig, validate_server_config};
use rmcp::model::{CallToolRequestParam, CallToolResult, JsonObject, Tool};
use rmcp::service::RunningService;
use rmcp::transport::{ConfigureCommandExt, TokioChildProcess};
use rmcp::{RoleClient, ServiceExt};
use std::borrow::Cow;

/// A connected backend tool server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackendConnection: Send + Sync {
    /// Lists the backend's operations under their local names.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot answer the listing request.
    async fn list_operations(&self) -> Result<Vec<Tool>>;

    /// Invokes a local operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the call cannot be delivered or the backend
    /// rejects it at the protocol level. Tool-level failures come back as a
    /// result with `is_error` set.
    async fn invoke(&self, operation: &str, arguments: Option<JsonObject>)
    -> Result<CallToolResult>;
}

/// Backend reached through a child process over stdio.
pub struct StdioBackend {
    namespace: Namespace,
    service: RunningService<RoleClient, ()>,
}

impl std::fmt::Debug for StdioBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdioBackend")
            .field("namespace", &self.namespace)
            .field("service", &"RunningService{..}")
            .finish()
    }
}

impl StdioBackend {
    /// Spawns the backend described by `config` and completes the MCP handshake.
    ///
    /// # Errors
    ///
    /// Returns `Error::ValidationError` if the configuration is unsafe to
    /// spawn, and `Error::ConnectionFailed` if the process cannot be started
    /// or the handshake fails.
    pub async fn connect(namespace: Namespace, config: &ServerConfig) -> Result<Self> {
        tracing::info!("Connecting to backend '{}': {}", namespace, config.command());

        validate_server_config(config)?;

        let transport = TokioChildProcess::new(
            tokio::process::Command::new(config.command()).configure(|cmd| {
                cmd.args(config.args());
                cmd.envs(config.env());
                if let Some(cwd) = config.cwd() {
                    cmd.current_dir(cwd);
                }
            }),
        )
        .map_err(|e| Error::ConnectionFailed {
            server: namespace.to_string(),
            source: Box::new(e),
        })?;

        let service = ().serve(transport).await.map_err(|e| Error::ConnectionFailed {
            server: namespace.to_string(),
            source: Box::new(e),
        })?;

        tracing::info!("Connected to backend '{}'", namespace);

        Ok(Self { namespace, service })
    }

    /// Namespace this backend was registered under.
    #[must_use]
    pub const fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

#[async_trait]
impl BackendConnection for StdioBackend {
    async fn list_operations(&self) -> Result<Vec<Tool>> {
        self.service
            .list_all_tools()
            .await
            .map_err(|e| Error::ExecutionError {
                message: format!("Failed to list tools of '{}': {e}", self.namespace),
                source: Some(Box::new(e)),
            })
    }

    async fn invoke(
        &self,
        operation: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult> {
        tracing::debug!("Calling {}::{}", self.namespace, operation);

        self.service
            .call_tool(CallToolRequestParam {
                name: Cow::Owned(operation.to_owned()),
                arguments,
            })
            .await
            .map_err(|e| Error::ExecutionError {
                message: format!("Tool call {}::{operation} failed: {e}", self.namespace),
                source: Some(Box::new(e)),
            })
    }
}
