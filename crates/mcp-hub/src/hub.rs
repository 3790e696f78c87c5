//! The namespace hub.

use crate::backend::{BackendConnection, StdioBackend};
use crate::naming::{namespaced_name, split_operation_name};
use mcp_gateway_core::{Error, GatewayConfig, Namespace, OperationName, Result, ServerConfig};
use rmcp::model::{CallToolResult, JsonObject, Tool};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// A registered backend with its environment defaults.
struct Binding {
    connection: Arc<dyn BackendConnection>,
    env: HashMap<String, String>,
}

/// Raw backend result plus the owning backend's environment defaults.
#[derive(Debug, Clone)]
pub struct HubResponse {
    /// Result exactly as the backend returned it.
    pub result: CallToolResult,
    /// Env defaults of the backend that served the call.
    pub env_defaults: HashMap<String, String>,
}

/// Routes operations across namespaced backends.
///
/// Registration happens once at startup through `&mut self`; afterwards the
/// hub is shared read-only.
#[derive(Default)]
pub struct Hub {
    bindings: HashMap<Namespace, Binding>,
    order: Vec<Namespace>,
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("namespaces", &self.order)
            .finish_non_exhaustive()
    }
}

impl Hub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Connects every backend of `config`, in namespace order.
    ///
    /// # Errors
    ///
    /// Stops at the first backend that fails to connect.
    pub async fn connect_all(config: &GatewayConfig) -> Result<Self> {
        let mut hub = Self::new();
        for (namespace, server) in config.namespaces() {
            hub.register(namespace, server).await?;
        }
        Ok(hub)
    }

    /// Connects to the backend described by `config` and registers it.
    ///
    /// # Errors
    ///
    /// Returns the connection error unchanged; callers treat it as fatal.
    pub async fn register(&mut self, namespace: Namespace, config: &ServerConfig) -> Result<()> {
        let backend = StdioBackend::connect(namespace.clone(), config).await?;
        self.register_connection(namespace, Arc::new(backend), config.env().clone());
        Ok(())
    }

    /// Registers an already connected backend.
    ///
    /// Re-registering a namespace replaces the previous backend but keeps
    /// its position in listing order.
    pub fn register_connection(
        &mut self,
        namespace: Namespace,
        connection: Arc<dyn BackendConnection>,
        env: HashMap<String, String>,
    ) {
        if !self.bindings.contains_key(&namespace) {
            self.order.push(namespace.clone());
        }
        self.bindings.insert(namespace, Binding { connection, env });
    }

    /// Registered namespaces in registration order.
    #[must_use]
    pub fn namespaces(&self) -> &[Namespace] {
        &self.order
    }

    /// Number of registered backends.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no backend is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Merged catalog of every backend.
    ///
    /// Names become `<namespace>_<local>` and descriptions get a
    /// `[Source: <namespace>]` prefix. A backend that fails to list is
    /// logged and left out.
    pub async fn list_all(&self) -> Vec<Tool> {
        let mut all = Vec::new();

        for namespace in &self.order {
            let Some(binding) = self.bindings.get(namespace) else {
                continue;
            };
            match binding.connection.list_operations().await {
                Ok(tools) => {
                    tracing::debug!("Backend '{}' lists {} tools", namespace, tools.len());
                    all.extend(tools.into_iter().map(|tool| namespace_tool(namespace, tool)));
                }
                Err(e) => {
                    tracing::warn!("Failed to list tools for '{}': {}", namespace, e);
                }
            }
        }

        all
    }

    /// Forwards `name` to its backend.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidOperationName` if `name` cannot be split,
    /// `Error::ResourceNotFound` if its namespace is not registered, or the
    /// backend's own error.
    pub async fn invoke(
        &self,
        name: &OperationName,
        arguments: Option<JsonObject>,
    ) -> Result<HubResponse> {
        let (namespace, local) = split_operation_name(name.as_str())?;
        let binding = self
            .bindings
            .get(&namespace)
            .ok_or_else(|| Error::ResourceNotFound {
                resource: format!("backend '{namespace}' not found"),
            })?;

        tracing::debug!("Routing {} to '{}' as {}", name, namespace, local);
        let result = binding.connection.invoke(&local, arguments).await?;

        Ok(HubResponse {
            result,
            env_defaults: binding.env.clone(),
        })
    }

    /// Env defaults of the backend owning `name`; empty when unknown.
    #[must_use]
    pub fn env_defaults_for(&self, name: &OperationName) -> HashMap<String, String> {
        name.namespace()
            .and_then(|ns| self.bindings.get(&ns))
            .map(|binding| binding.env.clone())
            .unwrap_or_default()
    }
}

fn namespace_tool(namespace: &Namespace, mut tool: Tool) -> Tool {
    let description = tool.description.as_deref().unwrap_or_default();
    tool.description = Some(Cow::Owned(format!("[Source: {namespace}] {description}")));
    tool.name = Cow::Owned(namespaced_name(namespace, &tool.name).as_str().to_owned());
    tool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackendConnection;
    use rmcp::model::Content;

    fn tool(name: &'static str, description: &'static str) -> Tool {
        Tool::new(name, description, Arc::new(JsonObject::new()))
    }

    fn backend_with(tools: Vec<Tool>) -> Arc<dyn BackendConnection> {
        let mut mock = MockBackendConnection::new();
        mock.expect_list_operations()
            .returning(move || Ok(tools.clone()));
        mock.expect_invoke().returning(|operation, _| {
            Ok(CallToolResult::success(vec![Content::text(format!(
                "called {operation}"
            ))]))
        });
        Arc::new(mock)
    }

    fn failing_backend() -> Arc<dyn BackendConnection> {
        let mut mock = MockBackendConnection::new();
        mock.expect_list_operations().returning(|| {
            Err(Error::ExecutionError {
                message: "backend crashed".to_string(),
                source: None,
            })
        });
        Arc::new(mock)
    }

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone())
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_all_namespaces_and_prefixes() {
        let mut hub = Hub::new();
        hub.register_connection(
            Namespace::new("ado"),
            backend_with(vec![tool("get_item", "Get a work item")]),
            HashMap::new(),
        );
        hub.register_connection(
            Namespace::new("gh"),
            backend_with(vec![tool("get_item", "Get an issue")]),
            HashMap::new(),
        );

        let tools = hub.list_all().await;
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert_eq!(names, vec!["ado_get_item", "gh_get_item"]);
        assert_eq!(
            tools[0].description.as_deref(),
            Some("[Source: ado] Get a work item")
        );
    }

    #[tokio::test]
    async fn test_list_all_skips_failing_backend() {
        let mut hub = Hub::new();
        hub.register_connection(Namespace::new("bad"), failing_backend(), HashMap::new());
        hub.register_connection(
            Namespace::new("ok"),
            backend_with(vec![tool("ping", "Ping")]),
            HashMap::new(),
        );

        let tools = hub.list_all().await;
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "ok_ping");
    }

    #[tokio::test]
    async fn test_invoke_routes_on_first_separator() {
        let mut env = HashMap::new();
        env.insert("project".to_string(), "Contoso".to_string());

        let mut hub = Hub::new();
        hub.register_connection(Namespace::new("ado"), backend_with(vec![]), env);

        let response = hub
            .invoke(&OperationName::new("ado_get_work_item"), None)
            .await
            .unwrap();
        assert_eq!(text_of(&response.result), "called get_work_item");
        assert_eq!(
            response.env_defaults.get("project").map(String::as_str),
            Some("Contoso")
        );
    }

    #[tokio::test]
    async fn test_invoke_unknown_namespace() {
        let hub = Hub::new();
        let err = hub
            .invoke(&OperationName::new("jira_get_issue"), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("backend 'jira' not found"));
    }

    #[tokio::test]
    async fn test_invoke_malformed_name() {
        let hub = Hub::new();
        let err = hub
            .invoke(&OperationName::new("noseparator"), None)
            .await
            .unwrap_err();
        assert!(err.is_invalid_operation_name());
    }

    #[test]
    fn test_env_defaults_for_unknown_is_empty() {
        let mut hub = Hub::new();
        let mut env = HashMap::new();
        env.insert("org".to_string(), "contoso".to_string());
        hub.register_connection(Namespace::new("ado"), backend_with(vec![]), env);

        assert_eq!(
            hub.env_defaults_for(&OperationName::new("ado_x")).len(),
            1
        );
        assert!(hub.env_defaults_for(&OperationName::new("gh_x")).is_empty());
        assert!(hub.env_defaults_for(&OperationName::new("plain")).is_empty());
    }

    #[tokio::test]
    async fn test_connect_all_without_servers() {
        let config = GatewayConfig::from_toml_str("[oracle]\napi_key = \"sk-test\"\n").unwrap();
        let hub = Hub::connect_all(&config).await.unwrap();
        assert!(hub.is_empty());
    }

    #[test]
    fn test_reregister_keeps_order() {
        let mut hub = Hub::new();
        hub.register_connection(Namespace::new("a"), backend_with(vec![]), HashMap::new());
        hub.register_connection(Namespace::new("b"), backend_with(vec![]), HashMap::new());
        hub.register_connection(Namespace::new("a"), backend_with(vec![]), HashMap::new());

        assert_eq!(hub.len(), 2);
        assert_eq!(
            hub.namespaces(),
            &[Namespace::new("a"), Namespace::new("b")]
        );
    }
}
