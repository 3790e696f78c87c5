//! Gateway orchestrator.
//!
//! Owns the per-operation learning lifecycle:
//!
//! ```text
//! Unlearned ──first JSON response──▶ Learning ──oracle/fallback──▶ Classified
//! ```
//!
//! Responses are returned raw until an operation is classified, and masked
//! afterwards. Learning runs in a spawned task, so the call that triggers it
//! never waits on the oracle.

use crate::catalog::decorate_classified;
use crate::state::LearningState;
use crate::types::InvocationArgs;
use mcp_gateway_adaptive::{LearningStatus, MaskingEngine, RegistryEntry, RegistryStore};
use mcp_gateway_core::{OperationDescriptor, OperationName};
use mcp_gateway_hub::Hub;
use mcp_gateway_oracle::{ClassificationOracle, classify_or_fallback};
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Upper bound on a single oracle call when none is configured.
pub const DEFAULT_CLASSIFY_TIMEOUT: Duration = Duration::from_secs(60);

/// Routes calls through the hub and applies learned masks.
pub struct Orchestrator {
    hub: Arc<Hub>,
    registry: Arc<RegistryStore>,
    oracle: Arc<dyn ClassificationOracle>,
    masking: MaskingEngine,
    state: Arc<LearningState>,
    classify_timeout: Duration,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("hub", &self.hub)
            .field("registry", &self.registry.path())
            .field("masking", &self.masking)
            .field("classify_timeout", &self.classify_timeout)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Creates an orchestrator with default masking and oracle timeout.
    #[must_use]
    pub fn new(
        hub: Arc<Hub>,
        registry: Arc<RegistryStore>,
        oracle: Arc<dyn ClassificationOracle>,
    ) -> Self {
        Self {
            hub,
            registry,
            oracle,
            masking: MaskingEngine::default(),
            state: Arc::new(LearningState::new()),
            classify_timeout: DEFAULT_CLASSIFY_TIMEOUT,
        }
    }

    /// Replaces the masking engine.
    #[must_use]
    pub fn with_masking(mut self, masking: MaskingEngine) -> Self {
        self.masking = masking;
        self
    }

    /// Sets the upper bound on a single oracle call.
    #[must_use]
    pub fn with_classify_timeout(mut self, timeout: Duration) -> Self {
        self.classify_timeout = timeout;
        self
    }

    /// The registry backing this orchestrator.
    #[must_use]
    pub fn registry(&self) -> &Arc<RegistryStore> {
        &self.registry
    }

    /// Learning state of `operation`.
    pub async fn status(&self, operation: &str) -> LearningStatus {
        match self.registry.status(operation).await {
            LearningStatus::Classified => LearningStatus::Classified,
            _ if self.state.is_learning(operation).await => LearningStatus::Learning,
            _ => LearningStatus::Unlearned,
        }
    }

    /// Merged catalog with classified operations decorated.
    ///
    /// Also refreshes the descriptor cache used for env injection and as
    /// oracle input.
    pub async fn list_operations(&self) -> Vec<Tool> {
        let tools = self.hub.list_all().await;
        self.state.cache_tools(&tools).await;

        let mut listed = Vec::with_capacity(tools.len());
        for tool in tools {
            if self.registry.status(&tool.name).await == LearningStatus::Classified {
                listed.push(decorate_classified(tool));
            } else {
                listed.push(tool);
            }
        }
        listed
    }

    /// Invokes `name` and post-processes the backend result.
    ///
    /// Never fails: upstream errors come back as error tool results.
    pub async fn invoke(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let operation = OperationName::new(name);
        let mut args = InvocationArgs::split(arguments);

        let descriptor = self.state.descriptor(name).await;
        if let Some(descriptor) = &descriptor {
            let env = self.hub.env_defaults_for(&operation);
            let injected = args.inject_env(&env, descriptor);
            if !injected.is_empty() {
                debug!(operation = name, ?injected, "Injected env defaults");
            }
        }

        let result = match self.hub.invoke(&operation, Some(args.upstream())).await {
            Ok(response) => response.result,
            Err(e) => {
                warn!(operation = name, error = %e, "Invocation failed");
                return CallToolResult::error(vec![Content::text(e.to_string())]);
            }
        };

        if result.is_error == Some(true) {
            return result;
        }
        let Some(raw) = json_payload(&result) else {
            debug!(operation = name, "Non-JSON result, passing through");
            return result;
        };

        if let Some(entry) = self.registry.get(name).await
            && entry.is_classified()
        {
            return self.mask(name, entry, &args, &raw).await.unwrap_or(result);
        }

        self.begin_learning(operation, descriptor, raw).await;
        result
    }

    /// Masks `raw` and records `include` requests.
    ///
    /// The masked view replaces the whole result with a single text item;
    /// further content items and structured content of the backend result
    /// are not carried over.
    async fn mask(
        &self,
        name: &str,
        entry: RegistryEntry,
        args: &InvocationArgs,
        raw: &Value,
    ) -> Option<CallToolResult> {
        let included: Vec<String> = args
            .include()
            .iter()
            .map(|path| entry.schema.normalize_requested(path))
            .collect();
        let entry = self
            .registry
            .record_access(name, &included)
            .await
            .unwrap_or(entry);

        let mut extra = included;
        extra.extend(
            args.projected_fields()
                .iter()
                .map(|path| entry.schema.normalize_requested(path)),
        );

        let masked = self.masking.apply(raw, &entry, &extra, name);
        debug!(operation = name, requested = extra.len(), "Masked response");
        let text = serde_json::to_string_pretty(&masked)
            .inspect_err(|e| warn!(operation = name, error = %e, "Failed to serialize masked result"))
            .ok()?;
        Some(CallToolResult::success(vec![Content::text(text)]))
    }

    async fn begin_learning(
        &self,
        operation: OperationName,
        descriptor: Option<OperationDescriptor>,
        sample: Value,
    ) {
        let name = operation.as_str();
        if !self.state.try_begin(name).await {
            debug!(operation = name, "Classification already in flight");
            return;
        }
        if self.registry.contains(name).await {
            self.state.finish(name).await;
            return;
        }

        let descriptor = descriptor.unwrap_or_else(|| OperationDescriptor::bare(operation.clone()));
        let registry = Arc::clone(&self.registry);
        let oracle = Arc::clone(&self.oracle);
        let state = Arc::clone(&self.state);
        let timeout = self.classify_timeout;

        info!(operation = name, "Learning response schema");
        tokio::spawn(async move {
            let schema = classify_or_fallback(oracle.as_ref(), &descriptor, &sample, timeout).await;
            let operation = descriptor.name.as_str();
            registry
                .upsert(operation, RegistryEntry::classified(schema))
                .await;
            state.finish(operation).await;
        });
    }
}

/// Parses the first text content of `result` as a JSON object.
fn json_payload(result: &CallToolResult) -> Option<Value> {
    let text = result.content.first()?.as_text()?;
    match serde_json::from_str(&text.text) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}
