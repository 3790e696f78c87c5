//! Per-process learning state.
//!
//! Two pieces of shared state live here:
//!
//! - the single-flight set: operation names with a classification in flight;
//! - the descriptor cache: the most recent listing of each operation, used
//!   for env auto-injection and as oracle input.

use mcp_gateway_core::OperationDescriptor;
use mcp_gateway_hub::descriptor_from_tool;
use rmcp::model::Tool;
use std::collections::{HashMap, HashSet};
use tokio::sync::{Mutex, RwLock};

/// Learning locks and listed descriptors.
#[derive(Debug, Default)]
pub struct LearningState {
    in_flight: Mutex<HashSet<String>>,
    descriptors: RwLock<HashMap<String, OperationDescriptor>>,
}

impl LearningState {
    /// Creates empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the learning lock for `operation`.
    ///
    /// Returns `false` if a classification is already in flight.
    pub async fn try_begin(&self, operation: &str) -> bool {
        self.in_flight.lock().await.insert(operation.to_string())
    }

    /// Releases the learning lock for `operation`.
    pub async fn finish(&self, operation: &str) {
        self.in_flight.lock().await.remove(operation);
    }

    /// Returns `true` while `operation` is being classified.
    pub async fn is_learning(&self, operation: &str) -> bool {
        self.in_flight.lock().await.contains(operation)
    }

    /// Number of classifications in flight.
    pub async fn in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    /// Caches descriptors for listed tools; the latest listing wins.
    pub async fn cache_tools(&self, tools: &[Tool]) {
        let mut descriptors = self.descriptors.write().await;
        for tool in tools {
            descriptors.insert(tool.name.to_string(), descriptor_from_tool(tool));
        }
    }

    /// Cached descriptor for `operation`, if it was listed.
    pub async fn descriptor(&self, operation: &str) -> Option<OperationDescriptor> {
        self.descriptors.read().await.get(operation).cloned()
    }
}
