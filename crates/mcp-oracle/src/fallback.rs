//! Default-safe classification.
//!
//! When the oracle errors, times out or answers with garbage, the operation
//! is still classified: every top-level field is pinned. Masking with such a
//! schema keeps the full top-level shape, so learning never leaves a caller
//! with less than the raw response offered.

use crate::ClassificationOracle;
use mcp_gateway_adaptive::SchemaClassification;
use mcp_gateway_core::OperationDescriptor;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

/// Pins every top-level key of `sample`; noise and ghosts stay empty.
///
/// Non-object samples yield an empty classification.
#[must_use]
pub fn fallback_classification(sample: &Value) -> SchemaClassification {
    sample.as_object().map_or_else(SchemaClassification::default, |map| {
        SchemaClassification::pin_all(map.keys().cloned())
    })
}

/// Asks `oracle` for a classification, bounded by `timeout`.
///
/// Never fails: errors, timeouts and malformed answers all collapse into
/// [`fallback_classification`].
pub async fn classify_or_fallback(
    oracle: &dyn ClassificationOracle,
    descriptor: &OperationDescriptor,
    sample: &Value,
    timeout: Duration,
) -> SchemaClassification {
    match tokio::time::timeout(timeout, oracle.classify(descriptor, sample)).await {
        Ok(Ok(schema)) => {
            info!(
                operation = %descriptor.name,
                pinned = schema.pinned.len(),
                noise = schema.noise.len(),
                ghosts = schema.ghosts.len(),
                "Learned response schema"
            );
            schema
        }
        Ok(Err(e)) => {
            warn!(operation = %descriptor.name, error = %e, "Classification failed, pinning all fields");
            fallback_classification(sample)
        }
        Err(_) => {
            warn!(
                operation = %descriptor.name,
                timeout_secs = timeout.as_secs(),
                "Classification timed out, pinning all fields"
            );
            fallback_classification(sample)
        }
    }
}
