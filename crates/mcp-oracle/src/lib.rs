//! Field classification for the MCP gateway.
//!
//! The gateway learns an operation's response shape once, by asking an
//! oracle to split a sample response into pinned, noise and ghost paths.
//! This crate defines that contract ([`ClassificationOracle`]), an LLM-backed
//! implementation ([`LlmClassifier`]), sample bounding, strict parsing of the
//! oracle's answer, and the pin-everything fallback used whenever the oracle
//! fails.
//!
//! # Examples
//!
//! ```
//! use mcp_gateway_oracle::fallback_classification;
//! use serde_json::json;
//!
//! let schema = fallback_classification(&json!({"id": 1, "fields": {}}));
//! assert_eq!(schema.pinned.len(), 2);
//! assert!(schema.pinned.iter().any(|p| p == "fields"));
//! assert!(schema.noise.is_empty() && schema.ghosts.is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod fallback;
pub mod llm;
pub mod parse;
pub mod sample;

use async_trait::async_trait;
use mcp_gateway_adaptive::SchemaClassification;
use mcp_gateway_core::{OperationDescriptor, Result};
use serde_json::Value;

pub use fallback::{classify_or_fallback, fallback_classification};
pub use llm::LlmClassifier;
pub use parse::{parse_classification, validate_classification};
pub use sample::{render_sample, shrink_sample};

/// Classifies an operation's response paths into tiers.
///
/// Implementations may fail or return unusable content; callers go through
/// [`classify_or_fallback`] so that failures never block learning.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassificationOracle: Send + Sync {
    /// Classifies `sample`, a real response of the operation described by
    /// `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the oracle cannot be reached or its answer is not
    /// a well-formed classification.
    async fn classify(
        &self,
        descriptor: &OperationDescriptor,
        sample: &Value,
    ) -> Result<SchemaClassification>;
}
