//! Adaptive response shaping for the MCP gateway.
//!
//! This crate owns everything the gateway learns about an operation's
//! response shape and how that knowledge is applied:
//!
//! - [`FieldPath`]: dotted path access into JSON documents
//! - [`SchemaClassification`], [`RegistryEntry`], [`FieldStats`]: the learned model
//! - [`RegistryStore`]: the durable, debounced registry of learned schemas
//! - [`MaskingEngine`]: turns a raw backend response into a compact one
//!
//! # Examples
//!
//! ```
//! use mcp_gateway_adaptive::{MaskingEngine, RegistryEntry, SchemaClassification};
//! use serde_json::json;
//!
//! let entry = RegistryEntry::classified(SchemaClassification {
//!     pinned: vec!["id".into(), "fields.System.Title".into()],
//!     noise: vec!["_links".into()],
//!     ghosts: vec!["fields.System.Description".into()],
//! });
//!
//! let raw = json!({
//!     "id": 42,
//!     "_links": {"self": "https://example"},
//!     "fields": {"System.Title": "Fix login", "System.Description": "long text"}
//! });
//!
//! let masked = MaskingEngine::default().apply(&raw, &entry, &[], "ado_get_item");
//! assert_eq!(masked["id"], 42);
//! assert_eq!(masked["fields"]["System.Title"], "Fix login");
//! assert!(masked.get("_links").is_none());
//! assert_eq!(masked["_ghosts"][0], "fields.System.Description");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod mask;
pub mod path;
pub mod persist;
pub mod registry;
pub mod schema;

pub use mask::{GHOSTS_KEY, MaskingEngine, TIP_KEY, ghost_tip};
pub use path::{FIELDS_PREFIX, FieldPath};
pub use persist::spawn_flush_task;
pub use registry::RegistryStore;
pub use schema::{FieldStats, LearningStatus, RegistryEntry, SchemaClassification};
