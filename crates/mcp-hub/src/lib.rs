//! Namespace hub: one flat operation catalog over many MCP backends.
//!
//! Each backend tool server is registered under a namespace. Listing merges
//! every backend's catalog, renaming `<local>` to `<namespace>_<local>`;
//! invocation splits the name on the first separator and forwards the call
//! to the owning backend.
//!
//! # Examples
//!
//! ```no_run
//! use mcp_gateway_core::{Namespace, OperationName, ServerConfig};
//! use mcp_gateway_hub::Hub;
//!
//! # async fn example() -> Result<(), mcp_gateway_core::Error> {
//! let config = ServerConfig::builder()
//!     .command("npx".to_string())
//!     .args(vec!["-y".to_string(), "@azure-devops/mcp".to_string()])
//!     .env("project".to_string(), "Contoso".to_string())
//!     .try_build()?;
//!
//! let mut hub = Hub::new();
//! hub.register(Namespace::parse("ado")?, &config).await?;
//!
//! for tool in hub.list_all().await {
//!     println!("{}", tool.name);
//! }
//!
//! let response = hub.invoke(&OperationName::new("ado_get_work_item"), None).await?;
//! println!("{:?}", response.result);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod backend;
pub mod hub;
pub mod naming;

pub use backend::{BackendConnection, StdioBackend};
pub use hub::{Hub, HubResponse};
pub use naming::{descriptor_from_tool, input_properties, namespaced_name, split_operation_name};
