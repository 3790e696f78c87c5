//! Federating MCP gateway.
//!
//! The gateway connects to several MCP servers, publishes their tools under
//! one catalog (`<namespace>_<tool>`), and learns which parts of each tool's
//! JSON response matter.
//!
//! # Architecture
//!
//! - [`Orchestrator`] routes every call through the namespace hub and owns
//!   the learning lifecycle of each operation.
//! - The first JSON response of an operation is handed to the classification
//!   oracle in the background; until it answers, responses pass through raw.
//! - Once classified, responses are masked: pinned fields are kept, noise is
//!   dropped, ghosts are listed under `_ghosts` and revealed on request via
//!   the `include` argument.
//! - [`GatewayService`] exposes all of this over MCP.
//!
//! # Examples
//!
//! ```no_run
//! use mcp_gateway_adaptive::RegistryStore;
//! use mcp_gateway_core::{GatewayConfig, OracleConfig};
//! use mcp_gateway_hub::Hub;
//! use mcp_gateway_oracle::LlmClassifier;
//! use mcp_gateway_server::{GatewayService, Orchestrator};
//! use rmcp::ServiceExt;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GatewayConfig::load(Path::new("config.toml"))?;
//! let hub = Hub::connect_all(&config).await?;
//! let registry = RegistryStore::load("registry.json").await;
//! let oracle = LlmClassifier::new(config.oracle()?.clone())?;
//!
//! let orchestrator = Orchestrator::new(Arc::new(hub), Arc::new(registry), Arc::new(oracle));
//! let service = GatewayService::new(orchestrator).serve(rmcp::transport::stdio()).await?;
//! service.waiting().await?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod orchestrator;
pub mod service;
pub mod state;
pub mod types;

pub use catalog::decorate_classified;
pub use orchestrator::{DEFAULT_CLASSIFY_TIMEOUT, Orchestrator};
pub use service::GatewayService;
pub use state::LearningState;
pub use types::{FIELDS_ARG, INCLUDE_ARG, InvocationArgs};
