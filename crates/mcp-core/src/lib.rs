//! Core types, errors, and configuration for the MCP gateway.
//!
//! This crate provides the foundational types shared by every other crate in
//! the workspace.
//!
//! # Architecture
//!
//! The core consists of:
//! - Strong domain types (`Namespace`, `OperationName`, `OperationDescriptor`)
//! - Error hierarchy with contextual information
//! - Backend launch configuration (`ServerConfig`)
//! - Gateway configuration file (`GatewayConfig`, `OracleConfig`)

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod error;
mod server_config;
mod types;

pub use config::{
    DEFAULT_FLUSH_INTERVAL_SECS, DEFAULT_MAX_FLOATING_FIELDS, DEFAULT_REGISTRY_FILE,
    GatewayConfig, OracleConfig, default_config_path,
};
pub use error::{Error, Result};
pub use server_config::{ServerConfig, ServerConfigBuilder, validate_server_config};
pub use types::{NAMESPACE_SEPARATOR, Namespace, OperationDescriptor, OperationName};
