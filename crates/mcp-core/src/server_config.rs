//! Backend MCP server launch configuration.
//!
//! Every backend is a child process speaking MCP over stdio. This module holds
//! the command, arguments, environment overrides and working directory used
//! to spawn it, plus validation run before anything is spawned.
//!
//! # Security
//!
//! Validation enforces:
//! - A non-empty command without shell metacharacters
//!   (`;`, `|`, `&`, `>`, `<`, `` ` ``, `$`, `(`, `)`, `\n`, `\r`)
//! - No loader/path hijacking env vars: `LD_PRELOAD`, `LD_LIBRARY_PATH`,
//!   `DYLD_*`, `PATH`
//!
//! # Examples
//!
//! ```
//! use mcp_gateway_core::{ServerConfig, validate_server_config};
//!
//! let config = ServerConfig::builder()
//!     .command("npx".to_string())
//!     .arg("-y".to_string())
//!     .arg("@azure-devops/mcp".to_string())
//!     .env("project".to_string(), "Contoso".to_string())
//!     .try_build()
//!     .unwrap();
//!
//! assert!(validate_server_config(&config).is_ok());
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Shell metacharacters that indicate potential command injection.
const FORBIDDEN_CHARS: &[char] = &[';', '|', '&', '>', '<', '`', '$', '(', ')', '\n', '\r'];

/// Environment variables a backend may not override.
const FORBIDDEN_ENV: &[&str] = &["LD_PRELOAD", "LD_LIBRARY_PATH", "PATH"];

/// Launch configuration for one backend MCP server.
///
/// The `env` map doubles as the backend's *environment defaults*: values
/// the gateway auto-injects into invocation arguments whose names match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Command to execute (binary name resolved via PATH, or absolute path).
    pub command: String,

    /// Arguments passed to the command, each as a separate argv entry.
    #[serde(default)]
    pub args: Vec<String>,

    /// Environment variables added to (or overriding) the parent environment.
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Working directory for the subprocess; inherits the gateway's when unset.
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

impl ServerConfig {
    /// Creates a new builder for `ServerConfig`.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the command as a string slice.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns a slice of arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns a reference to the environment variables map.
    #[must_use]
    pub const fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Returns the working directory, if set.
    #[must_use]
    pub const fn cwd(&self) -> Option<&PathBuf> {
        self.cwd.as_ref()
    }
}

/// Builder for constructing `ServerConfig` instances.
#[derive(Debug, Default, Clone)]
pub struct ServerConfigBuilder {
    command: Option<String>,
    args: Vec<String>,
    env: HashMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ServerConfigBuilder {
    /// Sets the command to execute.
    #[must_use]
    pub fn command(mut self, command: String) -> Self {
        self.command = Some(command);
        self
    }

    /// Adds a single argument.
    #[must_use]
    pub fn arg(mut self, arg: String) -> Self {
        self.args.push(arg);
        self
    }

    /// Sets all arguments at once, replacing any previously added.
    #[must_use]
    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Adds a single environment variable.
    #[must_use]
    pub fn env(mut self, key: String, value: String) -> Self {
        self.env.insert(key, value);
        self
    }

    /// Sets all environment variables at once, replacing any previously added.
    #[must_use]
    pub fn environment(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Sets the working directory for the subprocess.
    #[must_use]
    pub fn cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = Some(cwd);
        self
    }

    /// Builds the `ServerConfig`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the command is missing or blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use mcp_gateway_core::ServerConfig;
    ///
    /// assert!(ServerConfig::builder().command("docker".to_string()).try_build().is_ok());
    /// assert!(ServerConfig::builder().try_build().is_err());
    /// ```
    pub fn try_build(self) -> Result<ServerConfig> {
        let command = self.command.ok_or_else(|| Error::ConfigError {
            message: "command is required".to_string(),
        })?;

        if command.trim().is_empty() {
            return Err(Error::ConfigError {
                message: "command cannot be empty".to_string(),
            });
        }

        Ok(ServerConfig {
            command,
            args: self.args,
            env: self.env,
            cwd: self.cwd,
        })
    }
}

/// Validates a backend configuration before it is spawned.
///
/// # Errors
///
/// Returns `Error::ValidationError` if the command is blank or contains a
/// shell metacharacter, or if an env override targets a forbidden variable.
pub fn validate_server_config(config: &ServerConfig) -> Result<()> {
    let command = config.command.trim();
    if command.is_empty() {
        return Err(Error::ValidationError {
            field: "command".to_string(),
            reason: "command cannot be empty".to_string(),
        });
    }

    if let Some(forbidden) = FORBIDDEN_CHARS.iter().find(|c| command.contains(**c)) {
        return Err(Error::ValidationError {
            field: "command".to_string(),
            reason: format!("command contains forbidden shell metacharacter: '{forbidden}'"),
        });
    }

    for key in config.env.keys() {
        let upper = key.to_ascii_uppercase();
        if FORBIDDEN_ENV.contains(&upper.as_str()) || upper.starts_with("DYLD_") {
            return Err(Error::ValidationError {
                field: format!("env.{key}"),
                reason: "overriding this variable is not allowed".to_string(),
            });
        }
    }

    Ok(())
}
