//! Gateway configuration file.
//!
//! The gateway reads one static file at startup. TOML is the default format;
//! a `.json` extension switches to JSON so existing `servers.json` files
//! (with an `adapter.openaiApiKey` secret) load unchanged.
//!
//! Configuration is stored by default at:
//! - Linux: `~/.config/mcp-gateway/config.toml`
//! - macOS: `~/Library/Application Support/mcp-gateway/config.toml`
//! - Windows: `%APPDATA%\mcp-gateway\config.toml`
//!
//! # Examples
//!
//! ```toml
//! registry_path = "registry.json"
//! flush_interval_secs = 5
//! max_floating_fields = 5
//!
//! [oracle]
//! api_key = "sk-..."
//! model = "gpt-4.1-mini"
//!
//! [servers.ado]
//! command = "npx"
//! args = ["-y", "@azure-devops/mcp", "contoso"]
//! env = { project = "Fabrikam" }
//! ```

use crate::server_config::validate_server_config;
use crate::{Error, Namespace, Result, ServerConfig};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default number of popular ghost fields promoted into the default view.
pub const DEFAULT_MAX_FLOATING_FIELDS: usize = 5;

/// Default registry flush interval.
pub const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 5;

/// File name used for the registry when the config does not name one.
pub const DEFAULT_REGISTRY_FILE: &str = "registry.json";

/// Top-level gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Backends keyed by namespace.
    #[serde(default)]
    pub servers: BTreeMap<String, ServerConfig>,

    /// Classification oracle settings. Required.
    #[serde(default, alias = "adapter")]
    pub oracle: Option<OracleConfig>,

    /// Where the learned registry is persisted.
    ///
    /// Relative paths are resolved against the config file's directory.
    #[serde(default, alias = "registryPath")]
    pub registry_path: Option<PathBuf>,

    /// Seconds between opportunistic registry flushes.
    #[serde(default = "default_flush_interval_secs", alias = "flushIntervalSecs")]
    pub flush_interval_secs: u64,

    /// How many popular ghost fields are shown by default.
    #[serde(default = "default_max_floating_fields", alias = "maxFloatingFields")]
    pub max_floating_fields: usize,
}

/// Settings for the LLM-backed classification oracle.
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// API key sent as a bearer token. Never logged.
    #[serde(
        alias = "openaiApiKey",
        alias = "apiKey",
        deserialize_with = "deserialize_secret"
    )]
    pub api_key: SecretString,

    /// Chat model used for classification.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_base_url", alias = "baseUrl")]
    pub base_url: String,

    /// Upper bound on one classification call.
    #[serde(default = "default_oracle_timeout_secs", alias = "timeoutSecs")]
    pub timeout_secs: u64,

    /// Cap on the serialized sample sent to the oracle, in characters.
    #[serde(default = "default_max_sample_chars", alias = "maxSampleChars")]
    pub max_sample_chars: usize,
}

impl OracleConfig {
    /// Creates oracle settings with defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_oracle_timeout_secs(),
            max_sample_chars: default_max_sample_chars(),
        }
    }

    /// Classification timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> std::result::Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

const fn default_flush_interval_secs() -> u64 {
    DEFAULT_FLUSH_INTERVAL_SECS
}

const fn default_max_floating_fields() -> usize {
    DEFAULT_MAX_FLOATING_FIELDS
}

fn default_model() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

const fn default_oracle_timeout_secs() -> u64 {
    60
}

const fn default_max_sample_chars() -> usize {
    20_000
}

impl GatewayConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Error::StorageError` if the file cannot be read and
    /// `Error::ConfigError` if it cannot be parsed or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::StorageError {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document without validating it.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` on malformed TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigError {
            message: format!("failed to parse config: {e}"),
        })
    }

    /// Parses a JSON document without validating it.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` on malformed JSON.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::ConfigError {
            message: format!("failed to parse config: {e}"),
        })
    }

    /// Checks everything that must hold before the gateway starts.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the oracle section or its key is
    /// missing, the oracle timeout or flush interval is zero, a namespace is
    /// unroutable, or a server definition fails security validation.
    pub fn validate(&self) -> Result<()> {
        let oracle = self.oracle()?;
        if oracle.api_key.expose_secret().trim().is_empty() {
            return Err(Error::ConfigError {
                message: "'oracle.api_key' is empty".to_string(),
            });
        }

        if oracle.timeout_secs == 0 {
            return Err(Error::ConfigError {
                message: "'oracle.timeout_secs' must be greater than 0".to_string(),
            });
        }

        if self.flush_interval_secs == 0 {
            return Err(Error::ConfigError {
                message: "'flush_interval_secs' must be greater than 0".to_string(),
            });
        }

        for (name, server) in &self.servers {
            Namespace::parse(name.as_str()).map_err(|e| Error::ConfigError {
                message: format!("server '{name}': {e}"),
            })?;
            validate_server_config(server).map_err(|e| Error::ConfigError {
                message: format!("server '{name}': {e}"),
            })?;
        }

        Ok(())
    }

    /// Returns the oracle settings.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the section is absent.
    pub fn oracle(&self) -> Result<&OracleConfig> {
        self.oracle.as_ref().ok_or_else(|| Error::ConfigError {
            message: "'oracle' section (with 'api_key') is missing".to_string(),
        })
    }

    /// Iterates over backends with their parsed namespaces.
    ///
    /// Names were checked by [`GatewayConfig::validate`]; any that fail to
    /// parse here are skipped.
    pub fn namespaces(&self) -> impl Iterator<Item = (Namespace, &ServerConfig)> {
        self.servers
            .iter()
            .filter_map(|(name, cfg)| Namespace::parse(name.as_str()).ok().map(|ns| (ns, cfg)))
    }

    /// Resolves the registry file location relative to the config file.
    #[must_use]
    pub fn registry_path(&self, config_path: &Path) -> PathBuf {
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        match &self.registry_path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => base.join(p),
            None => base.join(DEFAULT_REGISTRY_FILE),
        }
    }

    /// Flush interval as a `Duration`.
    #[must_use]
    pub const fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }
}

/// Returns the platform default configuration path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mcp-gateway").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML_CONFIG: &str = r#"
flush_interval_secs = 10

[oracle]
api_key = "sk-test"

[servers.ado]
command = "npx"
args = ["-y", "@azure-devops/mcp"]
env = { project = "Contoso" }

[servers.gh]
command = "github-mcp-server"
"#;

    #[test]
    fn test_parse_toml() {
        let config = GatewayConfig::from_toml_str(TOML_CONFIG).unwrap();
        config.validate().unwrap();

        assert_eq!(config.servers.len(), 2);
        assert_eq!(config.flush_interval_secs, 10);
        assert_eq!(config.max_floating_fields, DEFAULT_MAX_FLOATING_FIELDS);
        let oracle = config.oracle().unwrap();
        assert_eq!(oracle.api_key.expose_secret(), "sk-test");
        assert_eq!(oracle.model, "gpt-4.1-mini");
        assert_eq!(oracle.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_parse_legacy_json() {
        let json = r#"{
            "adapter": { "openaiApiKey": "sk-legacy" },
            "servers": {
                "ado": { "command": "npx", "args": ["-y", "ado-mcp"], "env": { "project": "P" } }
            }
        }"#;
        let config = GatewayConfig::from_json_str(json).unwrap();
        config.validate().unwrap();
        assert_eq!(
            config.oracle().unwrap().api_key.expose_secret(),
            "sk-legacy"
        );
        let (ns, server) = config.namespaces().next().unwrap();
        assert_eq!(ns.as_str(), "ado");
        assert_eq!(server.env.get("project"), Some(&"P".to_string()));
    }

    #[test]
    fn test_missing_oracle_is_fatal() {
        let config = GatewayConfig::from_toml_str("[servers.ado]\ncommand = \"npx\"\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("oracle"));
    }

    #[test]
    fn test_missing_api_key_is_parse_error() {
        let err = GatewayConfig::from_toml_str("[oracle]\nmodel = \"x\"\n").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let config = GatewayConfig::from_toml_str("[oracle]\napi_key = \"  \"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_oracle_timeout_rejected() {
        let config =
            GatewayConfig::from_toml_str("[oracle]\napi_key = \"sk-test\"\ntimeout_secs = 0\n")
                .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_namespace_with_separator_rejected() {
        let config = GatewayConfig::from_toml_str(
            "[oracle]\napi_key = \"k\"\n[servers.azure_devops]\ncommand = \"npx\"\n",
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("azure_devops"));
    }

    #[test]
    fn test_server_without_command_rejected() {
        let err = GatewayConfig::from_toml_str("[oracle]\napi_key = \"k\"\n[servers.ado]\n")
            .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_registry_path_resolution() {
        let config = GatewayConfig::from_toml_str("[oracle]\napi_key = \"k\"\n").unwrap();
        let cfg_path = Path::new("/etc/gw/config.toml");
        assert_eq!(
            config.registry_path(cfg_path),
            PathBuf::from("/etc/gw/registry.json")
        );

        let config = GatewayConfig::from_toml_str(
            "registry_path = \"state/reg.json\"\n[oracle]\napi_key = \"k\"\n",
        )
        .unwrap();
        assert_eq!(
            config.registry_path(cfg_path),
            PathBuf::from("/etc/gw/state/reg.json")
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, TOML_CONFIG).unwrap();

        let config = GatewayConfig::load(&path).unwrap();
        assert_eq!(config.namespaces().count(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = GatewayConfig::load(Path::new("/nonexistent/mcp-gateway.toml")).unwrap_err();
        assert!(err.is_storage_error());
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let oracle = OracleConfig::new("sk-very-secret");
        assert!(!format!("{oracle:?}").contains("sk-very-secret"));
    }
}
