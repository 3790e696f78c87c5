//! Strong domain types for the MCP gateway.
//!
//! Operations exposed by the gateway live in one flat namespace built as
//! `<namespace>_<localName>`. Routing splits on the *first* separator, so a
//! namespace must never contain the separator while a local name may.
//!
//! # Examples
//!
//! ```
//! use mcp_gateway_core::{Namespace, OperationName};
//!
//! let ns = Namespace::new("ado");
//! let op = OperationName::namespaced(&ns, "get_work_item");
//! assert_eq!(op.as_str(), "ado_get_work_item");
//!
//! let (namespace, local) = op.split().unwrap();
//! assert_eq!(namespace.as_str(), "ado");
//! assert_eq!(local, "get_work_item");
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between namespace and local operation name.
pub const NAMESPACE_SEPARATOR: char = '_';

/// Backend namespace (newtype over String).
///
/// Identifies which backend tool server an operation belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Namespace(String);

impl Namespace {
    /// Creates a namespace without validating it.
    ///
    /// Use [`Namespace::parse`] for values coming from configuration.
    #[inline]
    #[must_use]
    pub fn new(ns: impl Into<String>) -> Self {
        Self(ns.into())
    }

    /// Creates a namespace, rejecting values that would break routing.
    ///
    /// # Errors
    ///
    /// Returns `Error::ValidationError` if the namespace is empty or
    /// contains [`NAMESPACE_SEPARATOR`].
    ///
    /// # Examples
    ///
    /// ```
    /// use mcp_gateway_core::Namespace;
    ///
    /// assert!(Namespace::parse("ado").is_ok());
    /// assert!(Namespace::parse("my_server").is_err());
    /// assert!(Namespace::parse("").is_err());
    /// ```
    pub fn parse(ns: impl Into<String>) -> Result<Self> {
        let ns = ns.into();
        if ns.trim().is_empty() {
            return Err(Error::ValidationError {
                field: "namespace".to_string(),
                reason: "namespace cannot be empty".to_string(),
            });
        }
        if ns.contains(NAMESPACE_SEPARATOR) {
            return Err(Error::ValidationError {
                field: "namespace".to_string(),
                reason: format!(
                    "namespace '{ns}' must not contain the separator '{NAMESPACE_SEPARATOR}'"
                ),
            });
        }
        Ok(Self(ns))
    }

    /// Returns the namespace as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Namespace {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Namespaced operation name as advertised to callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationName(String);

impl OperationName {
    /// Wraps an already namespaced name.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Builds `<namespace>_<local>`.
    #[must_use]
    pub fn namespaced(namespace: &Namespace, local: &str) -> Self {
        Self(format!("{namespace}{NAMESPACE_SEPARATOR}{local}"))
    }

    /// Returns the name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits on the first separator into namespace and local name.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidOperationName` if the name has no separator,
    /// or either side of it is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use mcp_gateway_core::OperationName;
    ///
    /// let op = OperationName::new("gh_list_pull_requests");
    /// let (ns, local) = op.split().unwrap();
    /// assert_eq!(ns.as_str(), "gh");
    /// assert_eq!(local, "list_pull_requests");
    ///
    /// assert!(OperationName::new("plain").split().is_err());
    /// ```
    pub fn split(&self) -> Result<(Namespace, &str)> {
        match self.0.split_once(NAMESPACE_SEPARATOR) {
            Some((ns, local)) if !ns.is_empty() && !local.is_empty() => {
                Ok((Namespace::new(ns), local))
            }
            _ => Err(Error::InvalidOperationName {
                name: self.0.clone(),
            }),
        }
    }

    /// Returns the namespace prefix, if the name has one.
    #[must_use]
    pub fn namespace(&self) -> Option<Namespace> {
        self.split().ok().map(|(ns, _)| ns)
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OperationName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OperationName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identity of a discovered operation, as handed to the classification oracle.
///
/// Produced from the merged catalog; `parameters` lists the declared input
/// property names, which also drive env auto-injection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Namespaced operation name.
    pub name: OperationName,
    /// Human description (already prefixed with the source namespace).
    pub description: String,
    /// Declared input parameter names.
    pub parameters: Vec<String>,
}

impl OperationDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(name: OperationName, description: impl Into<String>, parameters: Vec<String>) -> Self {
        Self {
            name,
            description: description.into(),
            parameters,
        }
    }

    /// Descriptor for an operation that was never listed: name only.
    #[must_use]
    pub fn bare(name: OperationName) -> Self {
        Self {
            name,
            description: String::new(),
            parameters: Vec::new(),
        }
    }

    /// Returns `true` if the operation declares an input named `param`.
    #[must_use]
    pub fn declares(&self, param: &str) -> bool {
        self.parameters.iter().any(|p| p == param)
    }
}
