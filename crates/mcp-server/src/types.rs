//! Invocation argument handling.
//!
//! Callers may add two gateway-level arguments to any call:
//!
//! - `include`: ghost fields to reveal; consumed by the gateway and counted
//!   towards field popularity.
//! - `fields`: a backend-native projection; forwarded upstream unchanged and
//!   also used to reveal fields in the masked output.
//!
//! Everything else is forwarded as is, after env auto-injection.

use mcp_gateway_core::OperationDescriptor;
use rmcp::model::JsonObject;
use serde_json::Value;
use std::collections::HashMap;

/// Name of the gateway-level reveal argument.
pub const INCLUDE_ARG: &str = "include";

/// Name of the backend-native projection argument.
pub const FIELDS_ARG: &str = "fields";

/// Invocation arguments split into gateway and backend parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvocationArgs {
    include: Vec<String>,
    fields: Option<Value>,
    rest: JsonObject,
}

impl InvocationArgs {
    /// Splits raw call arguments.
    ///
    /// A non-array `include` is ignored, as are non-string items in it.
    #[must_use]
    pub fn split(arguments: Option<JsonObject>) -> Self {
        let mut rest = arguments.unwrap_or_default();
        let include = rest
            .remove(INCLUDE_ARG)
            .map(|value| string_items(&value))
            .unwrap_or_default();
        let fields = rest.remove(FIELDS_ARG);
        Self {
            include,
            fields,
            rest,
        }
    }

    /// Field names requested through `include`.
    #[must_use]
    pub fn include(&self) -> &[String] {
        &self.include
    }

    /// Field names from `fields`, when it is an array of strings.
    #[must_use]
    pub fn projected_fields(&self) -> Vec<String> {
        self.fields.as_ref().map(string_items).unwrap_or_default()
    }

    /// Fills declared-but-missing inputs from backend env defaults.
    ///
    /// An argument counts as missing when it is absent, `null` or an empty
    /// string. Returns the injected keys.
    pub fn inject_env(
        &mut self,
        env: &HashMap<String, String>,
        descriptor: &OperationDescriptor,
    ) -> Vec<String> {
        let mut injected = Vec::new();
        for (key, value) in env {
            if descriptor.declares(key) && is_missing(self.rest.get(key)) {
                self.rest.insert(key.clone(), Value::String(value.clone()));
                injected.push(key.clone());
            }
        }
        injected.sort();
        injected
    }

    /// Arguments sent to the backend: the rest plus `fields`, if given.
    #[must_use]
    pub fn upstream(&self) -> JsonObject {
        let mut upstream = self.rest.clone();
        if let Some(fields) = &self.fields {
            upstream.insert(FIELDS_ARG.to_string(), fields.clone());
        }
        upstream
    }
}

fn string_items(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_gateway_core::OperationName;
    use serde_json::json;

    fn args(value: Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    fn descriptor() -> OperationDescriptor {
        OperationDescriptor::new(
            OperationName::new("ado_get_item"),
            "",
            vec!["id".into(), "project".into(), "org".into()],
        )
    }

    fn env() -> HashMap<String, String> {
        HashMap::from([
            ("project".to_string(), "Contoso".to_string()),
            ("org".to_string(), "contoso-org".to_string()),
            ("token".to_string(), "secret".to_string()),
        ])
    }

    #[test]
    fn test_split_separates_gateway_arguments() {
        let split = InvocationArgs::split(args(json!({
            "id": 5,
            "include": ["System.Description", 3],
            "fields": ["System.Title"]
        })));

        assert_eq!(split.include(), ["System.Description"]);
        assert_eq!(split.projected_fields(), vec!["System.Title"]);
        assert_eq!(
            Value::Object(split.upstream()),
            json!({"id": 5, "fields": ["System.Title"]})
        );
    }

    #[test]
    fn test_non_array_include_is_ignored() {
        let split = InvocationArgs::split(args(json!({"include": "System.Tags"})));
        assert!(split.include().is_empty());
        assert!(split.upstream().is_empty());
    }

    #[test]
    fn test_non_array_fields_forwarded_but_not_revealed() {
        let split = InvocationArgs::split(args(json!({"fields": "System.Title,System.State"})));
        assert!(split.projected_fields().is_empty());
        assert_eq!(split.upstream()["fields"], "System.Title,System.State");
    }

    #[test]
    fn test_no_arguments() {
        let split = InvocationArgs::split(None);
        assert_eq!(split, InvocationArgs::default());
    }

    #[test]
    fn test_inject_env_fills_declared_missing_inputs() {
        let mut split = InvocationArgs::split(args(json!({"id": 5, "org": ""})));
        let injected = split.inject_env(&env(), &descriptor());

        assert_eq!(injected, vec!["org", "project"]);
        let upstream = split.upstream();
        assert_eq!(upstream["project"], "Contoso");
        assert_eq!(upstream["org"], "contoso-org");
        assert!(upstream.get("token").is_none());
    }

    #[test]
    fn test_inject_env_keeps_caller_values() {
        let mut split = InvocationArgs::split(args(json!({"project": "Fabrikam", "org": null})));
        let injected = split.inject_env(&env(), &descriptor());

        assert_eq!(injected, vec!["org"]);
        assert_eq!(split.upstream()["project"], "Fabrikam");
    }

    #[test]
    fn test_falsy_non_string_values_are_kept() {
        let descriptor = OperationDescriptor::new(OperationName::new("a_b"), "", vec!["top".into()]);
        let env = HashMap::from([("top".to_string(), "10".to_string())]);
        let mut split = InvocationArgs::split(args(json!({"top": 0})));
        assert!(split.inject_env(&env, &descriptor).is_empty());
        assert_eq!(split.upstream()["top"], 0);
    }
}
