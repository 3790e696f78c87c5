//! Catalog decoration for classified operations.
//!
//! Once an operation has a learned schema its responses are masked, so the
//! advertised tool tells callers about `_ghosts` and gains an `include`
//! parameter to reveal them.

use crate::types::{FIELDS_ARG, INCLUDE_ARG};
use rmcp::model::{JsonObject, Tool};
use serde_json::{Value, json};
use std::borrow::Cow;
use std::sync::Arc;

const OPTIMIZED_PREFIX: &str = "[Optimized]";
const FIELDS_NOTE: &str = " (Merged into 'include')";

/// Rewrites a listed tool for an operation whose responses are masked.
#[must_use]
pub fn decorate_classified(mut tool: Tool) -> Tool {
    let description = tool.description.as_deref().unwrap_or_default();
    tool.description = Some(Cow::Owned(format!(
        "{OPTIMIZED_PREFIX} {description}. Hidden fields listed in '_ghosts' can be fetched via 'include'."
    )));

    let mut schema: JsonObject = (*tool.input_schema).clone();
    if !schema.get("properties").is_some_and(Value::is_object) {
        schema.insert("properties".to_string(), Value::Object(JsonObject::new()));
    }
    if let Some(Value::Object(properties)) = schema.get_mut("properties") {
        if let Some(Value::Object(fields)) = properties.get_mut(FIELDS_ARG) {
            let existing = fields
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let merged = format!("{existing}{FIELDS_NOTE}");
            fields.insert("description".to_string(), Value::String(merged));
        }
        properties.insert(
            INCLUDE_ARG.to_string(),
            json!({
                "type": "array",
                "items": {"type": "string"},
                "description": "Optional: List of ghost fields to retrieve."
            }),
        );
    }
    tool.input_schema = Arc::new(schema);
    tool
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(schema: Value) -> Tool {
        Tool::new(
            "ado_get_item",
            "[Source: ado] Get a work item",
            Arc::new(schema.as_object().cloned().unwrap()),
        )
    }

    #[test]
    fn test_description_is_annotated() {
        let decorated = decorate_classified(tool(json!({"type": "object"})));
        assert_eq!(
            decorated.description.as_deref(),
            Some(
                "[Optimized] [Source: ado] Get a work item. Hidden fields listed in '_ghosts' can be fetched via 'include'."
            )
        );
    }

    #[test]
    fn test_include_property_is_added() {
        let decorated = decorate_classified(tool(json!({
            "type": "object",
            "properties": {"id": {"type": "integer"}},
            "required": ["id"]
        })));
        let props = decorated.input_schema["properties"].as_object().unwrap();
        assert_eq!(props["include"]["type"], "array");
        assert_eq!(props["include"]["items"]["type"], "string");
        assert!(props.contains_key("id"));
        assert_eq!(decorated.input_schema["required"], json!(["id"]));
    }

    #[test]
    fn test_fields_description_is_merged() {
        let decorated = decorate_classified(tool(json!({
            "type": "object",
            "properties": {"fields": {"type": "array", "description": "Fields to return"}}
        })));
        assert_eq!(
            decorated.input_schema["properties"]["fields"]["description"],
            "Fields to return (Merged into 'include')"
        );
    }

    #[test]
    fn test_schema_without_properties() {
        let decorated = decorate_classified(tool(json!({})));
        assert!(decorated.input_schema["properties"]["include"].is_object());
    }
}
