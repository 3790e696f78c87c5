//! Operation naming helpers.

use mcp_gateway_core::{Namespace, OperationDescriptor, OperationName, Result};
use rmcp::model::Tool;

/// Builds the flat name `<namespace>_<local>`.
#[must_use]
pub fn namespaced_name(namespace: &Namespace, local: &str) -> OperationName {
    OperationName::namespaced(namespace, local)
}

/// Splits a flat name on its first separator.
///
/// # Errors
///
/// Returns `Error::InvalidOperationName` if there is no separator or either
/// side of it is empty.
///
/// # Examples
///
/// ```
/// use mcp_gateway_hub::split_operation_name;
///
/// let (ns, local) = split_operation_name("ado_get_work_item").unwrap();
/// assert_eq!(ns.as_str(), "ado");
/// assert_eq!(local, "get_work_item");
/// ```
pub fn split_operation_name(name: &str) -> Result<(Namespace, String)> {
    let name = OperationName::new(name);
    let (namespace, local) = name.split()?;
    Ok((namespace, local.to_string()))
}

/// Declared input property names of a tool, in schema order.
#[must_use]
pub fn input_properties(tool: &Tool) -> Vec<String> {
    tool.input_schema
        .get("properties")
        .and_then(serde_json::Value::as_object)
        .map(|props| props.keys().cloned().collect())
        .unwrap_or_default()
}

/// Descriptor handed to the classification oracle for a listed tool.
#[must_use]
pub fn descriptor_from_tool(tool: &Tool) -> OperationDescriptor {
    OperationDescriptor::new(
        OperationName::new(tool.name.as_ref()),
        tool.description.as_deref().unwrap_or_default(),
        input_properties(tool),
    )
}
