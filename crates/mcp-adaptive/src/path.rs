//! Dotted field paths into JSON documents.
//!
//! Paths are dot-separated (`a.b.c`), with numeric segments indexing into
//! arrays. Paths under the `fields.` container are special: everything after
//! the prefix is a single key, because backends such as Azure `DevOps` use
//! dotted names (`System.Title`) as literal keys inside `fields`.
//!
//! # Examples
//!
//! ```
//! use mcp_gateway_adaptive::FieldPath;
//! use serde_json::json;
//!
//! let doc = json!({"fields": {"System.Title": "Fix login"}, "tags": ["a", "b"]});
//!
//! assert_eq!(FieldPath::parse("fields.System.Title").get(&doc), Some(&json!("Fix login")));
//! assert_eq!(FieldPath::parse("tags.1").get(&doc), Some(&json!("b")));
//! assert_eq!(FieldPath::parse("missing.key").get(&doc), None);
//! ```

use serde_json::{Map, Value};
use std::fmt;

/// Prefix marking the opaque-key `fields` container.
pub const FIELDS_PREFIX: &str = "fields.";

const FIELDS_CONTAINER: &str = "fields";

/// A parsed dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses a dotted path.
    ///
    /// `fields.<rest>` always yields exactly two segments.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let segments = path.strip_prefix(FIELDS_PREFIX).map_or_else(
            || path.split('.').map(String::from).collect(),
            |rest| vec![FIELDS_CONTAINER.to_string(), rest.to_string()],
        );
        Self { segments }
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolves the path against `root`.
    ///
    /// An explicit `null` at the end of the path is a present value.
    #[must_use]
    pub fn get<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |node, segment| step(node, segment))
    }

    /// Writes `value` at the path, creating intermediate objects.
    ///
    /// Numeric segments index into arrays already present in `root`, within
    /// bounds only; anywhere else they are plain object keys. Scalars in the
    /// way are replaced. Returns `false` if nothing was written.
    pub fn set(&self, root: &mut Value, value: Value) -> bool {
        let Some((last, parents)) = self.segments.split_last() else {
            return false;
        };

        let mut node = root;
        for segment in parents {
            let Some(child) = slot_mut(node, segment) else {
                return false;
            };
            if !(child.is_object() || child.is_array()) {
                *child = Value::Object(Map::new());
            }
            node = child;
        }
        match slot_mut(node, last) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Copies the value at this path from `source` into `target`.
    ///
    /// Containers created in `target` mirror the kind found in `source` at
    /// the same level, so objects keyed by numbers stay objects and arrays
    /// are never padded past the source's length. Returns `false` if the
    /// path does not resolve in `source`.
    pub fn copy(&self, source: &Value, target: &mut Value) -> bool {
        if self.get(source).is_none() {
            return false;
        }

        let mut src = source;
        let mut dst = target;
        for segment in &self.segments {
            let Some(next) = step(src, segment) else {
                return false;
            };
            dst = mirror_child(dst, src, segment);
            src = next;
        }
        *dst = src.clone();
        true
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn step<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => index_of(segment).and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Child slot of `node`, turning a non-container `node` into an object.
fn slot_mut<'a>(node: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    if node.is_array() {
        let i = index_of(segment)?;
        return node.get_mut(i);
    }
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    // Object indexing inserts `null` for a missing key.
    Some(&mut node[segment])
}

/// Child slot of `dst` for `segment`, shaped like `src`.
///
/// `src` must resolve `segment`; array slots are padded with `null` up to
/// that index, which is bounded by `src`'s length.
fn mirror_child<'a>(dst: &'a mut Value, src: &Value, segment: &str) -> &'a mut Value {
    if let Value::Array(source_items) = src {
        let i = index_of(segment).unwrap_or_default().min(source_items.len());
        if !dst.is_array() {
            *dst = Value::Array(Vec::new());
        }
        if let Value::Array(items) = &mut *dst
            && items.len() <= i
        {
            items.resize(i + 1, Value::Null);
        }
        &mut dst[i]
    } else {
        if !dst.is_object() {
            *dst = Value::Object(Map::new());
        }
        &mut dst[segment]
    }
}

fn index_of(segment: &str) -> Option<usize> {
    if is_index(segment) {
        segment.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plain_path() {
        let path = FieldPath::parse("a.b.c");
        assert_eq!(path.segments(), ["a", "b", "c"]);
    }

    #[test]
    fn test_parse_fields_prefix_keeps_rest_whole() {
        let path = FieldPath::parse("fields.System.Title");
        assert_eq!(path.segments(), ["fields", "System.Title"]);
        assert_eq!(path.to_string(), "fields.System.Title");
    }

    #[test]
    fn test_bare_fields_is_plain() {
        assert_eq!(FieldPath::parse("fields").segments(), ["fields"]);
    }

    #[test]
    fn test_get_nested_and_arrays() {
        let doc = json!({"a": {"b": [{"c": 1}, {"c": 2}]}});
        assert_eq!(FieldPath::parse("a.b.1.c").get(&doc), Some(&json!(2)));
        assert_eq!(FieldPath::parse("a.b.7.c").get(&doc), None);
        assert_eq!(FieldPath::parse("a.b.x").get(&doc), None);
    }

    #[test]
    fn test_get_null_is_present() {
        let doc = json!({"assignee": null});
        assert_eq!(FieldPath::parse("assignee").get(&doc), Some(&Value::Null));
    }

    #[test]
    fn test_get_through_scalar_is_absent() {
        let doc = json!({"id": 5});
        assert_eq!(FieldPath::parse("id.value").get(&doc), None);
    }

    #[test]
    fn test_set_creates_objects() {
        let mut out = json!({});
        FieldPath::parse("fields.System.Title").set(&mut out, json!("T"));
        FieldPath::parse("a.b").set(&mut out, json!(1));
        assert_eq!(out, json!({"fields": {"System.Title": "T"}, "a": {"b": 1}}));
    }

    #[test]
    fn test_set_numeric_segments_are_keys_without_an_array() {
        let mut out = json!({});
        assert!(FieldPath::parse("items.1.name").set(&mut out, json!("second")));
        assert_eq!(out, json!({"items": {"1": {"name": "second"}}}));
    }

    #[test]
    fn test_set_into_existing_array_stays_in_bounds() {
        let mut out = json!({"items": [{"name": "first"}]});
        assert!(FieldPath::parse("items.0.name").set(&mut out, json!("renamed")));
        assert!(!FieldPath::parse("items.4000000000.name").set(&mut out, json!("far")));
        assert_eq!(out, json!({"items": [{"name": "renamed"}]}));
    }

    #[test]
    fn test_copy_keeps_numeric_keyed_objects() {
        let raw = json!({"id": 1, "byId": {"3": {"name": "x"}}});
        let mut out = json!({});
        assert!(FieldPath::parse("id").copy(&raw, &mut out));
        assert!(FieldPath::parse("byId.3").copy(&raw, &mut out));
        assert_eq!(out, json!({"id": 1, "byId": {"3": {"name": "x"}}}));
    }

    #[test]
    fn test_copy_mirrors_arrays() {
        let raw = json!({"relations": [{"rel": "a"}, {"rel": "b", "url": "u"}]});
        let mut out = json!({});
        assert!(FieldPath::parse("relations.1.url").copy(&raw, &mut out));
        assert_eq!(out, json!({"relations": [null, {"url": "u"}]}));
    }

    #[test]
    fn test_copy_missing_path_writes_nothing() {
        let raw = json!({"byId": {"3": {}}});
        let mut out = json!({});
        assert!(!FieldPath::parse("byId.999999999999").copy(&raw, &mut out));
        assert!(!FieldPath::parse("items.0").copy(&raw, &mut out));
        assert_eq!(out, json!({}));
    }

    #[test]
    fn test_set_merges_siblings() {
        let mut out = json!({});
        FieldPath::parse("fields.A").set(&mut out, json!(1));
        FieldPath::parse("fields.B").set(&mut out, json!(2));
        assert_eq!(out, json!({"fields": {"A": 1, "B": 2}}));
    }

    #[test]
    fn test_set_replaces_scalar_in_the_way() {
        let mut out = json!({"a": 3});
        FieldPath::parse("a.b").set(&mut out, json!(true));
        assert_eq!(out, json!({"a": {"b": true}}));
    }

    #[test]
    fn test_get_after_set_round_trip() {
        let mut out = json!({});
        let path = FieldPath::parse("relations.0.attributes.name");
        path.set(&mut out, json!("Parent"));
        assert_eq!(path.get(&out), Some(&json!("Parent")));
    }
}
