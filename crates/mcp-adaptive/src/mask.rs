//! Response masking.
//!
//! Given a raw response object and a classified [`RegistryEntry`], the engine
//! builds a new object holding only the *keep set*: pinned paths, the most
//! requested ghosts ("floating" fields) and whatever the caller asked for.
//! Ghosts left out are advertised under `_ghosts` together with a hint on how
//! to fetch them.
//!
//! Masking is idempotent: a masked response fed back through the same entry
//! yields itself, because previously advertised ghosts are read back from the
//! input's `_ghosts` list.

use crate::path::FieldPath;
use crate::schema::RegistryEntry;
use mcp_gateway_core::DEFAULT_MAX_FLOATING_FIELDS;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Key listing hidden, retrievable paths in a masked response.
pub const GHOSTS_KEY: &str = "_ghosts";

/// Key carrying the retrieval hint in a masked response.
pub const TIP_KEY: &str = "_tip";

const RELATIONS_KEY: &str = "relations";
const RELATION_KEYS: [&str; 2] = ["rel", "url"];
const ATTRIBUTES_KEY: &str = "attributes";
const NAME_KEY: &str = "name";

/// Retrieval hint attached next to `_ghosts`.
#[must_use]
pub fn ghost_tip(operation: &str) -> String {
    format!("To retrieve hidden fields, call {operation} with 'include=['field_name']'")
}

/// Applies learned schemas to raw responses.
#[derive(Debug, Clone, Copy)]
pub struct MaskingEngine {
    max_floating: usize,
}

impl Default for MaskingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FLOATING_FIELDS)
    }
}

impl MaskingEngine {
    /// Creates an engine promoting at most `max_floating` ghosts.
    #[must_use]
    pub const fn new(max_floating: usize) -> Self {
        Self { max_floating }
    }

    /// Maximum number of floating fields.
    #[must_use]
    pub const fn max_floating(&self) -> usize {
        self.max_floating
    }

    /// Ordered, de-duplicated keep set: pinned, floating, then `extra`.
    #[must_use]
    pub fn keep_set(&self, entry: &RegistryEntry, extra: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        entry
            .schema
            .pinned
            .iter()
            .map(String::as_str)
            .chain(entry.floating(self.max_floating))
            .chain(extra.iter().map(String::as_str))
            .filter(|path| seen.insert(*path))
            .map(String::from)
            .collect()
    }

    /// Masks `raw` according to `entry`.
    ///
    /// `extra` holds caller-requested paths (already normalized); `operation`
    /// is the namespaced name quoted in the retrieval hint. Paths absent from
    /// `raw` are skipped silently.
    #[must_use]
    pub fn apply(
        &self,
        raw: &Value,
        entry: &RegistryEntry,
        extra: &[String],
        operation: &str,
    ) -> Value {
        let keep = self.keep_set(entry, extra);

        let mut output = Value::Object(Map::new());
        for path in &keep {
            FieldPath::parse(path).copy(raw, &mut output);
        }

        prune_relations(&mut output);

        let hidden = available_ghosts(raw, entry, &keep);
        if !hidden.is_empty()
            && let Value::Object(map) = &mut output
        {
            map.insert(GHOSTS_KEY.to_string(), Value::Array(hidden));
            map.insert(TIP_KEY.to_string(), Value::String(ghost_tip(operation)));
        }

        output
    }
}

/// Ghosts outside the keep set that the caller could still fetch.
///
/// A ghost counts as available if it resolves in `raw` or if `raw` already
/// advertises it (the input was masked before).
fn available_ghosts(raw: &Value, entry: &RegistryEntry, keep: &[String]) -> Vec<Value> {
    let advertised: HashSet<&str> = raw
        .get(GHOSTS_KEY)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let kept: HashSet<&str> = keep.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();

    entry
        .schema
        .ghosts
        .iter()
        .map(String::as_str)
        .filter(|ghost| !kept.contains(ghost) && seen.insert(*ghost))
        .filter(|ghost| advertised.contains(ghost) || FieldPath::parse(ghost).get(raw).is_some())
        .map(|ghost| Value::String(ghost.to_string()))
        .collect()
}

/// Reduces each kept relation to `rel`, `url` and `attributes.name`.
fn prune_relations(output: &mut Value) {
    let Some(Value::Array(relations)) = output.get_mut(RELATIONS_KEY) else {
        return;
    };
    for relation in relations.iter_mut() {
        *relation = prune_relation(relation);
    }
}

fn prune_relation(relation: &Value) -> Value {
    let mut pruned = Map::new();
    for key in RELATION_KEYS {
        if let Some(value) = relation.get(key) {
            pruned.insert(key.to_string(), value.clone());
        }
    }
    if let Some(attributes) = relation.get(ATTRIBUTES_KEY).filter(|a| !a.is_null()) {
        let mut kept = Map::new();
        if let Some(name) = attributes.get(NAME_KEY) {
            kept.insert(NAME_KEY.to_string(), name.clone());
        }
        pruned.insert(ATTRIBUTES_KEY.to_string(), Value::Object(kept));
    }
    Value::Object(pruned)
}
