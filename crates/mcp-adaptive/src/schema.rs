//! Learned response model for one operation.
//!
//! A [`SchemaClassification`] splits response paths into three tiers:
//! `pinned` (always returned), `noise` (never returned) and `ghosts`
//! (hidden, but fetchable on request). [`FieldStats`] counts how often each
//! ghost was explicitly requested; the most requested ones float into the
//! default view.

use crate::path::FIELDS_PREFIX;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Three-tier classification of an operation's response paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaClassification {
    /// Paths always kept.
    #[serde(default)]
    pub pinned: Vec<String>,
    /// Paths always dropped.
    #[serde(default)]
    pub noise: Vec<String>,
    /// Paths hidden by default but advertised and retrievable.
    #[serde(default)]
    pub ghosts: Vec<String>,
}

impl SchemaClassification {
    /// Classification that pins the given paths and nothing else.
    #[must_use]
    pub fn pin_all(paths: impl IntoIterator<Item = String>) -> Self {
        Self {
            pinned: paths.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Returns `true` if `path` is a ghost.
    #[must_use]
    pub fn is_ghost(&self, path: &str) -> bool {
        self.ghosts.iter().any(|g| g == path)
    }

    /// Returns `true` if `path` is pinned.
    #[must_use]
    pub fn is_pinned(&self, path: &str) -> bool {
        self.pinned.iter().any(|p| p == path)
    }

    /// Paths listed in more than one tier, sorted.
    #[must_use]
    pub fn overlapping_paths(&self) -> Vec<String> {
        let mut seen: BTreeMap<&str, u8> = BTreeMap::new();
        for tier in [&self.pinned, &self.noise, &self.ghosts] {
            let mut in_tier: Vec<&str> = tier.iter().map(String::as_str).collect();
            in_tier.sort_unstable();
            in_tier.dedup();
            for path in in_tier {
                *seen.entry(path).or_default() += 1;
            }
        }
        seen.into_iter()
            .filter(|(_, tiers)| *tiers > 1)
            .map(|(path, _)| path.to_string())
            .collect()
    }

    /// Maps a caller-requested field name onto a schema path.
    ///
    /// Callers often send the bare key (`System.Description`) rather than the
    /// full path. A bare name resolves to `fields.<name>` when that path is a
    /// known ghost or pinned field; anything else is used as given.
    ///
    /// # Examples
    ///
    /// ```
    /// use mcp_gateway_adaptive::SchemaClassification;
    ///
    /// let schema = SchemaClassification {
    ///     ghosts: vec!["fields.System.Description".into()],
    ///     ..Default::default()
    /// };
    /// assert_eq!(schema.normalize_requested("System.Description"), "fields.System.Description");
    /// assert_eq!(schema.normalize_requested("id"), "id");
    /// ```
    #[must_use]
    pub fn normalize_requested(&self, requested: &str) -> String {
        if requested.starts_with(FIELDS_PREFIX) {
            return requested.to_string();
        }
        let candidate = format!("{FIELDS_PREFIX}{requested}");
        if self.is_ghost(&candidate) || self.is_pinned(&candidate) {
            candidate
        } else {
            requested.to_string()
        }
    }
}

/// Per-path request counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldStats(BTreeMap<String, u64>);

impl FieldStats {
    /// Increments the counter for `path` and returns the new count.
    pub fn record(&mut self, path: &str) -> u64 {
        let count = self.0.entry(path.to_string()).or_default();
        *count = count.saturating_add(1);
        *count
    }

    /// Current count for `path` (0 if never requested).
    #[must_use]
    pub fn count(&self, path: &str) -> u64 {
        self.0.get(path).copied().unwrap_or_default()
    }

    /// The `k` most requested paths, highest count first.
    ///
    /// Ties keep ascending path order, so the result is deterministic.
    #[must_use]
    pub fn top(&self, k: usize) -> Vec<&str> {
        let mut ranked: Vec<(&str, u64)> = self
            .0
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(path, count)| (path.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(k).map(|(path, _)| path).collect()
    }

    /// Number of tracked paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing has been requested yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(path, count)` in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(path, count)| (path.as_str(), *count))
    }
}

/// Learning state of an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningStatus {
    /// Never classified.
    #[default]
    Unlearned,
    /// A classification is in flight.
    Learning,
    /// A classification is stored and masking applies.
    #[serde(alias = "optimized")]
    Classified,
}

impl LearningStatus {
    /// Returns the lowercase label used in logs and on disk.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unlearned => "unlearned",
            Self::Learning => "learning",
            Self::Classified => "classified",
        }
    }
}

impl std::fmt::Display for LearningStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One registry record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Learning state; only `classified` entries are persisted.
    pub status: LearningStatus,
    /// Learned tiers.
    pub schema: SchemaClassification,
    /// Ghost request counters.
    #[serde(default)]
    pub stats: FieldStats,
}

impl RegistryEntry {
    /// A freshly classified entry with empty stats.
    #[must_use]
    pub fn classified(schema: SchemaClassification) -> Self {
        Self {
            status: LearningStatus::Classified,
            schema,
            stats: FieldStats::default(),
        }
    }

    /// Returns `true` if masking applies to this entry.
    #[must_use]
    pub fn is_classified(&self) -> bool {
        self.status == LearningStatus::Classified
    }

    /// Records requested paths, counting only those that are ghosts.
    ///
    /// Paths must already be normalized. Returns how many counters moved.
    pub fn record_access<S: AsRef<str>>(&mut self, paths: &[S]) -> usize {
        let mut recorded = 0;
        for path in paths {
            let path = path.as_ref();
            if self.schema.is_ghost(path) {
                self.stats.record(path);
                recorded += 1;
            }
        }
        recorded
    }

    /// Ghosts promoted into the default view.
    #[must_use]
    pub fn floating(&self, k: usize) -> Vec<&str> {
        self.stats.top(k)
    }
}
