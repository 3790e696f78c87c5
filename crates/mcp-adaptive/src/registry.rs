//! Durable registry of learned schemas.
//!
//! The registry maps operation names to [`RegistryEntry`] records. Reads and
//! writes happen in memory; a dirty flag tracks unsaved changes and
//! [`RegistryStore::flush`] persists them. Writes go to a sibling temp file
//! that is then renamed over the registry, so a crash never leaves a torn
//! file behind.
//!
//! Loading never fails: a missing file is an empty registry, an unreadable
//! or malformed one is logged and treated as empty.

use crate::schema::{LearningStatus, RegistryEntry};
use mcp_gateway_core::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// In-memory registry with debounced persistence.
#[derive(Debug)]
pub struct RegistryStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, RegistryEntry>>,
    dirty: AtomicBool,
}

impl RegistryStore {
    /// Creates an empty registry backed by `path`. Nothing is read.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: RwLock::new(BTreeMap::new()),
            dirty: AtomicBool::new(false),
        }
    }

    /// Loads the registry at `path`.
    ///
    /// Entries whose status is not `classified` are dropped.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path).await {
            Ok(content) => parse_registry(&path, &content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No registry at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                warn!(
                    "Failed to read registry {}: {}; starting empty",
                    path.display(),
                    e
                );
                BTreeMap::new()
            }
        };

        Self {
            path,
            entries: RwLock::new(entries),
            dirty: AtomicBool::new(false),
        }
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a copy of the entry for `operation`.
    pub async fn get(&self, operation: &str) -> Option<RegistryEntry> {
        self.entries.read().await.get(operation).cloned()
    }

    /// Returns `true` if `operation` has an entry.
    pub async fn contains(&self, operation: &str) -> bool {
        self.entries.read().await.contains_key(operation)
    }

    /// Stored status of `operation`; `Unlearned` when absent.
    pub async fn status(&self, operation: &str) -> LearningStatus {
        self.entries
            .read()
            .await
            .get(operation)
            .map_or(LearningStatus::Unlearned, |entry| entry.status)
    }

    /// Inserts or replaces the entry for `operation` and marks the registry dirty.
    pub async fn upsert(&self, operation: impl Into<String>, entry: RegistryEntry) {
        let operation = operation.into();
        debug!("Registry upsert: {} ({})", operation, entry.status);
        self.entries.write().await.insert(operation, entry);
        self.mark_dirty();
    }

    /// Counts requested ghost paths and returns the updated entry.
    ///
    /// Paths must already be normalized. The registry is marked dirty only
    /// when a counter actually moved. Returns `None` if `operation` has no
    /// entry.
    pub async fn record_access<S: AsRef<str>>(
        &self,
        operation: &str,
        paths: &[S],
    ) -> Option<RegistryEntry> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(operation)?;
        if entry.record_access(paths) > 0 {
            self.mark_dirty();
        }
        Some(entry.clone())
    }

    /// Copy of every entry.
    pub async fn snapshot(&self) -> BTreeMap<String, RegistryEntry> {
        self.entries.read().await.clone()
    }

    /// Number of entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if the registry has no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Returns `true` if there are unsaved changes.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Persists the registry if it has unsaved changes.
    ///
    /// Returns `true` if a write happened. On failure the dirty flag is
    /// restored so the next flush retries.
    ///
    /// # Errors
    ///
    /// Returns `Error::StorageError` if the file cannot be written and
    /// `Error::SerializationError` if the entries cannot be encoded.
    pub async fn flush(&self) -> Result<bool> {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(false);
        }
        if let Err(e) = self.write_snapshot().await {
            self.mark_dirty();
            return Err(e);
        }
        Ok(true)
    }

    /// Persists the registry regardless of the dirty flag.
    ///
    /// # Errors
    ///
    /// Same as [`RegistryStore::flush`].
    pub async fn flush_now(&self) -> Result<()> {
        self.dirty.store(false, Ordering::Release);
        if let Err(e) = self.write_snapshot().await {
            self.mark_dirty();
            return Err(e);
        }
        Ok(())
    }

    async fn write_snapshot(&self) -> Result<()> {
        let persisted: BTreeMap<String, RegistryEntry> = self
            .snapshot()
            .await
            .into_iter()
            .filter(|(_, entry)| entry.is_classified())
            .collect();

        let content =
            serde_json::to_string_pretty(&persisted).map_err(|e| Error::SerializationError {
                message: "failed to encode registry".to_string(),
                source: Some(e),
            })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| Error::StorageError {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let tmp = temp_path(&self.path);
        fs::write(&tmp, content)
            .await
            .map_err(|source| Error::StorageError {
                path: tmp.clone(),
                source,
            })?;

        if let Err(source) = fs::rename(&tmp, &self.path).await {
            if let Err(e) = fs::remove_file(&tmp).await {
                debug!("Failed to remove {}: {}", tmp.display(), e);
            }
            return Err(Error::StorageError {
                path: self.path.clone(),
                source,
            });
        }

        debug!(
            "Flushed {} registry entries to {}",
            persisted.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn parse_registry(path: &Path, content: &str) -> BTreeMap<String, RegistryEntry> {
    match serde_json::from_str::<BTreeMap<String, RegistryEntry>>(content) {
        Ok(entries) => {
            let total = entries.len();
            let kept: BTreeMap<_, _> = entries
                .into_iter()
                .filter(|(_, entry)| entry.is_classified())
                .collect();
            if kept.len() < total {
                debug!(
                    "Dropped {} unfinished registry entries",
                    total - kept.len()
                );
            }
            info!(
                "Loaded {} learned schemas from {}",
                kept.len(),
                path.display()
            );
            kept
        }
        Err(e) => {
            warn!(
                "Malformed registry {}: {}; starting empty",
                path.display(),
                e
            );
            BTreeMap::new()
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaClassification;
    use tempfile::TempDir;

    fn entry() -> RegistryEntry {
        RegistryEntry::classified(SchemaClassification {
            pinned: vec!["id".into()],
            noise: vec![],
            ghosts: vec!["fields.System.Tags".into()],
        })
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = RegistryStore::load(dir.path().join("registry.json")).await;
        assert!(store.is_empty().await);
        assert!(!store.is_dirty());
    }

    #[tokio::test]
    async fn test_load_malformed_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = RegistryStore::load(&path).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_load_drops_unfinished_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(
            &path,
            r#"{
                "a_x": {"status": "learning", "schema": {"pinned": [], "noise": [], "ghosts": []}},
                "a_y": {"status": "optimized", "schema": {"pinned": ["id"], "noise": [], "ghosts": []}, "stats": {}}
            }"#,
        )
        .unwrap();

        let store = RegistryStore::load(&path).await;
        assert!(!store.contains("a_x").await);
        assert_eq!(store.status("a_y").await, LearningStatus::Classified);
    }

    #[tokio::test]
    async fn test_flush_only_when_dirty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("registry.json");
        let store = RegistryStore::new(&path);

        assert!(!store.flush().await.unwrap());
        assert!(!path.exists());

        store.upsert("ado_get_item", entry()).await;
        assert!(store.is_dirty());
        assert!(store.flush().await.unwrap());
        assert!(!store.is_dirty());
        assert!(path.exists());
        assert!(!temp_path(&path).exists());

        assert!(!store.flush().await.unwrap());
    }

    #[tokio::test]
    async fn test_record_access_marks_dirty_only_for_ghosts() {
        let dir = TempDir::new().unwrap();
        let store = RegistryStore::new(dir.path().join("registry.json"));
        store.upsert("ado_get_item", entry()).await;
        store.flush().await.unwrap();

        let updated = store.record_access("ado_get_item", &["id"]).await.unwrap();
        assert!(updated.stats.is_empty());
        assert!(!store.is_dirty());

        let updated = store
            .record_access("ado_get_item", &["fields.System.Tags"])
            .await
            .unwrap();
        assert_eq!(updated.stats.count("fields.System.Tags"), 1);
        assert!(store.is_dirty());

        assert!(store.record_access("ado_missing", &["id"]).await.is_none());
    }

    #[tokio::test]
    async fn test_flush_failure_keeps_dirty() {
        let dir = TempDir::new().unwrap();
        // A directory where the registry file should be makes the rename fail.
        let path = dir.path().join("registry.json");
        std::fs::create_dir_all(path.join("occupied")).unwrap();

        let store = RegistryStore::new(&path);
        store.upsert("ado_get_item", entry()).await;
        let err = store.flush().await.unwrap_err();
        assert!(err.is_storage_error());
        assert!(store.is_dirty());
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let tmp = temp_path(Path::new("/var/lib/gw/registry.json"));
        assert_eq!(tmp, PathBuf::from("/var/lib/gw/registry.json.tmp"));
    }
}
