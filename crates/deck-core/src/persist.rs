//! Snapshot persistence.
//!
//! The whole store is serialized as one JSON document into a single
//! key-value slot. Every save fully replaces the slot. Loading decodes each
//! collection independently so one malformed collection does not discard
//! the others.
//!
//! Failures never reach the store: `PersistenceAdapter` logs them and
//! reports "no data" (load) or "not written" (save).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{DeckError, Result};
use crate::model::{Issue, Label, PRODUCT_NAME, Project, Snapshot, Team, User, Workspace};

/// Slot key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "issuedeck-store";

/// Prior product names that may still sit in persisted workspace settings.
pub const LEGACY_WORKSPACE_NAMES: &[&str] = &["Ferrero Rocher Inc", "Ferrero Rocher", "Rocher HQ"];

// ============================================================================
// Slot storage
// ============================================================================

/// Durable key-value slots.
pub trait SlotStorage {
    /// Read a slot. `Ok(None)` when the slot does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace a slot's contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a slot. Removing a missing slot is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be modified.
    fn remove(&self, key: &str) -> Result<()>;
}

/// One JSON file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileSlots {
    dir: PathBuf,
}

impl FileSlots {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    #[must_use]
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn checked_path(&self, key: &str) -> Result<PathBuf> {
        validate_storage_key(key)?;
        Ok(self.slot_path(key))
    }
}

/// A storage key must name a file directly inside the data directory.
///
/// # Errors
///
/// Returns `DeckError::InvalidStorageKey` for empty keys, path separators,
/// and `.`/`..` components.
pub fn validate_storage_key(key: &str) -> Result<()> {
    let reason = if key.trim().is_empty() {
        "must not be empty"
    } else if key.contains(['/', '\\']) {
        "must not contain path separators"
    } else if key == "." || key == ".." {
        "must not be a relative path component"
    } else {
        return Ok(());
    };
    Err(DeckError::InvalidStorageKey {
        key: key.to_string(),
        reason,
    })
}

impl SlotStorage for FileSlots {
    fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.checked_path(key)?) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DeckError::Io(e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|source| DeckError::StorageDir {
                path: self.dir.clone(),
                source,
            })?;
        }
        let path = self.checked_path(key)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)?;

        // Atomic rename
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.checked_path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DeckError::Io(e)),
        }
    }
}

/// In-memory slots. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemorySlots {
    slots: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl MemorySlots {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail, simulating a full or unavailable store.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Seed a slot directly, bypassing the adapter.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the slot map lock is poisoned.
    pub fn put(&self, key: &str, value: impl Into<String>) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.into());
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.slots
            .lock()
            .map_err(|_| DeckError::Storage("memory slots lock poisoned".to_string()))
    }
}

impl SlotStorage for MemorySlots {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DeckError::Storage("quota exceeded".to_string()));
        }
        self.lock()?.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

// ============================================================================
// Persisted snapshot
// ============================================================================

/// Decoded slot contents. `None` means "absent or malformed, use fallback".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedSnapshot {
    pub issues: Option<Vec<Issue>>,
    pub projects: Option<Vec<Project>>,
    pub users: Option<Vec<User>>,
    pub teams: Option<Vec<Team>>,
    pub labels: Option<Vec<Label>>,
    pub workspace: Option<Workspace>,
}

impl PersistedSnapshot {
    /// Decode a slot document.
    ///
    /// # Errors
    ///
    /// Returns `Json` if the text is not JSON, or `MalformedSnapshot` if the
    /// top level is not an object. Individual collections that fail to
    /// decode are logged and left as `None`.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(map) = value else {
            return Err(DeckError::MalformedSnapshot {
                reason: "top-level value is not an object".to_string(),
            });
        };

        Ok(Self {
            issues: decode_field(&map, "issues"),
            projects: decode_field(&map, "projects"),
            users: decode_field(&map, "users"),
            teams: decode_field(&map, "teams"),
            labels: decode_field(&map, "labels"),
            workspace: decode_field(&map, "workspace"),
        })
    }

    /// Number of collections (plus workspace) that decoded successfully.
    #[must_use]
    pub fn present_count(&self) -> usize {
        [
            self.issues.is_some(),
            self.projects.is_some(),
            self.users.is_some(),
            self.teams.is_some(),
            self.labels.is_some(),
            self.workspace.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    /// Merge over `fallback`, taking each persisted collection when present.
    #[must_use]
    pub fn merge_over(self, fallback: Snapshot) -> Snapshot {
        Snapshot {
            version: fallback.version,
            issues: self.issues.unwrap_or(fallback.issues),
            projects: self.projects.unwrap_or(fallback.projects),
            users: self.users.unwrap_or(fallback.users),
            teams: self.teams.unwrap_or(fallback.teams),
            labels: self.labels.unwrap_or(fallback.labels),
            workspace: self.workspace.unwrap_or(fallback.workspace),
        }
    }
}

impl From<Snapshot> for PersistedSnapshot {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            issues: Some(snapshot.issues),
            projects: Some(snapshot.projects),
            users: Some(snapshot.users),
            teams: Some(snapshot.teams),
            labels: Some(snapshot.labels),
            workspace: Some(snapshot.workspace),
        }
    }
}

fn decode_field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    match map.get(key) {
        None | Some(Value::Null) => {
            tracing::debug!(collection = key, "Persisted snapshot has no value; using seed");
            None
        }
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(collection = key, error = %e, "Malformed persisted collection; using seed");
                None
            }
        },
    }
}

/// Rewrite a workspace name left over from a prior product name.
///
/// Matches exactly or as a case-insensitive substring of any entry in
/// `LEGACY_WORKSPACE_NAMES`. Returns true if the name was rewritten.
pub fn repair_legacy_workspace(workspace: &mut Workspace) -> bool {
    let lowered = workspace.name.to_lowercase();
    let legacy = LEGACY_WORKSPACE_NAMES
        .iter()
        .any(|old| workspace.name == *old || lowered.contains(&old.to_lowercase()));
    if !legacy {
        return false;
    }
    tracing::info!(
        old = %workspace.name,
        new = PRODUCT_NAME,
        "Renaming legacy workspace"
    );
    workspace.name = PRODUCT_NAME.to_string();
    true
}

// ============================================================================
// Adapter
// ============================================================================

/// Reads and writes the store snapshot under one fixed key.
pub struct PersistenceAdapter {
    storage: Box<dyn SlotStorage>,
    key: String,
}

impl std::fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceAdapter")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl PersistenceAdapter {
    pub fn new(storage: impl SlotStorage + 'static, key: impl Into<String>) -> Self {
        Self {
            storage: Box::new(storage),
            key: key.into(),
        }
    }

    /// Adapter over shared in-memory slots with the default key.
    #[must_use]
    pub fn in_memory(slots: MemorySlots) -> Self {
        Self::new(slots, DEFAULT_STORAGE_KEY)
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the persisted snapshot.
    ///
    /// Returns `None` when the slot is absent, unreadable or not a JSON
    /// object. The legacy workspace repair is applied before returning.
    #[must_use]
    pub fn load(&self) -> Option<PersistedSnapshot> {
        let text = match self.storage.read(&self.key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::debug!(key = %self.key, "No persisted snapshot");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read persisted snapshot");
                return None;
            }
        };

        match PersistedSnapshot::from_json(&text) {
            Ok(mut persisted) => {
                if let Some(workspace) = persisted.workspace.as_mut() {
                    repair_legacy_workspace(workspace);
                }
                tracing::debug!(
                    key = %self.key,
                    collections = persisted.present_count(),
                    "Loaded persisted snapshot"
                );
                Some(persisted)
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to parse persisted snapshot");
                None
            }
        }
    }

    /// Serialize and write the full snapshot. Returns true if written.
    pub fn save(&self, snapshot: &Snapshot) -> bool {
        let result = serde_json::to_string(snapshot)
            .map_err(DeckError::from)
            .and_then(|json| self.storage.write(&self.key, &json));
        match result {
            Ok(()) => {
                tracing::debug!(key = %self.key, version = snapshot.version, "Saved snapshot");
                true
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to save snapshot");
                false
            }
        }
    }

    /// Remove the slot. Returns true on success.
    pub fn clear(&self) -> bool {
        match self.storage.remove(&self.key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to clear snapshot");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn test_load_missing_slot() {
        let adapter = PersistenceAdapter::in_memory(MemorySlots::new());
        assert!(adapter.load().is_none());
    }

    #[test]
    fn test_load_unparseable_slot() {
        let slots = MemorySlots::new();
        slots.put(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let adapter = PersistenceAdapter::in_memory(slots);
        assert!(adapter.load().is_none());
    }

    #[test]
    fn test_load_non_object_slot() {
        let slots = MemorySlots::new();
        slots.put(DEFAULT_STORAGE_KEY, "[1, 2, 3]").unwrap();
        let adapter = PersistenceAdapter::in_memory(slots);
        assert!(adapter.load().is_none());
    }

    #[test]
    fn test_roundtrip_is_idempotent() {
        let adapter = PersistenceAdapter::in_memory(MemorySlots::new());
        let original = seed::seed_snapshot();
        assert!(adapter.save(&original));

        let first = adapter.load().unwrap().merge_over(Snapshot::default());
        assert!(adapter.save(&first));
        let second = adapter.load().unwrap().merge_over(Snapshot::default());

        assert_eq!(first, original);
        assert_eq!(second, first);
    }

    #[test]
    fn test_malformed_collection_is_dropped_alone() {
        let seed = seed::seed_snapshot();
        let mut value = serde_json::to_value(&seed).unwrap();
        value["teams"] = serde_json::json!("definitely not a list");
        value
            .as_object_mut()
            .unwrap()
            .remove("labels");

        let persisted = PersistedSnapshot::from_json(&value.to_string()).unwrap();
        assert!(persisted.issues.is_some());
        assert!(persisted.teams.is_none());
        assert!(persisted.labels.is_none());
        assert_eq!(persisted.present_count(), 4);
    }

    #[test]
    fn test_repair_legacy_workspace_names() {
        let mut exact = Workspace {
            name: "Ferrero Rocher Inc".into(),
            url: "rocher.example/ws".into(),
            ..Default::default()
        };
        assert!(repair_legacy_workspace(&mut exact));
        assert_eq!(exact.name, PRODUCT_NAME);
        assert_eq!(exact.url, "rocher.example/ws");

        let mut substring = Workspace {
            name: "the ferrero rocher team".into(),
            ..Default::default()
        };
        assert!(repair_legacy_workspace(&mut substring));

        let mut modern = Workspace {
            name: "Acme Corp".into(),
            ..Default::default()
        };
        assert!(!repair_legacy_workspace(&mut modern));
        assert_eq!(modern.name, "Acme Corp");
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let slots = MemorySlots::new();
        slots.set_fail_writes(true);
        let adapter = PersistenceAdapter::in_memory(slots.clone());
        assert!(!adapter.save(&seed::seed_snapshot()));
        assert_eq!(slots.write_count(), 0);
    }

    #[test]
    fn test_file_slots_roundtrip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let slots = FileSlots::new(dir.path().join("data"));
        let adapter = PersistenceAdapter::new(slots.clone(), "store");

        assert!(adapter.load().is_none());
        assert!(adapter.save(&seed::seed_snapshot()));
        assert!(slots.slot_path("store").exists());
        assert!(!slots.slot_path("store").with_extension("json.tmp").exists());

        let loaded = adapter.load().unwrap();
        assert_eq!(loaded.issues.unwrap().len(), 10);

        assert!(adapter.clear());
        assert!(adapter.load().is_none());
        assert!(adapter.clear());
    }

    #[test]
    fn test_file_slots_reject_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        let slots = FileSlots::new(&data);

        for key in ["../x", "nested/x", "..", ""] {
            assert!(
                matches!(
                    slots.write(key, "{}"),
                    Err(DeckError::InvalidStorageKey { .. })
                ),
                "{key:?}"
            );
        }
        assert!(!dir.path().join("x.json").exists());
        assert!(validate_storage_key("issuedeck-store").is_ok());

        let adapter = PersistenceAdapter::new(slots, "../x");
        assert!(!adapter.save(&seed::seed_snapshot()));
    }

    #[test]
    fn test_storage_dir_error_keeps_io_source() {
        use std::error::Error as _;

        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();
        let slots = FileSlots::new(blocker.join("data"));

        let err = slots.write("store", "{}").unwrap_err();
        assert!(matches!(err, DeckError::StorageDir { .. }));
        assert!(err.source().is_some());
    }
}
