use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::warn;

/// Key-value store for container open/closed state
pub trait OpenStateStore {
    fn has(&self, key: &str) -> bool;
    fn get(&self, key: &str) -> Option<bool>;
    fn set(&mut self, key: &str, open: bool);
}

/// In-memory store, mostly for tests and one-shot CLI commands
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    pub open: BTreeMap<String, bool>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OpenStateStore for MemoryStateStore {
    fn has(&self, key: &str) -> bool {
        self.open.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<bool> {
        self.open.get(key).copied()
    }

    fn set(&mut self, key: &str, open: bool) {
        self.open.insert(key.to_string(), open);
    }
}

/// Persisted session state (written to .state.json)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiState {
    /// Open/closed state per container key
    #[serde(default)]
    pub open: BTreeMap<String, bool>,
    /// Filter text at the end of the last session
    #[serde(default)]
    pub last_filter: Option<String>,
    /// Key of the selected node
    #[serde(default)]
    pub selected: Option<String>,
}

/// Read the state file. A missing file is an empty state; a corrupt one is
/// logged and treated as empty.
pub fn read_ui_state(path: &Path) -> UiState {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return UiState::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read state file, starting empty");
            return UiState::default();
        }
    };
    match serde_json::from_str(&content) {
        Ok(state) => state,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "corrupt state file, starting empty");
            UiState::default()
        }
    }
}

/// Write the state file atomically
pub fn write_ui_state(path: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let content = serde_json::to_string_pretty(state)?;
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// [`OpenStateStore`] backed by the state file
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
    pub state: UiState,
}

impl JsonStateStore {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = read_ui_state(&path);
        JsonStateStore { path, state }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<(), std::io::Error> {
        write_ui_state(&self.path, &self.state)
    }
}

impl OpenStateStore for JsonStateStore {
    fn has(&self, key: &str) -> bool {
        self.state.open.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<bool> {
        self.state.open.get(key).copied()
    }

    fn set(&mut self, key: &str, open: bool) {
        self.state.open.insert(key.to_string(), open);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_and_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".state.json");
        let mut store = JsonStateStore::load(&path);
        store.set("editor", true);
        store.set("fonts", false);
        store.state.last_filter = Some("font".into());
        store.state.selected = Some("font-size".into());
        store.save().unwrap();

        let loaded = JsonStateStore::load(&path);
        assert_eq!(loaded.get("editor"), Some(true));
        assert_eq!(loaded.get("fonts"), Some(false));
        assert!(loaded.has("fonts"));
        assert!(!loaded.has("keys"));
        assert_eq!(loaded.state.last_filter.as_deref(), Some("font"));
        assert_eq!(loaded.state.selected.as_deref(), Some("font-size"));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let state = read_ui_state(&dir.path().join(".state.json"));
        assert!(state.open.is_empty());
        assert!(state.last_filter.is_none());
    }

    #[test]
    fn corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".state.json");
        fs::write(&path, "not json {{{").unwrap();
        let store = JsonStateStore::load(&path);
        assert!(store.state.open.is_empty());
        assert_eq!(store.get("editor"), None);
    }

    #[test]
    fn serde_defaults_on_empty_object() {
        let state: UiState = serde_json::from_str("{}").unwrap();
        assert!(state.open.is_empty());
        assert!(state.selected.is_none());
    }

    #[test]
    fn memory_store() {
        let mut store = MemoryStateStore::new();
        assert!(!store.has("a"));
        store.set("a", true);
        assert_eq!(store.get("a"), Some(true));
    }
}
