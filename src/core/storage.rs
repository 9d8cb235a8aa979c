//! Local key/value storage (`storage.json` next to the config)

use crate::warn;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Key of the dark-mode flag
pub const DARK_MODE_KEY: &str = "dark-mode";

/// Keys that may hold the viewer's student number, in lookup order
pub const STUDENT_NUMBER_KEYS: [&str; 3] = ["studentNumber", "student_number", "userStudentNumber"];

/// String map persisted as one JSON object, or kept in memory only
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    path: Option<PathBuf>,
    entries: Map<String, Value>,
}

impl LocalStorage {
    /// Storage that is never written to disk
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open `path`; a missing or unreadable file starts empty
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("ignoring unreadable {}: {e}", path.display());
                Map::new()
            }),
            Err(_) => Map::new(),
        };
        Self {
            path: Some(path),
            entries,
        }
    }

    /// Value of `key` as a string
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match self.entries.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Set `key` and persist
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .insert(key.to_string(), Value::String(value.into()));
        self.persist();
    }

    /// Remove `key` and persist
    pub fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.persist();
        }
    }

    /// Stored dark-mode preference
    #[must_use]
    pub fn dark_mode(&self) -> bool {
        self.get(DARK_MODE_KEY).is_some_and(|v| v == "true")
    }

    /// Store the dark-mode preference
    pub fn set_dark_mode(&mut self, on: bool) {
        self.set(DARK_MODE_KEY, on.to_string());
    }

    /// First non-blank student number under [`STUDENT_NUMBER_KEYS`]
    #[must_use]
    pub fn student_number(&self) -> Option<String> {
        STUDENT_NUMBER_KEYS
            .iter()
            .filter_map(|key| self.get(key))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let result = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
        if let Err(e) = result {
            warn!("failed to save {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_number_follows_key_order() {
        let mut storage = LocalStorage::in_memory();
        storage.set("userStudentNumber", "333");
        assert_eq!(storage.student_number().as_deref(), Some("333"));
        storage.set("student_number", "222");
        assert_eq!(storage.student_number().as_deref(), Some("222"));
        storage.set("studentNumber", "  ");
        assert_eq!(storage.student_number().as_deref(), Some("222"));
        storage.set("studentNumber", "111");
        assert_eq!(storage.student_number().as_deref(), Some("111"));
    }

    #[test]
    fn persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let mut storage = LocalStorage::open(&path);
        assert!(!storage.dark_mode());
        storage.set_dark_mode(true);

        let reopened = LocalStorage::open(&path);
        assert!(reopened.dark_mode());
    }
}
