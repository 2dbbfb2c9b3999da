//! Key/value persistence port with in-memory and on-disk backends.
//!
//! Every `set` writes one complete replacement value; readers never observe
//! a partially written collection.

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, trace, warn};

/// Storage keys for persisted state.
pub mod keys {
    pub const CART: &str = "cart";
    pub const WISHLIST: &str = "wishlist";
    pub const USERS: &str = "users";
    pub const SESSION: &str = "session";
    pub const THEME: &str = "theme";
    pub const RECENTLY_VIEWED: &str = "recently_viewed";
    pub const ORDERS: &str = "orders";
    pub const DISCOUNT: &str = "discount";
    pub const AUTH_CHALLENGE: &str = "auth_challenge";
}

/// Narrow string key/value store.
pub trait KeyValueStore: Send {
    /// Reads a value; `None` if the key was never written or was removed.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the value under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Reads and decodes a JSON value, treating unreadable or corrupt data as
/// absent.
pub fn load_json<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match kv.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!("Could not read {}: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Discarding corrupt value for {}: {}", key, e);
            None
        }
    }
}

/// Encodes and writes a JSON value.
pub fn save_json<T: Serialize + ?Sized>(
    kv: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let encoded = serde_json::to_string(value)
        .map_err(|source| StoreError::Encode { key: key.to_string(), source })?;
    trace!("Persisting {} ({} bytes)", key, encoded.len());
    kv.set(key, &encoded)
}

/// In-memory backend. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> T {
        let mut guard = self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.with_entries(|map| map.get(key).cloned()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_entries(|map| map.insert(key.to_string(), value.to_string()));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.with_entries(|map| map.remove(key));
        Ok(())
    }
}

/// On-disk backend: one JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .map_err(|source| StoreError::Io { key: dir.display().to_string(), source })?;
        debug!("Using data directory {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { key: key.to_string(), source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        // Write aside then rename so the replacement is all-or-nothing
        let target = self.path(key);
        let staging = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&staging, value)
            .and_then(|()| fs::rename(&staging, &target))
            .map_err(|source| StoreError::Io { key: key.to_string(), source })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { key: key.to_string(), source }),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    /// Memory backend whose writes to selected keys fail.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct FailingStore {
        pub(crate) inner: MemoryStore,
        failing: Arc<Mutex<HashSet<String>>>,
    }

    impl FailingStore {
        pub(crate) fn fail_on(&self, key: &str) {
            self.failing.lock().unwrap().insert(key.to_string());
        }

        fn check(&self, key: &str) -> Result<(), StoreError> {
            if self.failing.lock().unwrap().contains(key) {
                return Err(StoreError::Io {
                    key: key.to_string(),
                    source: std::io::Error::new(ErrorKind::Other, "disk full"),
                });
            }
            Ok(())
        }
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.check(key)?;
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.check(key)?;
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failing_store_only_fails_selected_keys() {
        let mut kv = FailingStore::default();
        kv.fail_on(keys::CART);
        assert!(kv.set(keys::CART, "[]").is_err());
        kv.set(keys::THEME, "\"dark\"").unwrap();
        assert_eq!(kv.get(keys::CART).unwrap(), None);
    }

    #[test]
    fn test_memory_store_basic() {
        let mut kv = MemoryStore::new();
        assert_eq!(kv.get("cart").unwrap(), None);

        kv.set("cart", "[]").unwrap();
        assert_eq!(kv.get("cart").unwrap().as_deref(), Some("[]"));

        kv.remove("cart").unwrap();
        assert_eq!(kv.get("cart").unwrap(), None);
        kv.remove("cart").unwrap();
    }

    #[test]
    fn test_memory_store_clones_share_state() {
        let mut kv = MemoryStore::new();
        let view = kv.clone();
        kv.set("theme", "\"dark\"").unwrap();
        assert_eq!(view.get("theme").unwrap().as_deref(), Some("\"dark\""));
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut kv = FileStore::open(dir.path().join("data")).unwrap();

        assert_eq!(kv.get("wishlist").unwrap(), None);
        kv.set("wishlist", r#"["fs-1"]"#).unwrap();
        assert_eq!(kv.get("wishlist").unwrap().as_deref(), Some(r#"["fs-1"]"#));

        // Overwrite replaces the whole value and leaves no staging file
        kv.set("wishlist", "[]").unwrap();
        assert_eq!(kv.get("wishlist").unwrap().as_deref(), Some("[]"));
        assert!(!kv.dir().join(".wishlist.json.tmp").exists());

        kv.remove("wishlist").unwrap();
        assert_eq!(kv.get("wishlist").unwrap(), None);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        FileStore::open(dir.path()).unwrap().set("orders", "[1]").unwrap();

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.get("orders").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_json_helpers() {
        let mut kv = MemoryStore::new();
        save_json(&mut kv, keys::WISHLIST, &vec!["fs-1".to_string()]).unwrap();

        let loaded: Option<Vec<String>> = load_json(&kv, keys::WISHLIST);
        assert_eq!(loaded, Some(vec!["fs-1".to_string()]));
    }

    #[test]
    fn test_corrupt_value_reads_as_absent() {
        let mut kv = MemoryStore::new();
        kv.set(keys::CART, "{not json").unwrap();
        let loaded: Option<Vec<String>> = load_json(&kv, keys::CART);
        assert!(loaded.is_none());
    }
}
