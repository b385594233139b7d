// Cache store backends.
// A string-keyed store abstraction with a filesystem implementation for
// real use and an in-memory implementation for ephemeral use and tests.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use directories::ProjectDirs;

use crate::error::{GitfolioError, Result};

/// String-keyed persistence for serialized cache entries.
///
/// Implementations only see opaque key/value strings; entry encoding and
/// expiry live in the fetch layer above.
pub trait CacheStore: Send + Sync {
    /// Read the value stored at `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` at `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value at `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// List every stored key starting with `prefix`.
    fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Filesystem-backed store: one JSON file per key under a root directory.
///
/// Survives across sessions on the same machine.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open the store at the platform cache directory
    /// (`~/.cache/gitfolio` on Linux).
    pub fn new() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "gitfolio").ok_or(GitfolioError::NoCacheDir)?;
        Ok(Self {
            root: dirs.cache_dir().to_path_buf(),
        })
    }

    /// Open the store at an explicit root directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize_name(key)))
    }
}

impl CacheStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        write_atomic(&self.path_for(key), value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for dir_entry in fs::read_dir(&self.root)? {
            let path = dir_entry?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if stem.starts_with(prefix) {
                    keys.push(stem.to_string());
                }
            }
        }
        Ok(keys)
    }
}

/// Write atomically via temp file then rename.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Sanitize a key for use as a file name.
/// Replaces problematic characters with underscores.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

/// In-memory store backed by a mutex-guarded map.
///
/// Ephemeral; also the substitute store for tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }

    fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::with_root(temp_dir.path());

        assert_eq!(store.get("gh-profile").unwrap(), None);

        store.set("gh-profile", r#"{"a":1}"#).unwrap();
        assert_eq!(store.get("gh-profile").unwrap().as_deref(), Some(r#"{"a":1}"#));

        store.set("gh-profile", r#"{"a":2}"#).unwrap();
        assert_eq!(store.get("gh-profile").unwrap().as_deref(), Some(r#"{"a":2}"#));

        store.delete("gh-profile").unwrap();
        assert_eq!(store.get("gh-profile").unwrap(), None);

        // Deleting an absent key is a no-op
        store.delete("gh-profile").unwrap();
    }

    #[test]
    fn test_file_store_list_keys_filters_by_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::with_root(temp_dir.path());

        store.set("gh-profile", "{}").unwrap();
        store.set("gh-repos-stars", "{}").unwrap();
        store.set("other-state", "{}").unwrap();

        let mut keys = store.list_keys("gh-").unwrap();
        keys.sort();
        assert_eq!(keys, vec!["gh-profile", "gh-repos-stars"]);
    }

    #[test]
    fn test_file_store_list_keys_on_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::with_root(temp_dir.path().join("never-created"));

        assert!(store.list_keys("gh-").unwrap().is_empty());
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("gh-profile"), "gh-profile");
        assert_eq!(sanitize_name("gh-commits-my.repo"), "gh-commits-my.repo");
        assert_eq!(sanitize_name("with/slash"), "with_slash");
        assert_eq!(sanitize_name("a:b"), "a_b");
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();

        store.set("gh-profile", "one").unwrap();
        store.set("gh-repos-stars", "two").unwrap();
        store.set("unrelated", "three").unwrap();

        assert_eq!(store.get("gh-profile").unwrap().as_deref(), Some("one"));

        let mut keys = store.list_keys("gh-").unwrap();
        keys.sort();
        assert_eq!(keys, vec!["gh-profile", "gh-repos-stars"]);

        store.delete("gh-profile").unwrap();
        assert_eq!(store.get("gh-profile").unwrap(), None);
    }
}
