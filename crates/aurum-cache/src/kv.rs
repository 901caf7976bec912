//! Key-Value store wrapper with automatic serialization.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::CacheError;
use serde::{de::DeserializeOwned, Serialize};

/// Where the bytes live.
#[derive(Debug, Clone)]
enum Backend {
    Memory(Arc<Mutex<HashMap<String, Vec<u8>>>>),
    Directory(PathBuf),
}

/// Type-safe cache backed by memory or a directory of JSON files.
///
/// Provides automatic JSON serialization for any type that implements
/// `Serialize` and `DeserializeOwned`. Clones of an in-memory cache share
/// the same map.
#[derive(Debug, Clone)]
pub struct Cache {
    backend: Backend,
}

impl Cache {
    /// Create an empty in-memory cache.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(Mutex::new(HashMap::new()))),
        }
    }

    /// Open a directory-backed cache, creating the directory if needed.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open("./var/store")?;
    /// ```
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .map_err(|e| CacheError::OpenError(format!("{}: {}", dir.display(), e)))?;
        Ok(Self {
            backend: Backend::Directory(dir.to_path_buf()),
        })
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_raw(key)? {
            Some(bytes) => {
                let value: T = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a value in the cache, replacing any previous value.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.set_raw(key, bytes)
    }

    /// Delete a value from the cache. Deleting a missing key is not an error.
    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        match &self.backend {
            Backend::Memory(map) => {
                lock(map)?.remove(key);
                Ok(())
            }
            Backend::Directory(dir) => {
                let path = file_for(dir, key)?;
                match fs::remove_file(&path) {
                    Ok(()) => Ok(()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    /// Check if a key exists in the cache.
    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        match &self.backend {
            Backend::Memory(map) => Ok(lock(map)?.contains_key(key)),
            Backend::Directory(dir) => Ok(file_for(dir, key)?.is_file()),
        }
    }

    /// Get all keys in the cache, sorted.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys = match &self.backend {
            Backend::Memory(map) => lock(map)?.keys().cloned().collect::<Vec<_>>(),
            Backend::Directory(dir) => {
                let mut keys = Vec::new();
                for entry in fs::read_dir(dir)? {
                    let name = entry?.file_name();
                    let name = name.to_string_lossy();
                    if let Some(stem) = name.strip_suffix(".json") {
                        keys.push(decode_key(stem));
                    }
                }
                keys
            }
        };
        keys.sort();
        Ok(keys)
    }

    /// Read the stored bytes for a key.
    pub fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match &self.backend {
            Backend::Memory(map) => Ok(lock(map)?.get(key).cloned()),
            Backend::Directory(dir) => {
                let path = file_for(dir, key)?;
                match fs::read(&path) {
                    Ok(bytes) => Ok(Some(bytes)),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    /// Store raw bytes for a key.
    ///
    /// The directory backend writes a sibling temp file and renames it over
    /// the target, so readers never observe a half-written value.
    pub fn set_raw(&self, key: &str, bytes: Vec<u8>) -> Result<(), CacheError> {
        match &self.backend {
            Backend::Memory(map) => {
                validate_key(key)?;
                lock(map)?.insert(key.to_string(), bytes);
                Ok(())
            }
            Backend::Directory(dir) => {
                let path = file_for(dir, key)?;
                let tmp = path.with_extension("json.tmp");
                fs::write(&tmp, &bytes)?;
                fs::rename(&tmp, &path)?;
                tracing::trace!(key, bytes = bytes.len(), "cache write");
                Ok(())
            }
        }
    }
}

fn lock(
    map: &Mutex<HashMap<String, Vec<u8>>>,
) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>, CacheError> {
    map.lock()
        .map_err(|_| CacheError::StoreError("memory store lock poisoned".to_string()))
}

fn validate_key(key: &str) -> Result<(), CacheError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
        && !key.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidKey(key.to_string()))
    }
}

// ':' is not portable in file names; '%' never appears in a valid key.
fn encode_key(key: &str) -> String {
    key.replace(':', "%3A")
}

fn decode_key(stem: &str) -> String {
    stem.replace("%3A", ":")
}

fn file_for(dir: &Path, key: &str) -> Result<PathBuf, CacheError> {
    validate_key(key)?;
    Ok(dir.join(format!("{}.json", encode_key(key))))
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust,ignore
/// let key = cache_key!("cart", shopper_id);
/// // Returns "cart:shopper-42"
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        name: String,
        count: u32,
    }

    fn entry() -> Entry {
        Entry {
            name: "band".to_string(),
            count: 2,
        }
    }

    #[test]
    fn test_memory_round_trip() {
        let cache = Cache::in_memory();
        cache.set("cart:abc", &entry()).unwrap();

        let loaded: Option<Entry> = cache.get("cart:abc").unwrap();
        assert_eq!(loaded, Some(entry()));
        assert!(cache.exists("cart:abc").unwrap());
    }

    #[test]
    fn test_memory_clones_share_state() {
        let cache = Cache::in_memory();
        let other = cache.clone();
        cache.set("k", &1u32).unwrap();
        assert_eq!(other.get::<u32>("k").unwrap(), Some(1));
    }

    #[test]
    fn test_missing_key_is_none() {
        let cache = Cache::in_memory();
        assert_eq!(cache.get::<Entry>("nope").unwrap(), None);
        cache.delete("nope").unwrap();
    }

    #[test]
    fn test_directory_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        Cache::open(dir.path()).unwrap().set("cart:s1", &entry()).unwrap();

        let reopened = Cache::open(dir.path()).unwrap();
        assert_eq!(reopened.get::<Entry>("cart:s1").unwrap(), Some(entry()));
        assert_eq!(reopened.keys().unwrap(), vec!["cart:s1".to_string()]);

        reopened.delete("cart:s1").unwrap();
        assert!(!reopened.exists("cart:s1").unwrap());
    }

    #[test]
    fn test_corrupt_value_is_serialize_error() {
        let cache = Cache::in_memory();
        cache.set_raw("k", b"{not json".to_vec()).unwrap();
        assert!(matches!(
            cache.get::<Entry>("k"),
            Err(CacheError::SerializeError(_))
        ));
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let cache = Cache::in_memory();
        assert!(matches!(
            cache.set("../escape", &1u32),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(cache.set("", &1u32), Err(CacheError::InvalidKey(_))));
    }

    #[test]
    fn test_cache_key_macro() {
        let key = cache_key!("cart", "shopper-1");
        assert_eq!(key, "cart:shopper-1");
    }
}
