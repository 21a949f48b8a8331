//! On-disk store for raw service responses
//!
//! Overpass answers for the same bounding box rarely change within a day, so
//! [`Cache`] keeps them keyed by the box and hands them back until they go stale.
//! Every entry is one JSON file named after the SHA-256 of its key. The file carries
//! the serialized value together with its checksum, so a truncated or hand-edited
//! file is dropped instead of being returned. Recently used entries stay in memory.
//!
//! # Example
//!
//! ```rust,no_run
//! use grvlfinder_core::cache::{Cache, CacheConfig};
//!
//! let cache = Cache::new(CacheConfig::default())?;
//! cache.set("50.800000_4.600000_50.900000_4.700000", &vec!["way"], None)?;
//!
//! if let Some(ways) = cache.get::<Vec<String>>("50.800000_4.600000_50.900000_4.700000")? {
//!     println!("{} cached ways", ways.len());
//! }
//! # Ok::<(), grvlfinder_core::Error>(())
//! ```

use crate::config::CacheSettings;
use crate::error::{Error, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

const ENTRY_EXTENSION: &str = "json";

/// Where and for how long responses are kept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding one file per entry
    pub cache_dir: PathBuf,
    /// Lifetime of an entry in seconds, 0 keeps it forever
    pub ttl_secs: u64,
    /// Also keep entries in memory for the lifetime of the process
    pub in_memory: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            ttl_secs: 24 * 60 * 60,
            in_memory: true,
        }
    }
}

impl CacheConfig {
    /// Settings from the `[cache]` table
    #[must_use]
    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self {
            cache_dir: settings.dir.clone().unwrap_or_else(default_cache_dir),
            ttl_secs: settings.ttl_secs,
            ..Self::default()
        }
    }
}

/// `<user cache dir>/grvlfinder`
#[must_use]
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("grvlfinder")
}

/// Contents of one entry file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    stored_at: u64,
    expires_at: Option<u64>,
    checksum: String,
    body: String,
}

impl StoredEntry {
    fn is_stale(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }

    fn is_intact(&self) -> bool {
        sha256_hex(self.body.as_bytes()) == self.checksum
    }

    fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn read_entry(path: &Path) -> Option<StoredEntry> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Response cache
#[derive(Debug)]
pub struct Cache {
    config: CacheConfig,
    memory: RwLock<HashMap<String, StoredEntry>>,
}

impl Cache {
    /// Open the cache, creating its directory when missing
    pub fn new(config: CacheConfig) -> Result<Self> {
        if let Err(e) = fs::create_dir_all(&config.cache_dir) {
            return Err(Error::cache(format!(
                "Cannot create cache directory {}",
                config.cache_dir.display()
            ))
            .with_source(e));
        }

        Ok(Self {
            config,
            memory: RwLock::new(HashMap::new()),
        })
    }

    /// Directory holding the entry files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.config.cache_dir
    }

    /// Value stored under `key`. Stale and damaged entries count as missing and are
    /// deleted on the way.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let file_name = sha256_hex(key.as_bytes());
        let now = unix_now();

        if self.config.in_memory {
            if let Some(entry) = self.read_memory().get(&file_name) {
                if !entry.is_stale(now) {
                    return entry.decode().map(Some);
                }
            }
        }

        let path = self.entry_path(&file_name);
        if !path.exists() {
            return Ok(None);
        }

        let Some(entry) = read_entry(&path) else {
            warn!(path = %path.display(), "Unreadable cache entry, discarding");
            self.forget(&file_name);
            return Ok(None);
        };
        if entry.is_stale(now) {
            debug!(key, "Cache entry is stale");
            self.forget(&file_name);
            return Ok(None);
        }
        if entry.key != key || !entry.is_intact() {
            warn!(key, "Cache entry failed its checksum, discarding");
            self.forget(&file_name);
            return Ok(None);
        }

        let value = entry.decode()?;
        if self.config.in_memory {
            self.write_memory().insert(file_name, entry);
        }
        Ok(Some(value))
    }

    /// Store `value` under `key` for `ttl`, or for the configured lifetime
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<()> {
        let body = serde_json::to_string(value)?;
        let stored_at = unix_now();
        let lifetime = ttl.map_or(self.config.ttl_secs, |d| d.as_secs());

        let entry = StoredEntry {
            key: key.to_string(),
            stored_at,
            expires_at: (lifetime > 0).then(|| stored_at.saturating_add(lifetime)),
            checksum: sha256_hex(body.as_bytes()),
            body,
        };

        let file_name = sha256_hex(key.as_bytes());
        fs::write(self.entry_path(&file_name), serde_json::to_vec(&entry)?)?;
        debug!(key, bytes = entry.body.len(), "Cached");

        if self.config.in_memory {
            self.write_memory().insert(file_name, entry);
        }
        Ok(())
    }

    /// Drop the entry for `key`. Returns whether a file was deleted.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let file_name = sha256_hex(key.as_bytes());
        self.write_memory().remove(&file_name);

        match fs::remove_file(self.entry_path(&file_name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every entry and return how many files went
    pub fn clear(&self) -> Result<usize> {
        self.write_memory().clear();
        self.remove_files_where(|_| true)
    }

    /// Delete stale and unreadable entries and return how many files went
    pub fn cleanup(&self) -> Result<usize> {
        let now = unix_now();
        self.write_memory().retain(|_, entry| !entry.is_stale(now));
        self.remove_files_where(|path| read_entry(path).is_none_or(|e| e.is_stale(now)))
    }

    /// Entry counts and disk usage
    pub fn stats(&self) -> Result<CacheStats> {
        let now = unix_now();
        let mut stats = CacheStats {
            total_entries: 0,
            expired_entries: 0,
            total_size_bytes: 0,
            memory_entries: self.read_memory().len(),
            cache_dir: self.config.cache_dir.clone(),
        };

        for path in self.entry_files()? {
            stats.total_entries += 1;
            stats.total_size_bytes += fs::metadata(&path).map_or(0, |m| m.len());
            if read_entry(&path).is_some_and(|e| e.is_stale(now)) {
                stats.expired_entries += 1;
            }
        }
        Ok(stats)
    }

    fn entry_path(&self, file_name: &str) -> PathBuf {
        self.config
            .cache_dir
            .join(file_name)
            .with_extension(ENTRY_EXTENSION)
    }

    fn entry_files(&self) -> Result<Vec<PathBuf>> {
        if !self.config.cache_dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for dir_entry in fs::read_dir(&self.config.cache_dir)? {
            let path = dir_entry?.path();
            if path.extension().is_some_and(|e| e == ENTRY_EXTENSION) {
                files.push(path);
            }
        }
        Ok(files)
    }

    fn remove_files_where(&self, mut doomed: impl FnMut(&Path) -> bool) -> Result<usize> {
        let mut removed = 0;
        for path in self.entry_files()? {
            if doomed(&path) && fs::remove_file(&path).is_ok() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn forget(&self, file_name: &str) {
        self.write_memory().remove(file_name);
        let _ = fs::remove_file(self.entry_path(file_name));
    }

    fn read_memory(&self) -> RwLockReadGuard<'_, HashMap<String, StoredEntry>> {
        self.memory.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_memory(&self) -> RwLockWriteGuard<'_, HashMap<String, StoredEntry>> {
        self.memory.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Counts reported by `grvlfinder cache stats`
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Entry files on disk
    pub total_entries: usize,
    /// Entry files past their lifetime
    pub expired_entries: usize,
    /// Disk usage of the entry files
    pub total_size_bytes: u64,
    /// Entries held in memory by this process
    pub memory_entries: usize,
    /// Directory holding the entry files
    pub cache_dir: PathBuf,
}
