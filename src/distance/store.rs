//! Durable key-value backing for the travel-time cache.
//!
//! Keys are origin addresses; each value maps destination addresses to a
//! duration in seconds.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;

/// Durations from one origin, keyed by destination address.
pub type DurationRow = BTreeMap<String, u64>;

/// Storage the cache writes through.
///
/// Concurrent writers against one store are unsupported; no locking is done.
pub trait CacheStore {
    fn contains(&self, origin: &str) -> bool;

    fn get(&self, origin: &str) -> Option<&DurationRow>;

    fn set(&mut self, origin: &str, row: DurationRow);

    /// Makes every `set` so far durable.
    fn flush(&mut self) -> Result<()>;
}

/// Non-durable store, for tests and one-shot runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: HashMap<String, DurationRow>,
    flushes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times [`CacheStore::flush`] was called.
    pub fn flushes(&self) -> usize {
        self.flushes
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl CacheStore for MemoryStore {
    fn contains(&self, origin: &str) -> bool {
        self.rows.contains_key(origin)
    }

    fn get(&self, origin: &str) -> Option<&DurationRow> {
        self.rows.get(origin)
    }

    fn set(&mut self, origin: &str, row: DurationRow) {
        self.rows.insert(origin.to_string(), row);
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Store persisted as one JSON object `{origin: {destination: seconds}}`.
///
/// Writes stay in memory until [`flush`](CacheStore::flush), which writes a
/// sibling temp file and renames it over the target. A crash before the
/// rename leaves the previously committed file intact.
///
/// # Examples
///
/// ```no_run
/// use u_canvass::distance::{CacheStore, JsonFileStore};
///
/// let mut store = JsonFileStore::open("distance-cache.json").unwrap();
/// if !store.contains("1 Main St") {
///     store.set("1 Main St", [("1 Main St".to_string(), 0)].into());
///     store.flush().unwrap();
/// }
/// ```
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    rows: BTreeMap<String, DurationRow>,
    dirty: bool,
}

impl JsonFileStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let rows = match fs::read_to_string(&path) {
            Ok(body) if body.trim().is_empty() => BTreeMap::new(),
            Ok(body) => serde_json::from_str(&body)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("opened distance cache {} ({} origins)", path.display(), rows.len());
        Ok(Self {
            path,
            rows,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl CacheStore for JsonFileStore {
    fn contains(&self, origin: &str) -> bool {
        self.rows.contains_key(origin)
    }

    fn get(&self, origin: &str) -> Option<&DurationRow> {
        self.rows.get(origin)
    }

    fn set(&mut self, origin: &str, row: DurationRow) {
        self.rows.insert(origin.to_string(), row);
        self.dirty = true;
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        {
            let mut file = fs::File::create(&tmp)?;
            serde_json::to_writer(&mut file, &self.rows)?;
            file.flush()?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        self.dirty = false;
        debug!("flushed distance cache {} ({} origins)", self.path.display(), self.rows.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, u64)]) -> DurationRow {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_memory_store_basics() {
        let mut store = MemoryStore::new();
        assert!(!store.contains("a"));
        store.set("a", row(&[("b", 30)]));
        assert!(store.contains("a"));
        assert_eq!(store.get("a").and_then(|r| r.get("b")), Some(&30));
        store.flush().expect("memory flush");
        assert_eq!(store.flushes(), 1);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cache.json");
        {
            let mut store = JsonFileStore::open(&path).expect("open new");
            assert!(store.is_empty());
            store.set("a", row(&[("a", 0), ("b", 42)]));
            store.flush().expect("flush");
        }
        let store = JsonFileStore::open(&path).expect("reopen");
        assert!(store.contains("a"));
        assert_eq!(store.get("a").and_then(|r| r.get("b")), Some(&42));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_unflushed_writes_are_not_persisted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cache.json");
        {
            let mut store = JsonFileStore::open(&path).expect("open");
            store.set("a", row(&[("a", 0)]));
            store.flush().expect("flush");
            store.set("b", row(&[("b", 0)]));
        }
        let store = JsonFileStore::open(&path).expect("reopen");
        assert!(store.contains("a"));
        assert!(!store.contains("b"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cache.json");
        fs::write(&path, "{not json").expect("write");
        assert!(JsonFileStore::open(&path).is_err());
    }
}
