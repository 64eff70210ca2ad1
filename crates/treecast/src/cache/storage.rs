use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use dashmap::DashMap;
use tempfile::NamedTempFile;

/// Byte store backing the persisted cache tier.
pub trait CacheStorage: Send + Sync {
    /// Read the entry stored under `key`; `None` when there is none.
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    /// Store `bytes` under `key`, replacing any previous entry.
    fn set(&self, key: &str, bytes: &[u8]) -> io::Result<()>;
}

/// One file per key inside a directory.
///
/// Writes go to a temporary file in the same directory which is then
/// renamed over the entry, so readers never observe a partial entry.
#[derive(Debug, Clone)]
pub struct FileStorage {
    directory: PathBuf,
}

impl FileStorage {
    /// Use `directory`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(directory: impl Into<PathBuf>) -> io::Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Keys may contain characters that are not valid in file names; those
    /// are replaced. Compiled entries embed their key, so entries whose
    /// names collide are told apart on read.
    fn path(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.directory.join(format!("{name}.json"))
    }
}

impl CacheStorage for FileStorage {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn set(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        let mut file = NamedTempFile::new_in(&self.directory)?;
        file.write_all(bytes)?;
        file.flush()?;
        file.persist(self.path(key)).map_err(|err| err.error)?;
        Ok(())
    }
}

/// Entries kept in memory, mostly useful in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl CacheStorage for MemoryStorage {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        self.entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("cache")).unwrap();

        assert_eq!(storage.get("1.0.class-definition.Box<T=int>").unwrap(), None);

        storage
            .set("1.0.class-definition.Box<T=int>", b"first")
            .unwrap();
        storage
            .set("1.0.class-definition.Box<T=int>", b"second")
            .unwrap();

        assert_eq!(
            storage.get("1.0.class-definition.Box<T=int>").unwrap(),
            Some(b"second".to_vec())
        );
        assert_eq!(fs::read_dir(storage.directory()).unwrap().count(), 1);
    }

    #[test]
    fn test_file_names_are_sanitized() {
        let storage = FileStorage {
            directory: PathBuf::from("/cache"),
        };

        assert_eq!(
            storage.path("v1.class-definition.Pair<K=string, V=int>"),
            PathBuf::from("/cache/v1.class-definition.Pair_K_string__V_int_.json")
        );
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        storage.set("a", b"1").unwrap();

        assert_eq!(storage.get("a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(storage.get("b").unwrap(), None);
        assert_eq!(storage.keys(), ["a"]);
    }
}
