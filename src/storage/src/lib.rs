pub mod overrides;
pub mod schedule;
pub mod teams;

pub use overrides::{OverrideEntry, OverrideStore, OVERRIDES_FILE};
pub use schedule::{apply_results, load_results, load_schedule, GameResult, RESULTS_FILE};
pub use teams::{load_teams, TEAMS_FILE};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum StorageError {
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io { path, source } => {
                write!(f, "{}: {}", path.display(), source)
            }
            StorageError::Json { path, source } => {
                write!(f, "{}: invalid JSON: {}", path.display(), source)
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StorageError::Io { source, .. } => Some(source),
            StorageError::Json { source, .. } => Some(source),
        }
    }
}

/// Handle on the cache directory holding the schedule snapshot, team
/// metadata, completed results, and user overrides. All writes go
/// through a temp file and an atomic rename.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(CacheStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Reads and decodes a JSON file; `Ok(None)` when it is absent.
    pub fn read_json<T: DeserializeOwned>(&self, file_name: &str) -> Result<Option<T>, StorageError> {
        let path = self.path(file_name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StorageError::Json { path, source })
    }

    /// Serializes `value` to a sibling temp file and renames it over
    /// the target, so readers never observe a half-written file.
    pub fn write_json_atomic<T: Serialize>(&self, file_name: &str, value: &T) -> Result<(), StorageError> {
        let path = self.path(file_name);
        let tmp = self.path(&format!("{}.tmp", file_name));

        let contents = serde_json::to_vec_pretty(value).map_err(|source| StorageError::Json {
            path: path.clone(),
            source,
        })?;

        fs::write(&tmp, contents).map_err(|source| StorageError::Io {
            path: tmp.clone(),
            source,
        })?;

        fs::rename(&tmp, &path).map_err(|source| StorageError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_json_distinguishes_missing_from_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        let missing: Option<Vec<u32>> = store.read_json("absent.json").unwrap();
        assert!(missing.is_none());

        std::fs::write(store.path("broken.json"), "{not json").unwrap();
        let err = store.read_json::<Vec<u32>>("broken.json").unwrap_err();
        assert!(matches!(err, StorageError::Json { .. }));
    }

    #[test]
    fn atomic_write_round_trips_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path()).unwrap();

        store.write_json_atomic("values.json", &vec![1u32, 2, 3]).unwrap();

        let read: Option<Vec<u32>> = store.read_json("values.json").unwrap();
        assert_eq!(read, Some(vec![1, 2, 3]));
        assert!(!store.path("values.json.tmp").exists());
    }
}
