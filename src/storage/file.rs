//! File-based record storage.
//!
//! All records live in one JSON document (`<dojo_home>/dojo.json` by
//! default). Commits replace the file via temp file + rename.
//!
//! Transactions hold an exclusive advisory lock on a sidecar file
//! (`.dojo.json.lock`) from read to commit, so separate processes sharing
//! the data file take turns instead of overwriting each other.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config::default_data_file;
use crate::error::{DojoError, Result};
use crate::storage::{RecordStore, Records};
use crate::util::{read_to_string_limited, write_atomic, MAX_FILE_SIZE};

/// File-based record store.
///
/// In-process transactions are serialized by a mutex and across processes
/// by a lock file next to the data file. Reads take no lock.
#[derive(Debug)]
pub struct FileRecordStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileRecordStore {
    /// Create a store at the default location.
    ///
    /// Uses `~/.dojo/dojo.json` or `$DOJO_HOME/dojo.json`.
    pub fn new() -> Result<Self> {
        let path = default_data_file().ok_or_else(|| {
            DojoError::config("Could not determine data file location (no home directory)")
        })?;
        Ok(Self::with_path(path))
    }

    /// Create a store backed by a specific file. The file is created on the
    /// first commit.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sidecar lock file path.
    pub fn lock_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "records".to_string());
        self.path.with_file_name(format!(".{}.lock", name))
    }

    /// Block until this handle holds the exclusive lock. Released when the
    /// returned file is dropped.
    fn lock_exclusive(&self) -> Result<File> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|e| DojoError::storage(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| DojoError::storage(&lock_path, e))?;
        file.lock().map_err(|e| DojoError::storage(&lock_path, e))?;
        Ok(file)
    }

    fn read_records(&self) -> Result<Records> {
        if !self.path.exists() {
            return Ok(Records::new());
        }

        let content = read_to_string_limited(&self.path, MAX_FILE_SIZE)?;
        let records: Records = serde_json::from_str(&content).map_err(|e| {
            DojoError::serde(format!("failed to parse {}: {}", self.path.display(), e))
        })?;
        records.check_schema()?;
        Ok(records)
    }

    fn write_records(&self, records: &Records) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        write_atomic(&self.path, json.as_bytes())
    }
}

impl RecordStore for FileRecordStore {
    fn load(&self) -> Result<Records> {
        self.read_records()
    }

    fn transact(&self, work: &mut dyn FnMut(&mut Records) -> Result<()>) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| DojoError::invalid_state("record file lock poisoned"))?;
        let _file_lock = self.lock_exclusive()?;

        let mut records = self.read_records()?;
        work(&mut records)?;
        self.write_records(&records)?;

        tracing::debug!(path = %self.path.display(), "committed records");
        Ok(())
    }
}
