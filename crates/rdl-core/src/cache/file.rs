//! On-disk cache: one file per URL, named by the SHA-256 of the URL.
//!
//! Writes go to a temp file in the cache directory and are renamed into
//! place, so readers see either the old entry, the new one, or nothing.

use super::{CacheError, CacheStore};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Entry file suffix.
const ENTRY_SUFFIX: &str = ".cache";

fn io_err(op: &'static str, path: &Path) -> impl FnOnce(io::Error) -> CacheError {
    let path = path.to_path_buf();
    move |source| CacheError::Io { op, path, source }
}

/// Lowercase hex SHA-256 of the URL; stable across runs and platforms.
pub fn cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Cache rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the entry file for `url` (whether or not it exists).
    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}{}", cache_key(url), ENTRY_SUFFIX))
    }
}

impl CacheStore for FileCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.entry_path(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Io {
                op: "read",
                path,
                source,
            }),
        }
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(io_err("create dir", &self.dir))?;
        let path = self.entry_path(key);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .map_err(io_err("create temp file in", &self.dir))?;
        tmp.write_all(bytes).map_err(io_err("write", tmp.path()))?;
        tmp.flush().map_err(io_err("flush", tmp.path()))?;
        tmp.persist(&path)
            .map_err(|e| io_err("persist", &path)(e.error))?;
        tracing::debug!(url = %key, path = %path.display(), bytes = bytes.len(), "cached resource");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Io {
                op: "delete",
                path,
                source,
            }),
        }
    }
}
