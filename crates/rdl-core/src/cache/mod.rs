//! Byte cache keyed by resolved URL.
//!
//! [`FileCache`] keeps one file per URL under the cache directory.
//! [`CachingTransport`] puts a store in front of any [`crate::transport::Transport`]:
//! hits are served from the store, misses go to the origin and are written
//! back. The loader itself only ever deletes entries.

mod file;
mod read_through;

pub use file::{cache_key, FileCache};
pub use read_through::CachingTransport;

use std::path::PathBuf;
use std::sync::Arc;

/// Cache store I/O failure. Logged by callers; never fatal to a load.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache {op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Content store keyed by URL.
///
/// Implementations must tolerate concurrent `delete` and `put` for the same
/// key from independent callers without corrupting other entries.
pub trait CacheStore {
    /// Returns the stored bytes for `key`, or `None` on a miss.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;
    /// Stores `bytes` under `key`, replacing any previous entry.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError>;
    /// Removes the entry for `key`. Deleting a missing entry is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

impl<C: CacheStore + ?Sized> CacheStore for &C {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).get(key)
    }
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        (**self).put(key, bytes)
    }
    fn delete(&self, key: &str) -> Result<(), CacheError> {
        (**self).delete(key)
    }
}

impl<C: CacheStore + ?Sized> CacheStore for Arc<C> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).get(key)
    }
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        (**self).put(key, bytes)
    }
    fn delete(&self, key: &str) -> Result<(), CacheError> {
        (**self).delete(key)
    }
}
