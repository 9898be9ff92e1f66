//! Read-through wrapper: cache first, origin on miss, write back on success.

use super::CacheStore;
use crate::request::ResourceRequest;
use crate::transport::{Transport, TransportError};

/// Transport that consults a [`CacheStore`] before the origin.
///
/// Only bytes from a successful origin fetch are ever stored. `file://`
/// requests and an `ignore`d cache go straight to the origin.
#[derive(Debug, Clone)]
pub struct CachingTransport<T, C> {
    origin: T,
    cache: C,
    ignore: bool,
}

impl<T: Transport, C: CacheStore> CachingTransport<T, C> {
    pub fn new(origin: T, cache: C) -> Self {
        Self {
            origin,
            cache,
            ignore: false,
        }
    }

    /// Bypass the store for reads and writes (every fetch hits the origin).
    pub fn ignore_cache(mut self, ignore: bool) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}

impl<T: Transport, C: CacheStore> Transport for CachingTransport<T, C> {
    fn get(&self, request: &ResourceRequest) -> Result<Vec<u8>, TransportError> {
        if self.ignore || request.is_local() {
            return self.origin.get(request);
        }

        let url = request.url();
        match self.cache.get(url) {
            Ok(Some(bytes)) => {
                tracing::debug!(url = %url, bytes = bytes.len(), "cache hit");
                return Ok(bytes);
            }
            Ok(None) => tracing::debug!(url = %url, "cache miss"),
            Err(error) => tracing::warn!(url = %url, %error, "cache read failed, using origin"),
        }

        let bytes = self.origin.get(request)?;
        if let Err(error) = self.cache.put(url, &bytes) {
            tracing::warn!(url = %url, %error, "failed to write cache entry");
        }
        Ok(bytes)
    }
}
