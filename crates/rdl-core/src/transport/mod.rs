//! Byte transport for resource requests.
//!
//! The loader only sees the [`Transport`] trait. The default implementation
//! drives libcurl's easy interface for `http`/`https` and reads `file://`
//! URLs straight from disk.

mod easy;
mod local;

pub use easy::CurlTransport;

use crate::request::ResourceRequest;
use std::path::PathBuf;
use std::sync::Arc;

/// Failure to obtain the bytes of a resource. Never attributed to the payload itself.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Curl reported an error (timeout, connection refused, DNS, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// A `file://` resource could not be read.
    #[error("read {}: {source}", .path.display())]
    Local {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Performs a GET for a request and returns the full body.
pub trait Transport {
    fn get(&self, request: &ResourceRequest) -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, request: &ResourceRequest) -> Result<Vec<u8>, TransportError> {
        (**self).get(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, request: &ResourceRequest) -> Result<Vec<u8>, TransportError> {
        (**self).get(request)
    }
}
