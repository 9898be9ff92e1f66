//! `file://` resources.

use super::TransportError;
use crate::request::ResourceRequest;
use std::io;
use std::path::PathBuf;

/// Reads a local resource into memory.
pub(super) fn read(request: &ResourceRequest) -> Result<Vec<u8>, TransportError> {
    let path = request.target().to_file_path().map_err(|()| TransportError::Local {
        path: PathBuf::from(request.url()),
        source: io::Error::new(io::ErrorKind::InvalidInput, "not a local file path"),
    })?;
    std::fs::read(&path).map_err(|source| TransportError::Local { path, source })
}
