//! Blocking HTTP GET over libcurl's easy interface.

use super::{local, Transport, TransportError};
use crate::config::HttpConfig;
use crate::request::ResourceRequest;
use std::time::Duration;

/// Curl-backed transport. Holds only settings; a fresh easy handle is used per request.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    connect_timeout: Duration,
    timeout: Duration,
    max_redirections: u32,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

impl CurlTransport {
    pub fn from_config(cfg: &HttpConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
            max_redirections: cfg.max_redirections,
        }
    }

    fn get_remote(&self, request: &ResourceRequest) -> Result<Vec<u8>, TransportError> {
        let mut body = Vec::new();

        let mut easy = curl::easy::Easy::new();
        // The parsed form is percent-encoded; the raw string is only the cache key.
        easy.url(request.target().as_str())?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.max_redirections)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        // One `Accept:` line per MIME type, in priority order.
        let mut list = curl::easy::List::new();
        for mime in request.accept() {
            list.append(&format!("Accept: {}", mime))?;
        }
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(TransportError::Http(code));
        }
        tracing::debug!(url = %request.url(), bytes = body.len(), "fetched remote resource");
        Ok(body)
    }
}

impl Transport for CurlTransport {
    fn get(&self, request: &ResourceRequest) -> Result<Vec<u8>, TransportError> {
        if request.is_local() {
            return local::read(request);
        }
        self.get_remote(request)
    }
}
