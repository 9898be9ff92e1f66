//! Request construction and fetching.
//!
//! A [`ResourceRequest`] is the immutable description of one GET: the
//! assembled URL plus the `Accept` types to send. [`ResourceFetcher`] builds
//! requests and hands them to a [`Transport`].

use crate::transport::{Transport, TransportError};
use url::Url;

/// `Accept` values sent for delimited tables.
pub const CSV_ACCEPT: &[&str] = &["text/csv", "text/plain"];

/// `Accept` values sent for JSON documents.
pub const JSON_ACCEPT: &[&str] = &["application/json"];

/// Fatal request construction error. The only error a load returns to its caller.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The assembled URL does not parse.
    #[error("failed to create request for resource {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// The URL parses but names a scheme this loader cannot GET.
    #[error("failed to create request for resource {url:?}: unsupported scheme {scheme:?}")]
    UnsupportedScheme { url: String, scheme: String },
}

/// Concatenates URL fragments in order, inserting nothing between them.
///
/// `["https://example.com/", "data", ".csv"]` → `"https://example.com/data.csv"`.
pub fn join_url_parts<S: AsRef<str>>(parts: &[S]) -> String {
    parts.iter().map(AsRef::as_ref).collect()
}

/// One GET request for a remote or local resource.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    url: String,
    target: Url,
    accept: Vec<String>,
}

impl ResourceRequest {
    /// Builds a GET request for `url` accepting `accept` (highest priority first).
    pub fn get(url: &str, accept: &[&str]) -> Result<Self, LoadError> {
        let target = Url::parse(url).map_err(|source| LoadError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        match target.scheme() {
            "http" | "https" | "file" => {}
            other => {
                return Err(LoadError::UnsupportedScheme {
                    url: url.to_string(),
                    scheme: other.to_string(),
                })
            }
        }
        Ok(Self {
            url: url.to_string(),
            target,
            accept: accept.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// The URL exactly as assembled by the caller; also the cache key.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parsed form of [`Self::url`].
    pub fn target(&self) -> &Url {
        &self.target
    }

    pub fn accept(&self) -> &[String] {
        &self.accept
    }

    /// True for `file://` resources, which bypass the cache.
    pub fn is_local(&self) -> bool {
        self.target.scheme() == "file"
    }
}

/// Builds requests and delegates the GET to the injected transport.
#[derive(Debug, Clone)]
pub struct ResourceFetcher<T> {
    transport: T,
}

impl<T: Transport> ResourceFetcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn request(&self, url: &str, accept: &[&str]) -> Result<ResourceRequest, LoadError> {
        ResourceRequest::get(url, accept)
    }

    pub fn fetch(&self, request: &ResourceRequest) -> Result<Vec<u8>, TransportError> {
        self.transport.get(request)
    }
}
