//! Retrying loader: fetch → decode, purging the cached copy on decode failure.
//!
//! Per load call:
//!
//! ```text
//! Fetching ──transport error──────────────────────────▶ Empty
//!    │
//!    ▼
//! Decoding ──ok─────────────────────────────────────────▶ Success
//!    │ ──wrong shape (separator)───────────────────────▶ Empty
//!    │ ──corrupt, attempts left──▶ sleep, purge ──▶ Fetching
//!    └ ──corrupt, ceiling reached───────────────────────▶ Empty
//! ```
//!
//! Only a request that cannot be built is returned as an error.

use crate::cache::{CacheError, CacheStore, CachingTransport, FileCache};
use crate::config::RdlConfig;
use crate::decode::{self, DecodeError, Separator};
use crate::request::{join_url_parts, LoadError, ResourceFetcher, CSV_ACCEPT, JSON_ACCEPT};
use crate::retry::{self, ErrorKind, RetryDecision, RetryPolicy};
use crate::transport::{CurlTransport, Transport};
use std::sync::Arc;

/// Result of a load that did not fail fatally.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The resource was fetched and decoded.
    Success(T),
    /// Nothing to use: the transport failed, the payload had the wrong
    /// shape, or every attempt produced an undecodable payload.
    Empty,
}

impl<T> Outcome<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Outcome::Success(v) => Some(v),
            Outcome::Empty => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Success(v) => Outcome::Success(f(v)),
            Outcome::Empty => Outcome::Empty,
        }
    }
}

/// Loader wired with the default collaborators: curl behind an on-disk cache.
pub type DefaultLoader = Loader<CachingTransport<CurlTransport, Arc<FileCache>>, Arc<FileCache>>;

/// Fetches and decodes remote resources, self-healing corrupt cache entries.
///
/// `transport` is whatever produces bytes (usually a [`CachingTransport`]);
/// `cache` is the store entries are purged from. They normally share one
/// store, but the loader never assumes so.
#[derive(Debug, Clone)]
pub struct Loader<T, C> {
    fetcher: ResourceFetcher<T>,
    cache: C,
    policy: RetryPolicy,
}

impl DefaultLoader {
    /// Builds the default loader from configuration.
    pub fn from_config(cfg: &RdlConfig) -> anyhow::Result<Self> {
        let cache = Arc::new(FileCache::new(cfg.cache_dir()?));
        let origin = CurlTransport::from_config(&cfg.http);
        let transport =
            CachingTransport::new(origin, Arc::clone(&cache)).ignore_cache(cfg.cache.ignore);
        tracing::debug!(
            cache_dir = %cache.dir().display(),
            ignore = cfg.cache.ignore,
            "loader ready"
        );
        Ok(Loader::new(transport, cache, cfg.retry_policy()))
    }
}

impl<T: Transport, C: CacheStore> Loader<T, C> {
    pub fn new(transport: T, cache: C, policy: RetryPolicy) -> Self {
        Self {
            fetcher: ResourceFetcher::new(transport),
            cache,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Loads a delimited table from the URL formed by joining `url_parts`.
    ///
    /// `sep` must be exactly one character (`,`, `;`, `|`, ...). Every row has
    /// the field count of the first row.
    pub fn get_csv<S: AsRef<str>>(
        &self,
        sep: &str,
        url_parts: &[S],
    ) -> Result<Outcome<Vec<Vec<String>>>, LoadError> {
        let url = join_url_parts(url_parts);
        // A malformed URL is fatal even when the separator is unusable too.
        self.fetcher.request(&url, CSV_ACCEPT)?;
        let sep = match Separator::parse(sep) {
            Ok(sep) => sep,
            Err(error) => {
                tracing::error!(url = %url, %error, "cannot read CSV resource");
                return Ok(Outcome::Empty);
            }
        };
        self.load(&url, CSV_ACCEPT, |bytes| decode::decode_csv_with(bytes, sep))
    }

    /// Loads a JSON document from the URL formed by joining `url_parts`.
    pub fn get_json<S: AsRef<str>>(
        &self,
        url_parts: &[S],
    ) -> Result<Outcome<serde_json::Value>, LoadError> {
        let url = join_url_parts(url_parts);
        self.load(&url, JSON_ACCEPT, decode::decode_json)
    }

    /// Removes the cached copy of the resource at the joined URL.
    pub fn purge<S: AsRef<str>>(&self, url_parts: &[S]) -> Result<(), CacheError> {
        self.cache.delete(&join_url_parts(url_parts))
    }

    fn load<V, D>(&self, url: &str, accept: &[&str], decode: D) -> Result<Outcome<V>, LoadError>
    where
        D: Fn(&[u8]) -> Result<V, DecodeError>,
    {
        let mut last_error = None;

        for attempt in 0..=self.policy.max_retries {
            let request = self.fetcher.request(url, accept)?;

            let bytes = match self.fetcher.fetch(&request) {
                Ok(bytes) => bytes,
                Err(error) => {
                    tracing::error!(url = %url, attempt, %error, "failed to read resource");
                    return Ok(Outcome::Empty);
                }
            };

            let error = match decode(bytes.as_slice()) {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(url = %url, attempt, "resource decoded after retry");
                    }
                    return Ok(Outcome::Success(value));
                }
                Err(error) => error,
            };

            let kind = retry::classify(&error);
            if kind == ErrorKind::ContentMismatch {
                tracing::error!(url = %url, %error, "resource does not match requested format");
                return Ok(Outcome::Empty);
            }

            tracing::warn!(url = %url, attempt, %error, "failed to decode resource");
            match self.policy.decide(attempt, kind) {
                RetryDecision::RetryAfter(delay) => {
                    tracing::warn!(
                        url = %url,
                        retry = attempt + 1,
                        ?delay,
                        "purging cached copy and retrying"
                    );
                    std::thread::sleep(delay);
                    self.purge_url(url);
                }
                RetryDecision::NoRetry => {
                    last_error = Some(error);
                    break;
                }
            }
        }

        if let Some(error) = last_error {
            tracing::error!(
                url = %url,
                attempts = self.policy.max_fetches(),
                %error,
                "giving up on resource"
            );
        }
        Ok(Outcome::Empty)
    }

    fn purge_url(&self, url: &str) {
        if let Err(error) = self.cache.delete(url) {
            tracing::warn!(url = %url, %error, "failed to purge cache entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ResourceRequest;
    use crate::transport::TransportError;
    use serde_json::json;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const URL: &str = "https://example.com/data";

    /// Origin serving a scripted sequence of bodies; the last one repeats.
    struct ScriptedOrigin {
        script: Mutex<VecDeque<Result<Vec<u8>, u32>>>,
        calls: AtomicUsize,
        accepts: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedOrigin {
        fn new(script: Vec<Result<&str, u32>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(
                    script
                        .into_iter()
                        .map(|r| r.map(|body| body.as_bytes().to_vec()))
                        .collect(),
                ),
                calls: AtomicUsize::new(0),
                accepts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for ScriptedOrigin {
        fn get(&self, request: &ResourceRequest) -> Result<Vec<u8>, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.accepts.lock().unwrap().push(request.accept().to_vec());
            let mut script = self.script.lock().unwrap();
            let next = if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            };
            next.map_err(TransportError::Http)
        }
    }

    /// Counts fetches made by the loader, cache hits included.
    struct Counting<T> {
        inner: T,
        calls: AtomicUsize,
    }

    impl<T: Transport> Transport for Counting<T> {
        fn get(&self, request: &ResourceRequest) -> Result<Vec<u8>, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get(request)
        }
    }

    #[derive(Default)]
    struct SpyCache {
        entries: Mutex<HashMap<String, Vec<u8>>>,
        deletes: AtomicUsize,
    }

    impl SpyCache {
        fn seeded(url: &str, bytes: &[u8]) -> Arc<Self> {
            let cache = Self::default();
            cache.entries.lock().unwrap().insert(url.to_string(), bytes.to_vec());
            Arc::new(cache)
        }

        fn deletes(&self) -> usize {
            self.deletes.load(Ordering::SeqCst)
        }

        fn entry(&self, url: &str) -> Option<Vec<u8>> {
            self.entries.lock().unwrap().get(url).cloned()
        }
    }

    impl CacheStore for SpyCache {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Ok(self.entry(key))
        }
        fn put(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
            self.entries.lock().unwrap().insert(key.to_string(), bytes.to_vec());
            Ok(())
        }
        fn delete(&self, key: &str) -> Result<(), CacheError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    type TestLoader =
        Loader<Arc<Counting<CachingTransport<Arc<ScriptedOrigin>, Arc<SpyCache>>>>, Arc<SpyCache>>;

    struct Harness {
        loader: TestLoader,
        origin: Arc<ScriptedOrigin>,
        cache: Arc<SpyCache>,
        fetches: Arc<Counting<CachingTransport<Arc<ScriptedOrigin>, Arc<SpyCache>>>>,
    }

    fn harness(origin: Arc<ScriptedOrigin>, cache: Arc<SpyCache>, policy: RetryPolicy) -> Harness {
        let fetches = Arc::new(Counting {
            inner: CachingTransport::new(Arc::clone(&origin), Arc::clone(&cache)),
            calls: AtomicUsize::new(0),
        });
        let loader = Loader::new(Arc::clone(&fetches), Arc::clone(&cache), policy);
        Harness {
            loader,
            origin,
            cache,
            fetches,
        }
    }

    impl Harness {
        fn fetches(&self) -> usize {
            self.fetches.calls.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn csv_success_first_try() {
        let h = harness(
            ScriptedOrigin::new(vec![Ok("a;b\nc;d")]),
            Arc::default(),
            RetryPolicy::immediate(1),
        );
        let out = h.loader.get_csv(";", &[URL, ".csv"]).unwrap();
        assert_eq!(
            out,
            Outcome::Success(vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string(), "d".to_string()],
            ])
        );
        assert_eq!(h.fetches(), 1);
        assert_eq!(h.cache.deletes(), 0);
        assert!(h.cache.entry(&format!("{URL}.csv")).is_some());
    }

    #[test]
    fn csv_sends_both_accept_types() {
        let h = harness(
            ScriptedOrigin::new(vec![Ok("a,b\n")]),
            Arc::default(),
            RetryPolicy::immediate(1),
        );
        h.loader.get_csv(",", &[URL]).unwrap();
        h.loader.purge(&[URL]).unwrap();
        h.loader.get_json(&[URL]).unwrap();
        let accepts = h.origin.accepts.lock().unwrap();
        assert_eq!(accepts[0], ["text/csv", "text/plain"]);
        assert_eq!(accepts[1], ["application/json"]);
    }

    #[test]
    fn missing_separator_returns_empty_without_purge() {
        let h = harness(
            ScriptedOrigin::new(vec![Ok("no separators here\n")]),
            Arc::default(),
            RetryPolicy::immediate(3),
        );
        let out = h.loader.get_csv(";", &[URL]).unwrap();
        assert!(out.is_empty());
        assert_eq!(h.fetches(), 1);
        assert_eq!(h.cache.deletes(), 0);
    }

    #[test]
    fn invalid_separator_returns_empty_without_fetch() {
        let h = harness(
            ScriptedOrigin::new(vec![Ok("a,b\n")]),
            Arc::default(),
            RetryPolicy::immediate(3),
        );
        for sep in ["", ",,"] {
            assert!(h.loader.get_csv(sep, &[URL]).unwrap().is_empty());
        }
        assert_eq!(h.fetches(), 0);
        assert_eq!(h.cache.deletes(), 0);
    }

    #[test]
    fn corrupt_cache_entry_is_purged_and_refetched_csv() {
        let h = harness(
            ScriptedOrigin::new(vec![Ok("a,b\nc,d\n")]),
            SpyCache::seeded(URL, b"a,b\nbroken\n"),
            RetryPolicy::immediate(1),
        );
        let out = h.loader.get_csv(",", &[URL]).unwrap();
        assert_eq!(out.into_option().unwrap().len(), 2);
        assert_eq!(h.fetches(), 2);
        assert_eq!(h.origin.calls(), 1);
        assert_eq!(h.cache.deletes(), 1);
        assert_eq!(h.cache.entry(URL).as_deref(), Some(&b"a,b\nc,d\n"[..]));
    }

    #[test]
    fn corrupt_cache_entry_is_purged_and_refetched_json() {
        let h = harness(
            ScriptedOrigin::new(vec![Ok(r#"{"x":1,"y":[2,3]}"#)]),
            SpyCache::seeded(URL, br#"{"x":1,"y":[2"#),
            RetryPolicy::immediate(1),
        );
        let out = h.loader.get_json(&[URL]).unwrap();
        assert_eq!(out, Outcome::Success(json!({"x": 1, "y": [2, 3]})));
        assert_eq!(h.fetches(), 2);
        assert_eq!(h.cache.deletes(), 1);
    }

    #[test]
    fn always_corrupt_stops_at_ceiling() {
        for max_retries in [0u32, 1, 3] {
            let h = harness(
                ScriptedOrigin::new(vec![Ok("{not json")]),
                Arc::default(),
                RetryPolicy::immediate(max_retries),
            );
            let out = h.loader.get_json(&[URL]).unwrap();
            assert!(out.is_empty());
            assert_eq!(h.fetches(), max_retries as usize + 1);
            assert_eq!(h.origin.calls(), max_retries as usize + 1);
            assert_eq!(h.cache.deletes(), max_retries as usize);
        }
    }

    #[test]
    fn transport_failure_gives_up_immediately() {
        let h = harness(
            ScriptedOrigin::new(vec![Err(503), Ok("{}")]),
            Arc::default(),
            RetryPolicy::immediate(3),
        );
        assert!(h.loader.get_json(&[URL]).unwrap().is_empty());
        assert_eq!(h.fetches(), 1);
        assert_eq!(h.cache.deletes(), 0);
    }

    #[test]
    fn transport_failure_after_purge_gives_up() {
        let h = harness(
            ScriptedOrigin::new(vec![Err(404)]),
            SpyCache::seeded(URL, b"[1,"),
            RetryPolicy::immediate(3),
        );
        assert!(h.loader.get_json(&[URL]).unwrap().is_empty());
        assert_eq!(h.fetches(), 2);
        assert_eq!(h.cache.deletes(), 1);
    }

    #[test]
    fn malformed_url_is_fatal_and_touches_nothing() {
        let h = harness(
            ScriptedOrigin::new(vec![Ok("{}")]),
            Arc::default(),
            RetryPolicy::immediate(1),
        );
        let err = h.loader.get_json(&["http://exa mple.com/", "x.json"]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidUrl { ref url, .. } if url == "http://exa mple.com/x.json"));
        assert!(h.loader.get_csv(",", &["::bad"]).is_err());
        assert_eq!(h.fetches(), 0);
        assert_eq!(h.cache.deletes(), 0);
    }

    #[test]
    fn malformed_url_wins_over_invalid_separator() {
        let h = harness(
            ScriptedOrigin::new(vec![Ok("a,b\n")]),
            Arc::default(),
            RetryPolicy::immediate(1),
        );
        let err = h.loader.get_csv("", &["http://exa mple.com/", "x.csv"]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidUrl { .. }));
        assert_eq!(h.fetches(), 0);
        assert_eq!(h.cache.deletes(), 0);
    }

    #[test]
    fn outcome_helpers() {
        let ok: Outcome<u8> = Outcome::Success(1);
        assert_eq!(ok.clone().map(|v| v + 1), Outcome::Success(2));
        assert_eq!(ok.into_option(), Some(1));
        let empty: Outcome<u8> = Outcome::Empty;
        assert!(empty.is_empty());
        assert_eq!(empty.into_option(), None);
    }
}
