//! Retry and cache-purge policy.
//!
//! This module classifies decode failures (corrupt payload vs. a payload of
//! the wrong shape) and decides whether the loader should purge the cached
//! copy and try the origin again, so the CSV and JSON paths share one policy.

mod classify;
mod policy;

pub use classify::classify;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
