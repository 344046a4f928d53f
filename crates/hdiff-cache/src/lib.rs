//! Cache abstraction for hdiff.
//!
//! Expensive, deterministic collaborators (the HTML sanitizer in particular)
//! memoize their output through these traits. The diff core itself never
//! depends on a cache being present.
//!
//! - [`Cache`]: factory for named buckets
//! - [`CacheBucket`]: text store validated by an etag
//!
//! Two implementations are provided: [`NullCache`] (always misses) and
//! [`FileCache`] (one file per entry under a versioned root directory).
//!
//! # Example
//!
//! ```
//! use hdiff_cache::{Cache, NullCache};
//!
//! let bucket = NullCache.bucket("sanitized");
//! bucket.set("3f2a", "cfg-1", "<p>clean</p>");
//! assert_eq!(bucket.get("3f2a", "cfg-1"), None);
//! ```

mod file;
pub use file::FileCache;

/// A named partition within a [`Cache`].
///
/// Values are stored together with an etag chosen by the caller, typically a
/// fingerprint of the settings that produced the value. A lookup only hits
/// when both key and etag match.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value stored under `key` with the same `etag`.
    fn get(&self, key: &str, etag: &str) -> Option<String>;

    /// Store a value, replacing any previous entry for `key`.
    ///
    /// Failures are swallowed: a cache that cannot write simply misses later.
    fn set(&self, key: &str, etag: &str, value: &str);
}

/// Factory for named [`CacheBucket`]s.
pub trait Cache: Send + Sync {
    /// Open or create the bucket called `name`.
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// [`CacheBucket`] that never stores anything.
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str, _etag: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _etag: &str, _value: &str) {}
}

/// [`Cache`] used when caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}
