//! File-based cache.
//!
//! Layout under the cache root:
//!
//! ```text
//! {root}/
//! +-- VERSION              # format version; mismatch wipes the root
//! +-- sanitized/           # bucket
//!     +-- 3f/              # first two characters of the key
//!         +-- 3f2a...      # entry: "{etag}\n{value}"
//! ```
//!
//! Keys are expected to be filesystem-safe (e.g. hex digests). Keys that are
//! not are rejected and behave as a permanent miss.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Cache, CacheBucket};

/// Version written to the `VERSION` file of the cache root.
const FORMAT_VERSION: &str = "hdiff-cache-1";

/// File-based [`Cache`] rooted at a directory.
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Open the cache at `root`, creating or resetting it as needed.
    ///
    /// Setup problems are logged, never fatal: the cache then misses.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        prepare_root(&root);
        Self { root }
    }

    /// Root directory of this cache.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(FileCacheBucket {
            dir: self.root.join(name),
        })
    }
}

struct FileCacheBucket {
    dir: PathBuf,
}

impl FileCacheBucket {
    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        let valid = key.len() >= 2
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            tracing::debug!(%key, "Rejecting cache key");
            return None;
        }
        Some(self.dir.join(&key[..2]).join(key))
    }
}

impl CacheBucket for FileCacheBucket {
    fn get(&self, key: &str, etag: &str) -> Option<String> {
        let path = self.entry_path(key)?;
        let content = fs::read_to_string(path).ok()?;
        let (stored_etag, value) = content.split_once('\n')?;
        if stored_etag != etag {
            tracing::trace!(%key, "Cache etag mismatch");
            return None;
        }
        Some(value.to_owned())
    }

    fn set(&self, key: &str, etag: &str, value: &str) {
        if etag.contains('\n') {
            return;
        }
        let Some(path) = self.entry_path(key) else {
            return;
        };
        let Some(parent) = path.parent() else {
            return;
        };
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::debug!("Failed to create cache directory: {e}");
            return;
        }
        if let Err(e) = fs::write(&path, format!("{etag}\n{value}")) {
            tracing::debug!("Failed to write cache entry: {e}");
        }
    }
}

/// Make sure `root` exists and holds a cache of the current format.
fn prepare_root(root: &Path) {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == FORMAT_VERSION => return,
        Ok(stored) => {
            tracing::info!("Cache format changed (stored={stored}), wiping cache");
        }
        Err(_) => {
            tracing::info!("Initializing cache at {}", root.display());
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!("Failed to remove cache directory: {e}");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!("Failed to create cache directory: {e}");
        return;
    }
    if let Err(e) = fs::write(&version_file, FORMAT_VERSION) {
        tracing::warn!("Failed to write cache VERSION file: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_get() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"));
        let bucket = cache.bucket("sanitized");

        bucket.set("abcdef", "cfg1", "<p>clean</p>\nsecond line");
        assert_eq!(
            bucket.get("abcdef", "cfg1"),
            Some("<p>clean</p>\nsecond line".to_owned())
        );
    }

    #[test]
    fn test_etag_mismatch_misses() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"));
        let bucket = cache.bucket("sanitized");

        bucket.set("abcdef", "cfg1", "value");
        assert_eq!(bucket.get("abcdef", "cfg2"), None);
    }

    #[test]
    fn test_overwrite_replaces_entry() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"));
        let bucket = cache.bucket("sanitized");

        bucket.set("abcdef", "cfg1", "first");
        bucket.set("abcdef", "cfg2", "second");
        assert_eq!(bucket.get("abcdef", "cfg1"), None);
        assert_eq!(bucket.get("abcdef", "cfg2"), Some("second".to_owned()));
    }

    #[test]
    fn test_unsafe_key_rejected() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"));
        let bucket = cache.bucket("sanitized");

        bucket.set("../escape", "cfg", "value");
        assert_eq!(bucket.get("../escape", "cfg"), None);
        assert!(!tmp.path().join("escape").exists());
    }

    #[test]
    fn test_buckets_are_isolated() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"));

        cache.bucket("alpha").set("key01", "e", "a");
        cache.bucket("beta").set("key01", "e", "b");

        assert_eq!(cache.bucket("alpha").get("key01", "e"), Some("a".to_owned()));
        assert_eq!(cache.bucket("beta").get("key01", "e"), Some("b".to_owned()));
    }

    #[test]
    fn test_reopen_keeps_entries() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        FileCache::new(root.clone())
            .bucket("sanitized")
            .set("abcdef", "cfg", "kept");

        let reopened = FileCache::new(root);
        assert_eq!(
            reopened.bucket("sanitized").get("abcdef", "cfg"),
            Some("kept".to_owned())
        );
    }

    #[test]
    fn test_foreign_version_wipes_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");
        fs::create_dir_all(root.join("sanitized/ab")).unwrap();
        fs::write(root.join("VERSION"), "something-else").unwrap();
        fs::write(root.join("sanitized/ab/abcdef"), "cfg\nstale").unwrap();

        let cache = FileCache::new(root.clone());

        assert_eq!(cache.bucket("sanitized").get("abcdef", "cfg"), None);
        assert_eq!(
            fs::read_to_string(root.join("VERSION")).unwrap(),
            FORMAT_VERSION
        );
    }
}
