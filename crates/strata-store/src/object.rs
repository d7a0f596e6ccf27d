//! Bucketed object storage.
//!
//! The pipeline's CSV tiers live in named buckets (`sources`, `bronze`,
//! `silver`, `gold`) holding whole objects; there are no partial reads
//! or writes. [`MemoryObjectStore`] backs tests and supports failure
//! injection; [`LocalObjectStore`] maps buckets to directories under a
//! root path for single-node runs.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};

/// A bucketed blob store.
///
/// Objects are opaque byte blobs addressed by `(bucket, key)`. Writes
/// replace the whole object; there is no append or range access.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether a bucket exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    /// Create a bucket. Creating an existing bucket is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket cannot be created.
    async fn make_bucket(&self, bucket: &str) -> Result<()>;

    /// Fetch an object.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ObjectNotFound`] if the object does not
    /// exist, [`StoreError::BucketNotFound`] if the bucket does not.
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes>;

    /// Store an object, replacing any previous contents.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BucketNotFound`] if the bucket does not
    /// exist.
    async fn put(&self, bucket: &str, key: &str, data: Bytes) -> Result<()>;

    /// List object keys in a bucket, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BucketNotFound`] if the bucket does not
    /// exist.
    async fn list(&self, bucket: &str) -> Result<Vec<String>>;
}

/// Reject names that would escape the store's namespace.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name == ".." {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

// ============================================================================
// Memory Backend
// ============================================================================

struct InjectedFailure {
    prefix: String,
    remaining: Option<u32>,
}

/// In-memory object store for tests.
///
/// Supports failure injection by `bucket/key` prefix: injected failures
/// surface as [`StoreError::Unavailable`], the transient class the retry
/// policy retries.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    buckets: Arc<RwLock<HashMap<String, BTreeMap<String, Bytes>>>>,
    failures: Arc<RwLock<Vec<InjectedFailure>>>,
}

impl MemoryObjectStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every `get`/`put` whose `bucket/key` path starts with
    /// `prefix`, until failures are cleared.
    pub async fn inject_failure(&self, prefix: &str) {
        self.failures.write().await.push(InjectedFailure {
            prefix: prefix.to_string(),
            remaining: None,
        });
    }

    /// Fail the next `times` matching `get`/`put` calls, then recover.
    pub async fn inject_failure_times(&self, prefix: &str, times: u32) {
        self.failures.write().await.push(InjectedFailure {
            prefix: prefix.to_string(),
            remaining: Some(times),
        });
    }

    /// Remove all injected failures.
    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    async fn check_failure(&self, path: &str) -> Result<()> {
        let mut failures = self.failures.write().await;
        if let Some(pos) = failures.iter().position(|f| path.starts_with(&f.prefix)) {
            let fire = match &mut failures[pos].remaining {
                None => true,
                Some(n) if *n > 0 => {
                    *n -= 1;
                    true
                }
                Some(_) => false,
            };
            if failures[pos].remaining == Some(0) {
                failures.remove(pos);
            }
            if fire {
                return Err(StoreError::Unavailable(format!("injected failure: {path}")));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        validate_name(bucket)?;
        Ok(self.buckets.read().await.contains_key(bucket))
    }

    async fn make_bucket(&self, bucket: &str) -> Result<()> {
        validate_name(bucket)?;
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default();
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes> {
        validate_name(bucket)?;
        validate_name(key)?;
        self.check_failure(&format!("{bucket}/{key}")).await?;

        let buckets = self.buckets.read().await;
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::BucketNotFound(bucket.to_string()))?;
        objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn put(&self, bucket: &str, key: &str, data: Bytes) -> Result<()> {
        validate_name(bucket)?;
        validate_name(key)?;
        self.check_failure(&format!("{bucket}/{key}")).await?;

        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::BucketNotFound(bucket.to_string()))?;
        objects.insert(key.to_string(), data);
        Ok(())
    }

    async fn list(&self, bucket: &str) -> Result<Vec<String>> {
        validate_name(bucket)?;
        let buckets = self.buckets.read().await;
        let objects = buckets
            .get(bucket)
            .ok_or_else(|| StoreError::BucketNotFound(bucket.to_string()))?;
        Ok(objects.keys().cloned().collect())
    }
}

// ============================================================================
// Local Filesystem Backend
// ============================================================================

/// Object store backed by a local directory tree.
///
/// Each bucket is a direct subdirectory of the root; each object is a
/// file inside its bucket. Names are validated so a key can never
/// address outside the root.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create a store rooted at `root`. The root directory is created
    /// lazily by the first `make_bucket`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn bucket_path(&self, bucket: &str) -> Result<PathBuf> {
        validate_name(bucket)?;
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        validate_name(key)?;
        Ok(self.bucket_path(bucket)?.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        let path = self.bucket_path(bucket)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn make_bucket(&self, bucket: &str) -> Result<()> {
        let path = self.bucket_path(bucket)?;
        tokio::fs::create_dir_all(&path).await?;
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes> {
        if !self.bucket_exists(bucket).await? {
            return Err(StoreError::BucketNotFound(bucket.to_string()));
        }
        let path = self.object_path(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::ObjectNotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn put(&self, bucket: &str, key: &str, data: Bytes) -> Result<()> {
        if !self.bucket_exists(bucket).await? {
            return Err(StoreError::BucketNotFound(bucket.to_string()));
        }
        let path = self.object_path(bucket, key)?;
        tokio::fs::write(&path, &data).await?;
        Ok(())
    }

    async fn list(&self, bucket: &str) -> Result<Vec<String>> {
        let path = self.bucket_path(bucket)?;
        if !self.bucket_exists(bucket).await? {
            return Err(StoreError::BucketNotFound(bucket.to_string()));
        }

        let mut keys = Vec::new();
        let mut entries = tokio::fs::read_dir(&path).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                keys.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_put_get_round_trip() {
        let store = MemoryObjectStore::new();
        store.make_bucket("bronze").await.unwrap();

        store
            .put("bronze", "clients.csv", Bytes::from_static(b"a,b\n1,2\n"))
            .await
            .unwrap();

        let data = store.get("bronze", "clients.csv").await.unwrap();
        assert_eq!(&data[..], b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn memory_missing_object_and_bucket() {
        let store = MemoryObjectStore::new();
        store.make_bucket("bronze").await.unwrap();

        let err = store.get("bronze", "nope.csv").await.unwrap_err();
        assert!(matches!(err, StoreError::ObjectNotFound { .. }));

        let err = store.get("nope", "x.csv").await.unwrap_err();
        assert!(matches!(err, StoreError::BucketNotFound(_)));
    }

    #[tokio::test]
    async fn memory_make_bucket_is_idempotent() {
        let store = MemoryObjectStore::new();
        store.make_bucket("gold").await.unwrap();
        store
            .put("gold", "kpis.csv", Bytes::from_static(b"x"))
            .await
            .unwrap();

        store.make_bucket("gold").await.unwrap();

        assert!(store.get("gold", "kpis.csv").await.is_ok());
    }

    #[tokio::test]
    async fn memory_list_is_sorted() {
        let store = MemoryObjectStore::new();
        store.make_bucket("gold").await.unwrap();
        for key in ["b.csv", "a.csv", "c.csv"] {
            store.put("gold", key, Bytes::new()).await.unwrap();
        }

        let keys = store.list("gold").await.unwrap();
        assert_eq!(keys, ["a.csv", "b.csv", "c.csv"]);
    }

    #[tokio::test]
    async fn injected_failures_are_transient_and_recover() {
        let store = MemoryObjectStore::new();
        store.make_bucket("bronze").await.unwrap();
        store.inject_failure_times("bronze/", 2).await;

        for _ in 0..2 {
            let err = store
                .put("bronze", "clients.csv", Bytes::new())
                .await
                .unwrap_err();
            assert!(err.is_transient());
        }

        // Third call recovers.
        store
            .put("bronze", "clients.csv", Bytes::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn permanent_injected_failure_persists_until_cleared() {
        let store = MemoryObjectStore::new();
        store.make_bucket("gold").await.unwrap();
        store.inject_failure("gold/kpis.csv").await;

        assert!(store.get("gold", "kpis.csv").await.is_err());
        assert!(store.get("gold", "kpis.csv").await.is_err());

        store.clear_failures().await;
        store
            .put("gold", "kpis.csv", Bytes::from_static(b"x"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn names_with_separators_are_rejected() {
        let store = MemoryObjectStore::new();
        store.make_bucket("gold").await.unwrap();

        let err = store.get("gold", "../etc/passwd").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidName(_)));

        let err = store.make_bucket("").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidName(_)));
    }

    #[tokio::test]
    async fn local_store_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path());

        assert!(!store.bucket_exists("silver").await.unwrap());
        store.make_bucket("silver").await.unwrap();
        assert!(store.bucket_exists("silver").await.unwrap());

        store
            .put("silver", "achats.csv", Bytes::from_static(b"id\n1\n"))
            .await
            .unwrap();
        let data = store.get("silver", "achats.csv").await.unwrap();
        assert_eq!(&data[..], b"id\n1\n");

        assert_eq!(store.list("silver").await.unwrap(), ["achats.csv"]);
    }

    #[tokio::test]
    async fn local_store_missing_cases() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path());

        let err = store.get("nope", "x.csv").await.unwrap_err();
        assert!(matches!(err, StoreError::BucketNotFound(_)));

        store.make_bucket("bronze").await.unwrap();
        let err = store.get("bronze", "x.csv").await.unwrap_err();
        assert!(matches!(err, StoreError::ObjectNotFound { .. }));
    }
}
