//! Document collections for the serving tier.
//!
//! Exported gold tables land here as JSON documents, one collection per
//! table, plus a metadata collection recording write timings. Reads are
//! ordered by insertion so exports round-trip in row order.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use strata_core::{ReadProbe, RefreshMetadataRecord};

use crate::error::{Result, StoreError};

/// A store of named JSON document collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Replace the full contents of a collection.
    ///
    /// The replacement is a delete pass followed by an insert pass, not
    /// an atomic swap. A concurrent reader can observe an empty or
    /// partially filled collection while a replace is in flight.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection name is invalid or the
    /// backend fails.
    async fn replace_all(&self, collection: &str, documents: &[Value]) -> Result<()>;

    /// All documents in a collection, in insertion order. Unknown
    /// collections read as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn find_all(&self, collection: &str) -> Result<Vec<Value>>;

    /// A page of documents: skip `skip`, then take up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn find_page(&self, collection: &str, limit: usize, skip: usize) -> Result<Vec<Value>>;

    /// Number of documents in a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn count(&self, collection: &str) -> Result<u64>;

    /// Append a write-timing record to the metadata collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn append_metadata(
        &self,
        metadata_collection: &str,
        record: &RefreshMetadataRecord,
    ) -> Result<()>;

    /// The metadata record with the latest `write_end` for a
    /// collection, or `None` if that collection has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn latest_metadata(
        &self,
        metadata_collection: &str,
        collection_name: &str,
    ) -> Result<Option<RefreshMetadataRecord>>;

    /// Count a collection under a timed read probe.
    ///
    /// The timestamps bracket only the count itself, keeping the probe
    /// cheap relative to a full scan.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn probe_count(&self, collection: &str) -> Result<ReadProbe> {
        let read_start = Utc::now();
        let document_count = self.count(collection).await?;
        let read_end = Utc::now();
        Ok(ReadProbe {
            read_start,
            read_end,
            document_count,
        })
    }
}

pub(crate) fn validate_collection(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn decode_metadata(document: &Value) -> Result<RefreshMetadataRecord> {
    serde_json::from_value(document.clone())
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

/// In-memory document store for tests.
///
/// Mirrors the backend contract including the non-atomic replace: the
/// delete and insert phases take the write lock separately, so the
/// empty window between them is observable under concurrency.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<RwLock<HashMap<String, Vec<Value>>>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn replace_all(&self, collection: &str, documents: &[Value]) -> Result<()> {
        validate_collection(collection)?;

        // Delete phase.
        {
            let mut collections = self.collections.write().await;
            collections.insert(collection.to_string(), Vec::new());
        }
        // Insert phase, under a fresh lock acquisition.
        {
            let mut collections = self.collections.write().await;
            if let Some(stored) = collections.get_mut(collection) {
                stored.extend(documents.iter().cloned());
            }
        }
        Ok(())
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Value>> {
        validate_collection(collection)?;
        let collections = self.collections.read().await;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    async fn find_page(&self, collection: &str, limit: usize, skip: usize) -> Result<Vec<Value>> {
        validate_collection(collection)?;
        let collections = self.collections.read().await;
        let documents = collections
            .get(collection)
            .map(|docs| docs.iter().skip(skip).take(limit).cloned().collect())
            .unwrap_or_default();
        Ok(documents)
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        validate_collection(collection)?;
        let collections = self.collections.read().await;
        Ok(collections.get(collection).map_or(0, |docs| docs.len() as u64))
    }

    async fn append_metadata(
        &self,
        metadata_collection: &str,
        record: &RefreshMetadataRecord,
    ) -> Result<()> {
        validate_collection(metadata_collection)?;
        let document =
            serde_json::to_value(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let mut collections = self.collections.write().await;
        collections
            .entry(metadata_collection.to_string())
            .or_default()
            .push(document);
        Ok(())
    }

    async fn latest_metadata(
        &self,
        metadata_collection: &str,
        collection_name: &str,
    ) -> Result<Option<RefreshMetadataRecord>> {
        validate_collection(metadata_collection)?;
        let collections = self.collections.read().await;
        let Some(documents) = collections.get(metadata_collection) else {
            return Ok(None);
        };

        let mut latest: Option<RefreshMetadataRecord> = None;
        for document in documents {
            if document.get("collection_name").and_then(Value::as_str) != Some(collection_name) {
                continue;
            }
            let record = decode_metadata(document)?;
            match &latest {
                Some(current) if current.write_end >= record.write_end => {}
                _ => latest = Some(record),
            }
        }
        Ok(latest)
    }
}
