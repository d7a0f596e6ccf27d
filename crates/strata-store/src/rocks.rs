//! `RocksDB` document store implementation.
//!
//! This module provides the `RocksDocumentStore` implementation of the
//! [`DocumentStore`] trait.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};
use serde_json::Value;
use ulid::Ulid;

use strata_core::RefreshMetadataRecord;

use crate::document::{validate_collection, DocumentStore};
use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};

/// `RocksDB`-backed document store.
///
/// Every collection lives under its own key prefix in a shared
/// documents column family, with a counts column family giving O(1)
/// cardinality reads for the refresh probe.
pub struct RocksDocumentStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksDocumentStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Collect all document keys under a collection prefix.
    fn collection_keys(&self, collection: &str) -> Result<Vec<Vec<u8>>> {
        let cf = self.cf(cf::DOCUMENTS)?;
        let prefix = keys::collection_prefix(collection);

        let iter = self.db.iterator_cf(
            &cf,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut all_keys = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            all_keys.push(key.to_vec());
        }

        Ok(all_keys)
    }

    fn read_count(&self, collection: &str) -> Result<u64> {
        let cf = self.cf(cf::COUNTS)?;
        let key = keys::count_key(collection);

        let Some(data) = self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(0);
        };

        let bytes: [u8; 8] = data
            .as_slice()
            .try_into()
            .map_err(|_| StoreError::Database("malformed count value".to_string()))?;
        Ok(u64::from_be_bytes(bytes))
    }
}

#[async_trait]
impl DocumentStore for RocksDocumentStore {
    async fn replace_all(&self, collection: &str, documents: &[Value]) -> Result<()> {
        validate_collection(collection)?;

        let cf_docs = self.cf(cf::DOCUMENTS)?;
        let cf_counts = self.cf(cf::COUNTS)?;
        let count_key = keys::count_key(collection);

        // Delete pass: drop existing documents and zero the count.
        let mut delete_batch = WriteBatch::default();
        for key in self.collection_keys(collection)? {
            delete_batch.delete_cf(&cf_docs, key);
        }
        delete_batch.put_cf(&cf_counts, &count_key, 0u64.to_be_bytes());

        self.db
            .write(delete_batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        // Insert pass. A reader between the two writes sees an empty
        // collection; that window is part of the replace contract.
        let mut insert_batch = WriteBatch::default();
        for (index, document) in documents.iter().enumerate() {
            let key = keys::document_key(collection, index as u64);
            let value = Self::serialize(document)?;
            insert_batch.put_cf(&cf_docs, key, value);
        }
        insert_batch.put_cf(&cf_counts, &count_key, (documents.len() as u64).to_be_bytes());

        self.db
            .write(insert_batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::debug!(collection, documents = documents.len(), "collection replaced");

        Ok(())
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Value>> {
        validate_collection(collection)?;

        let cf = self.cf(cf::DOCUMENTS)?;
        let prefix = keys::collection_prefix(collection);

        let iter = self.db.iterator_cf(
            &cf,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut documents = Vec::new();
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            documents.push(Self::deserialize(&value)?);
        }

        Ok(documents)
    }

    async fn find_page(&self, collection: &str, limit: usize, skip: usize) -> Result<Vec<Value>> {
        validate_collection(collection)?;

        let cf = self.cf(cf::DOCUMENTS)?;
        let prefix = keys::collection_prefix(collection);

        let iter = self.db.iterator_cf(
            &cf,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut documents = Vec::new();
        let mut skipped = 0;

        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            if skipped < skip {
                skipped += 1;
                continue;
            }

            if documents.len() >= limit {
                break;
            }

            documents.push(Self::deserialize(&value)?);
        }

        Ok(documents)
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        validate_collection(collection)?;
        self.read_count(collection)
    }

    async fn append_metadata(
        &self,
        metadata_collection: &str,
        record: &RefreshMetadataRecord,
    ) -> Result<()> {
        validate_collection(metadata_collection)?;

        let cf_docs = self.cf(cf::DOCUMENTS)?;
        let cf_counts = self.cf(cf::COUNTS)?;

        let key = keys::appended_key(metadata_collection, Ulid::new());
        let value = Self::serialize(record)?;
        let count = self.read_count(metadata_collection)? + 1;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_docs, key, value);
        batch.put_cf(
            &cf_counts,
            keys::count_key(metadata_collection),
            count.to_be_bytes(),
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    async fn latest_metadata(
        &self,
        metadata_collection: &str,
        collection_name: &str,
    ) -> Result<Option<RefreshMetadataRecord>> {
        validate_collection(metadata_collection)?;

        let cf = self.cf(cf::DOCUMENTS)?;
        let prefix = keys::collection_prefix(metadata_collection);

        let iter = self.db.iterator_cf(
            &cf,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut latest: Option<RefreshMetadataRecord> = None;
        for item in iter {
            let (key, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            let record: RefreshMetadataRecord = Self::deserialize(&value)?;
            if record.collection_name != collection_name {
                continue;
            }
            match &latest {
                Some(current) if current.write_end >= record.write_end => {}
                _ => latest = Some(record),
            }
        }

        Ok(latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksDocumentStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksDocumentStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn metadata(collection: &str, offset_seconds: i64, count: u64) -> RefreshMetadataRecord {
        let write_start = Utc::now() + Duration::seconds(offset_seconds);
        let write_end = write_start + Duration::seconds(2);
        RefreshMetadataRecord::new(collection, write_start, write_end, count)
    }

    #[tokio::test]
    async fn replace_and_read_back_in_order() {
        let (store, _dir) = create_test_store();
        let documents: Vec<Value> = (0..5).map(|i| json!({"row": i})).collect();

        store.replace_all("gold_kpis", &documents).await.unwrap();

        let read = store.find_all("gold_kpis").await.unwrap();
        assert_eq!(read, documents);
        assert_eq!(store.count("gold_kpis").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn replace_drops_previous_generation() {
        let (store, _dir) = create_test_store();

        let first: Vec<Value> = (0..10).map(|i| json!({"gen": 1, "row": i})).collect();
        store.replace_all("gold_fact_achats", &first).await.unwrap();

        let second: Vec<Value> = (0..3).map(|i| json!({"gen": 2, "row": i})).collect();
        store.replace_all("gold_fact_achats", &second).await.unwrap();

        let read = store.find_all("gold_fact_achats").await.unwrap();
        assert_eq!(read, second);
        assert_eq!(store.count("gold_fact_achats").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn pagination_over_replaced_rows() {
        let (store, _dir) = create_test_store();
        let documents: Vec<Value> = (0..10).map(|i| json!({"i": i})).collect();
        store.replace_all("gold_agg_jour", &documents).await.unwrap();

        let page = store.find_page("gold_agg_jour", 4, 3).await.unwrap();
        assert_eq!(
            page,
            vec![json!({"i": 3}), json!({"i": 4}), json!({"i": 5}), json!({"i": 6})]
        );

        let tail = store.find_page("gold_agg_jour", 100, 8).await.unwrap();
        assert_eq!(tail.len(), 2);
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let (store, _dir) = create_test_store();
        store
            .replace_all("gold_kpis", &[json!({"v": 1})])
            .await
            .unwrap();
        store
            .replace_all("gold_kpis2", &[json!({"v": 2}), json!({"v": 3})])
            .await
            .unwrap();

        assert_eq!(store.find_all("gold_kpis").await.unwrap().len(), 1);
        assert_eq!(store.find_all("gold_kpis2").await.unwrap().len(), 2);
        assert_eq!(store.count("gold_kpis").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn count_defaults_to_zero() {
        let (store, _dir) = create_test_store();
        assert_eq!(store.count("gold_dim_dates").await.unwrap(), 0);
        assert!(store.find_all("gold_dim_dates").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn metadata_appends_and_latest_wins() {
        let (store, _dir) = create_test_store();

        store
            .append_metadata("_refresh_metadata", &metadata("gold_kpis", -120, 4))
            .await
            .unwrap();
        store
            .append_metadata("_refresh_metadata", &metadata("gold_kpis", 0, 7))
            .await
            .unwrap();
        store
            .append_metadata("_refresh_metadata", &metadata("gold_agg_mois", 60, 1))
            .await
            .unwrap();

        let latest = store
            .latest_metadata("_refresh_metadata", "gold_kpis")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.record_count, 7);

        // Appends accumulate rather than replace.
        assert_eq!(store.count("_refresh_metadata").await.unwrap(), 3);

        let missing = store
            .latest_metadata("_refresh_metadata", "gold_dim_produits")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn documents_survive_reopen() {
        let dir = TempDir::new().unwrap();

        {
            let store = RocksDocumentStore::open(dir.path()).unwrap();
            store
                .replace_all("gold_ca_par_pays", &[json!({"country": "FR"})])
                .await
                .unwrap();
        }

        let store = RocksDocumentStore::open(dir.path()).unwrap();
        let read = store.find_all("gold_ca_par_pays").await.unwrap();
        assert_eq!(read, vec![json!({"country": "FR"})]);
        assert_eq!(store.count("gold_ca_par_pays").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn slash_in_collection_name_is_rejected() {
        let (store, _dir) = create_test_store();
        let err = store.replace_all("a/b", &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidName(_)));
    }
}
