//! Shared harness for strata-service integration tests.

#![allow(dead_code)] // Not every helper is used by every test file

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use strata_core::RefreshMetadataRecord;
use strata_service::{create_router, AppState, ServiceConfig};
use strata_store::{DocumentStore, MemoryDocumentStore};

/// Test harness wrapping an in-memory store behind the real router.
pub struct TestHarness {
    /// Server for making HTTP requests.
    pub server: TestServer,
    /// Backing store, kept for seeding collections directly.
    pub store: MemoryDocumentStore,
    /// Configuration the server was built with.
    pub config: ServiceConfig,
}

impl TestHarness {
    /// Create a harness over an empty store.
    pub fn new() -> Self {
        let store = MemoryDocumentStore::new();
        let config = ServiceConfig::default();

        let state = AppState::new(Arc::new(store.clone()), config.clone());
        let router: Router = create_router(state);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            config,
        }
    }

    /// Replace a collection's contents.
    pub async fn seed_collection(&self, collection: &str, documents: &[Value]) {
        self.store
            .replace_all(collection, documents)
            .await
            .expect("Failed to seed collection");
    }

    /// Seed the fact collection with `rows` generated purchases.
    pub async fn seed_fact(&self, rows: usize) {
        let documents: Vec<Value> = (0..rows)
            .map(|i| {
                json!({
                    "purchase_id": i,
                    "customer_id": i % 3,
                    "amount": 10.0,
                    "product": "book",
                })
            })
            .collect();
        self.seed_collection("gold_fact_achats", &documents).await;
    }

    /// Append a write record whose window ended `age_seconds` ago.
    pub async fn seed_metadata(&self, collection: &str, age_seconds: i64, record_count: u64) {
        let write_end = Utc::now() - Duration::seconds(age_seconds);
        let write_start = write_end - Duration::seconds(1);
        let record = RefreshMetadataRecord::new(collection, write_start, write_end, record_count);
        self.store
            .append_metadata(&self.config.metadata_collection, &record)
            .await
            .expect("Failed to seed metadata");
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
