//! Pipeline configuration.

use strata_core::REFRESH_METADATA_COLLECTION;

use crate::retry::RetryPolicy;

/// Pipeline configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Bucket holding the raw uploaded tables (default: "sources").
    pub sources_bucket: String,

    /// Bucket for verbatim ingested copies (default: "bronze").
    pub bronze_bucket: String,

    /// Bucket for cleansed typed tables (default: "silver").
    pub silver_bucket: String,

    /// Bucket for curated analytical tables (default: "gold").
    pub gold_bucket: String,

    /// Prefix for document-store collection names (default: `gold_`).
    pub collection_prefix: String,

    /// Collection receiving write-timing records
    /// (default: `_refresh_metadata`).
    pub metadata_collection: String,

    /// Root directory for the local object store
    /// (default: "./data/objects").
    pub object_root: String,

    /// Path to the `RocksDB` document database
    /// (default: "./data/documents").
    pub document_db_path: String,

    /// Directory holding source CSVs for the seed command
    /// (default: "./data/source").
    pub source_dir: String,

    /// Retry budget for stages with store I/O.
    pub retry: RetryPolicy,
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = RetryPolicy::default();

        Self {
            sources_bucket: std::env::var("SOURCES_BUCKET").unwrap_or_else(|_| "sources".into()),
            bronze_bucket: std::env::var("BRONZE_BUCKET").unwrap_or_else(|_| "bronze".into()),
            silver_bucket: std::env::var("SILVER_BUCKET").unwrap_or_else(|_| "silver".into()),
            gold_bucket: std::env::var("GOLD_BUCKET").unwrap_or_else(|_| "gold".into()),
            collection_prefix: std::env::var("COLLECTION_PREFIX")
                .unwrap_or_else(|_| "gold_".into()),
            metadata_collection: std::env::var("METADATA_COLLECTION")
                .unwrap_or_else(|_| REFRESH_METADATA_COLLECTION.into()),
            object_root: std::env::var("OBJECT_ROOT").unwrap_or_else(|_| "./data/objects".into()),
            document_db_path: std::env::var("DOCUMENT_DB_PATH")
                .unwrap_or_else(|_| "./data/documents".into()),
            source_dir: std::env::var("SOURCE_DIR").unwrap_or_else(|_| "./data/source".into()),
            retry: RetryPolicy {
                max_attempts: std::env::var("PIPELINE_MAX_ATTEMPTS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.max_attempts),
                initial_backoff_ms: std::env::var("PIPELINE_INITIAL_BACKOFF_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.initial_backoff_ms),
                max_backoff_ms: std::env::var("PIPELINE_MAX_BACKOFF_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.max_backoff_ms),
            },
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sources_bucket: "sources".into(),
            bronze_bucket: "bronze".into(),
            silver_bucket: "silver".into(),
            gold_bucket: "gold".into(),
            collection_prefix: "gold_".into(),
            metadata_collection: REFRESH_METADATA_COLLECTION.into(),
            object_root: "./data/objects".into(),
            document_db_path: "./data/documents".into(),
            source_dir: "./data/source".into(),
            retry: RetryPolicy::default(),
        }
    }
}
