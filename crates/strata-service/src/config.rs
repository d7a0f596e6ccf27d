//! Service configuration loaded from environment variables.

use strata_core::REFRESH_METADATA_COLLECTION;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to the document database (default: "./data/documents").
    ///
    /// Must point at the same database the pipeline exports into.
    pub data_dir: String,

    /// Prefix prepended to table basenames to form collection names
    /// (default: "gold_").
    pub collection_prefix: String,

    /// Collection holding write-timing records (default: "_refresh_metadata").
    pub metadata_collection: String,

    /// CORS allowed origins (default: allow all).
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes (default: 1MB).
    pub max_body_bytes: usize,

    /// Request timeout in seconds (default: 30).
    pub request_timeout_seconds: u64,
}

impl ServiceConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "./data/documents".into()),
            collection_prefix: std::env::var("COLLECTION_PREFIX")
                .unwrap_or_else(|_| "gold_".into()),
            metadata_collection: std::env::var("METADATA_COLLECTION")
                .unwrap_or_else(|_| REFRESH_METADATA_COLLECTION.into()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "./data/documents".into(),
            collection_prefix: "gold_".into(),
            metadata_collection: REFRESH_METADATA_COLLECTION.into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_env_fallbacks() {
        let config = ServiceConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.collection_prefix, "gold_");
        assert_eq!(config.metadata_collection, "_refresh_metadata");
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.max_body_bytes, 1024 * 1024);
        assert_eq!(config.request_timeout_seconds, 30);
    }
}
