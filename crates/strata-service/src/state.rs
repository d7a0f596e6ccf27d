//! Shared application state.

use std::sync::Arc;

use strata_core::GoldTable;
use strata_store::DocumentStore;

use crate::config::ServiceConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Document store backing every read.
    pub store: Arc<dyn DocumentStore>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create application state over a document store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, config: ServiceConfig) -> Self {
        Self { store, config }
    }

    /// Collection name for a curated table under the configured prefix.
    #[must_use]
    pub fn collection(&self, table: GoldTable) -> String {
        table.collection_name(&self.config.collection_prefix)
    }
}
