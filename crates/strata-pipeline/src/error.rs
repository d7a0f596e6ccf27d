//! Pipeline error types.

use thiserror::Error;

/// Errors surfaced by pipeline stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A storage backend failed.
    #[error("store error: {0}")]
    Store(#[from] strata_store::StoreError),

    /// A table failed to parse or violated its schema.
    #[error("data error: {0}")]
    Core(#[from] strata_core::CoreError),

    /// A document could not be converted to JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The environment or configuration is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A stage exhausted its retry budget.
    #[error("stage {stage} failed after {attempts} attempts: {source}")]
    StageFailed {
        /// The stage that gave up.
        stage: &'static str,
        /// Attempts consumed, including the first.
        attempts: u32,
        /// The final error.
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Whether retrying the failed operation could succeed.
    ///
    /// Schema violations, missing sources, and bad configuration are
    /// permanent; only backend availability problems are worth another
    /// attempt.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Store(err) => err.is_transient(),
            Self::Core(_) | Self::Serialization(_) | Self::Configuration(_) => false,
            Self::StageFailed { source, .. } => source.is_transient(),
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use strata_store::StoreError;

    #[test]
    fn transience_follows_the_store_classification() {
        let unavailable = PipelineError::Store(StoreError::Unavailable("down".into()));
        assert!(unavailable.is_transient());

        let missing = PipelineError::Store(StoreError::ObjectNotFound {
            bucket: "sources".into(),
            key: "clients.csv".into(),
        });
        assert!(!missing.is_transient());

        let config = PipelineError::Configuration("bad bucket".into());
        assert!(!config.is_transient());
    }
}
