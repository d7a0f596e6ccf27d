//! Source seeding for local development.

use std::path::Path;

use bytes::Bytes;

use strata_store::ObjectStore;

use crate::error::{PipelineError, Result};

/// Upload every `.csv` file in `dir` into the sources bucket, creating
/// the bucket if needed. Returns the number of objects uploaded.
///
/// # Errors
///
/// Returns a configuration error when the directory cannot be read, or
/// a store error when an upload fails.
pub async fn seed_sources(objects: &dyn ObjectStore, bucket: &str, dir: &Path) -> Result<u64> {
    objects.make_bucket(bucket).await?;

    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        PipelineError::Configuration(format!("source directory {}: {e}", dir.display()))
    })?;

    let mut uploaded = 0;
    while let Some(entry) = entries.next_entry().await.map_err(|e| {
        PipelineError::Configuration(format!("source directory {}: {e}", dir.display()))
    })? {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("csv") {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        let data = tokio::fs::read(&path).await.map_err(|e| {
            PipelineError::Configuration(format!("reading {}: {e}", path.display()))
        })?;
        objects.put(bucket, name, Bytes::from(data)).await?;
        tracing::info!(key = name, bucket, "source uploaded");
        uploaded += 1;
    }

    if uploaded == 0 {
        tracing::warn!(dir = %dir.display(), "no .csv files found to seed");
    }

    Ok(uploaded)
}
