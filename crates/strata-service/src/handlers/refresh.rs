//! Refresh latency handler.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use strata_core::{GoldTable, RefreshReport};

use crate::error::ApiError;
use crate::state::AppState;

/// Report how stale a collection is relative to its last export.
///
/// The path parameter is the table basename (for example `kpis`, not
/// `gold_kpis`). Both report shapes are 200 responses: `measured` when
/// a write record exists, `no_write_metadata` when the table has never
/// been exported. Unknown basenames are 404s.
pub async fn refresh_time(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
) -> Result<Json<RefreshReport>, ApiError> {
    let Some(table) = GoldTable::from_basename(&table) else {
        return Err(ApiError::NotFound(format!("unknown collection: {table}")));
    };

    let collection = state.collection(table);
    let probe = state.store.probe_count(&collection).await?;
    let latest = state
        .store
        .latest_metadata(&state.config.metadata_collection, &collection)
        .await?;

    Ok(Json(RefreshReport::from_probe(
        collection,
        probe,
        latest.as_ref(),
    )))
}
