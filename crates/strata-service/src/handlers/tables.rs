//! Curated table read handlers.
//!
//! Each handler returns the full contents of one collection wrapped in
//! a `data` envelope. Only the fact table is paginated; every other
//! table is small by construction.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use strata_core::GoldTable;

use crate::error::ApiError;
use crate::state::AppState;

/// Default page size for the fact table.
const DEFAULT_FACT_LIMIT: usize = 1000;

/// Envelope for table reads.
#[derive(Debug, Serialize)]
pub struct DataResponse {
    /// Documents in the collection, in export order.
    pub data: Vec<Value>,
}

/// Pagination parameters for the fact table.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    /// Maximum number of rows to return (default: 1000).
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Rows to skip before the page starts (default: 0).
    #[serde(default)]
    pub skip: usize,
}

fn default_limit() -> usize {
    DEFAULT_FACT_LIMIT
}

async fn read_all(state: &AppState, table: GoldTable) -> Result<Json<DataResponse>, ApiError> {
    let collection = state.collection(table);
    let data = state.store.find_all(&collection).await?;
    Ok(Json(DataResponse { data }))
}

/// Single-row KPI summary.
pub async fn kpis(State(state): State<Arc<AppState>>) -> Result<Json<DataResponse>, ApiError> {
    read_all(&state, GoldTable::Kpis).await
}

/// Purchase fact table, paginated.
pub async fn fact_achats(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> Result<Json<DataResponse>, ApiError> {
    let collection = state.collection(GoldTable::FactAchats);
    let data = state
        .store
        .find_page(&collection, page.limit, page.skip)
        .await?;
    Ok(Json(DataResponse { data }))
}

/// Customer dimension.
pub async fn dim_clients(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse>, ApiError> {
    read_all(&state, GoldTable::DimClients).await
}

/// Product dimension.
pub async fn dim_produits(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse>, ApiError> {
    read_all(&state, GoldTable::DimProduits).await
}

/// Date dimension.
pub async fn dim_dates(State(state): State<Arc<AppState>>) -> Result<Json<DataResponse>, ApiError> {
    read_all(&state, GoldTable::DimDates).await
}

/// Daily revenue rollup.
pub async fn agg_jour(State(state): State<Arc<AppState>>) -> Result<Json<DataResponse>, ApiError> {
    read_all(&state, GoldTable::AggJour).await
}

/// Weekly revenue rollup.
pub async fn agg_semaine(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse>, ApiError> {
    read_all(&state, GoldTable::AggSemaine).await
}

/// Monthly revenue rollup.
pub async fn agg_mois(State(state): State<Arc<AppState>>) -> Result<Json<DataResponse>, ApiError> {
    read_all(&state, GoldTable::AggMois).await
}

/// Revenue by country, highest first.
pub async fn ca_par_pays(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse>, ApiError> {
    read_all(&state, GoldTable::CaParPays).await
}
