//! Strata HTTP client implementation.

use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use serde::de::DeserializeOwned;

use strata_core::{
    AggregationRow, CountryAggregationRow, CustomerRecord, DimDate, DimProduct, FactRow, GoldTable,
    Granularity, KpiSet, RefreshReport,
};

use crate::error::ClientError;
use crate::types::{ApiErrorResponse, DataResponse, HealthResponse, RefreshLatencySummary};

/// Strata API client.
///
/// Provides typed reads over the curated tables and the refresh-time
/// probe.
#[derive(Debug, Clone)]
pub struct StrataClient {
    client: Client,
    base_url: String,
}

impl StrataClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the strata service (e.g., `"http://strata:8080"`)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new client with custom options.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built (should not happen with
    /// default settings).
    #[must_use]
    pub fn with_options(base_url: impl Into<String>, options: ClientOptions) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Service health.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get_json("health", &[]).await
    }

    /// The single-row KPI summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn kpis(&self) -> Result<Vec<KpiSet>, ClientError> {
        self.read_table(GoldTable::Kpis).await
    }

    /// One page of the purchase fact table.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn fact_achats(&self, limit: usize, skip: usize) -> Result<Vec<FactRow>, ClientError> {
        let response: DataResponse<FactRow> = self
            .get_json(
                GoldTable::FactAchats.basename(),
                &[("limit", limit.to_string()), ("skip", skip.to_string())],
            )
            .await?;
        Ok(response.data)
    }

    /// Customer dimension.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn dim_clients(&self) -> Result<Vec<CustomerRecord>, ClientError> {
        self.read_table(GoldTable::DimClients).await
    }

    /// Product dimension.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn dim_produits(&self) -> Result<Vec<DimProduct>, ClientError> {
        self.read_table(GoldTable::DimProduits).await
    }

    /// Date dimension.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn dim_dates(&self) -> Result<Vec<DimDate>, ClientError> {
        self.read_table(GoldTable::DimDates).await
    }

    /// Revenue rollup at the given granularity.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn aggregate(
        &self,
        granularity: Granularity,
    ) -> Result<Vec<AggregationRow>, ClientError> {
        let table = match granularity {
            Granularity::Day => GoldTable::AggJour,
            Granularity::Week => GoldTable::AggSemaine,
            Granularity::Month => GoldTable::AggMois,
        };
        self.read_table(table).await
    }

    /// Daily revenue rollup.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn agg_jour(&self) -> Result<Vec<AggregationRow>, ClientError> {
        self.aggregate(Granularity::Day).await
    }

    /// Weekly revenue rollup.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn agg_semaine(&self) -> Result<Vec<AggregationRow>, ClientError> {
        self.aggregate(Granularity::Week).await
    }

    /// Monthly revenue rollup.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn agg_mois(&self) -> Result<Vec<AggregationRow>, ClientError> {
        self.aggregate(Granularity::Month).await
    }

    /// Revenue by country, highest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn ca_par_pays(&self) -> Result<Vec<CountryAggregationRow>, ClientError> {
        self.read_table(GoldTable::CaParPays).await
    }

    /// Refresh latency for one table.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn refresh_time(&self, table: GoldTable) -> Result<RefreshReport, ClientError> {
        self.get_json(&format!("refresh_time/{}", table.basename()), &[])
            .await
    }

    /// Probe every table and summarize the measured latencies.
    ///
    /// Tables are probed concurrently. The summary statistics cover only
    /// tables that have been exported at least once; the per-table
    /// reports cover all nine. Any failed probe fails the whole call.
    ///
    /// # Errors
    ///
    /// Returns an error if any request fails or the server returns an error.
    pub async fn refresh_latency_summary(&self) -> Result<RefreshLatencySummary, ClientError> {
        let probes = GoldTable::ALL.iter().map(|table| self.refresh_time(*table));
        let reports: Vec<RefreshReport> = join_all(probes)
            .await
            .into_iter()
            .collect::<Result<_, _>>()?;

        Ok(RefreshLatencySummary::from_reports(reports))
    }

    async fn read_table<T: DeserializeOwned>(&self, table: GoldTable) -> Result<Vec<T>, ClientError> {
        let response: DataResponse<T> = self.get_json(table.basename(), &[]).await?;
        Ok(response.data)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}/{path}", self.base_url);

        let response = self.client.get(&url).query(query).send().await?;

        self.handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        tracing::debug!(%status, "strata API returned an error");

        // Try to parse the structured error body
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => Err(ClientError::Api {
                code: api_error.error.code,
                message: api_error.error.message,
                status: status.as_u16(),
            }),
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}
