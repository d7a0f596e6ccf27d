//! Strata client SDK.
//!
//! Typed reads over the strata analytics API: one method per curated
//! table, plus the refresh-time probe and a latency summary across all
//! tables.
//!
//! # Example
//!
//! ```no_run
//! use strata_client::{GoldTable, StrataClient};
//!
//! # async fn example() -> Result<(), strata_client::ClientError> {
//! let client = StrataClient::new("http://strata:8080");
//!
//! let kpis = client.kpis().await?;
//! if let Some(kpi) = kpis.first() {
//!     println!("total revenue: {}", kpi.revenue_total);
//! }
//!
//! let report = client.refresh_time(GoldTable::Kpis).await?;
//! if let Some(age) = report.refresh_time_seconds() {
//!     println!("kpis are {age:.1}s stale");
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, StrataClient};
pub use error::ClientError;
pub use types::{ApiErrorBody, ApiErrorResponse, DataResponse, HealthResponse, RefreshLatencySummary};

// Row types the API returns, re-exported for consumers.
pub use strata_core::{
    AggregationRow, CountryAggregationRow, CustomerRecord, DimDate, DimProduct, FactRow, GoldTable,
    Granularity, KpiSet, RefreshReport,
};
