//! Response types the service emits.

use serde::Deserialize;

use strata_core::RefreshReport;

/// Envelope wrapping every table read.
#[derive(Debug, Deserialize)]
pub struct DataResponse<T> {
    /// Documents in the collection, in export order.
    pub data: Vec<T>,
}

/// Health check response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// Error response envelope.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    /// The error payload.
    pub error: ApiErrorBody,
}

/// Error payload.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Per-table refresh reports with summary statistics over the measured
/// latencies.
#[derive(Debug, Clone)]
pub struct RefreshLatencySummary {
    /// One report per probed table.
    pub reports: Vec<RefreshReport>,

    /// Mean measured refresh time, in seconds. `None` when no table has
    /// ever been exported.
    pub avg_refresh_seconds: Option<f64>,

    /// Smallest measured refresh time, in seconds.
    pub min_refresh_seconds: Option<f64>,

    /// Largest measured refresh time, in seconds.
    pub max_refresh_seconds: Option<f64>,
}

impl RefreshLatencySummary {
    /// Summarize a set of reports.
    ///
    /// Tables without write metadata contribute a report but no
    /// statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_reports(reports: Vec<RefreshReport>) -> Self {
        let measured: Vec<f64> = reports
            .iter()
            .filter_map(RefreshReport::refresh_time_seconds)
            .collect();

        let (avg, min, max) = if measured.is_empty() {
            (None, None, None)
        } else {
            let sum: f64 = measured.iter().sum();
            let min = measured.iter().copied().fold(f64::INFINITY, f64::min);
            let max = measured.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (Some(sum / measured.len() as f64), Some(min), Some(max))
        };

        Self {
            reports,
            avg_refresh_seconds: avg,
            min_refresh_seconds: min,
            max_refresh_seconds: max,
        }
    }

    /// Number of tables with a measured latency.
    #[must_use]
    pub fn measured_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|report| report.refresh_time_seconds().is_some())
            .count()
    }
}
