//! Batch orchestrator for the strata analytics platform.
//!
//! The pipeline moves two raw CSV tables through the storage tiers:
//!
//! 1. **Ingest**: copy source objects into the `bronze` bucket verbatim.
//! 2. **Cleanse**: validate, standardize, and deduplicate each table,
//!    publishing typed rows to the `silver` bucket.
//! 3. **Transform**: join the silver tables into the purchase fact and
//!    derive the KPI, dimension, and aggregation tables in the `gold`
//!    bucket.
//! 4. **Export**: mirror every gold table into the document store and
//!    append a write-timing record for the refresh tracker.
//!
//! Stages with store I/O run under a bounded exponential-backoff retry;
//! only transient store failures are retried, data-quality and
//! environment errors abort the run.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod pipeline;
pub mod retry;
pub mod seed;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, RunSummary};
pub use retry::{run_with_retry, RetryPolicy};
pub use seed::seed_sources;
