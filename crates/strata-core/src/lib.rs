//! Core types and transformations for the strata analytics pipeline.
//!
//! This crate holds the pure, storage-free half of the platform:
//!
//! - **Raw tables**: `RawTable`, a header-aware string table decoded from CSV
//! - **Records**: `CustomerRecord`, `PurchaseRecord`, `FactRow`
//! - **Cleansing**: `clean_customers`, `clean_purchases` and their reports
//! - **Facts**: `build_fact`, the left join of purchases onto customers
//! - **KPIs**: `compute_kpis` and `KpiSet`
//! - **Dimensions**: `DimProduct`, `DimDate` with dense surrogate keys
//! - **Aggregations**: per-period and per-country revenue rollups
//! - **Refresh tracking**: write-timing metadata and latency arithmetic
//!
//! # Layering
//!
//! Tables move through three quality tiers: `bronze` (ingested raw),
//! `silver` (cleansed), `gold` (curated facts, dimensions, aggregates).
//! Everything in this crate is a pure function from tables to tables;
//! reading and writing the tiers is the pipeline crate's job.
//!
//! Amounts are `f64` throughout. Statistical KPIs over an empty table are
//! `None` rather than `NaN` so serialized output stays valid JSON.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod aggregate;
pub mod cleanse;
pub mod dimension;
pub mod error;
pub mod fact;
pub mod kpi;
pub mod record;
pub mod refresh;
pub mod stats;
pub mod table;
pub mod tables;

pub use aggregate::{
    aggregate_by_country, aggregate_by_period, AggregationRow, CountryAggregationRow, Granularity,
};
pub use cleanse::{
    clean_customers, clean_purchases, CustomerCleanseReport, PurchaseCleanseReport,
    PURCHASE_DATE_WINDOW_DAYS,
};
pub use dimension::{build_date_dimension, build_product_dimension, DimDate, DimProduct};
pub use error::{CoreError, Result};
pub use fact::{build_fact, FactRow};
pub use kpi::{compute_kpis, KpiSet};
pub use record::{CustomerRecord, PurchaseRecord};
pub use refresh::{ReadProbe, RefreshMetadataRecord, RefreshReport, REFRESH_METADATA_COLLECTION};
pub use table::{decode_rows, encode_rows, RawTable};
pub use tables::{source_keys, GoldTable};
