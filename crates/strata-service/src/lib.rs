//! Strata analytics HTTP API.
//!
//! Read-only serving layer over the document store the pipeline exports
//! into: one endpoint per curated table, plus a refresh-time probe that
//! reports how stale each collection is relative to its last export.
//!
//! The service never writes table data. It shares the store path with
//! the pipeline binary and picks up whatever the most recent run left
//! behind.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Handlers all return Result
#![allow(clippy::unused_async)] // Handlers are async by signature

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
