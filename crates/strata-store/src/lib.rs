//! Storage backends for the strata analytics pipeline.
//!
//! Two storage shapes back the platform:
//!
//! - [`ObjectStore`]: a bucketed blob store holding the CSV tiers
//!   (`sources`, `bronze`, `silver`, `gold`), with an in-memory backend
//!   for tests and a local-filesystem backend for single-node runs.
//! - [`DocumentStore`]: a collection-oriented store the curated tables
//!   are mirrored into, with an in-memory backend and a `RocksDB`
//!   backend.
//!
//! The in-memory backends support failure injection by path prefix so
//! retry behavior is testable without real I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod document;
pub mod error;
pub mod keys;
pub mod object;
pub mod rocks;
pub mod schema;

pub use document::{DocumentStore, MemoryDocumentStore};
pub use error::{Result, StoreError};
pub use object::{LocalObjectStore, MemoryObjectStore, ObjectStore};
pub use rocks::RocksDocumentStore;
