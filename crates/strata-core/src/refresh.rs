//! Write-timing metadata and refresh-latency arithmetic.
//!
//! Every export of a curated table appends one immutable
//! [`RefreshMetadataRecord`]. Later, an independent read probe measures
//! how long a count of the mirrored collection takes and, from the most
//! recent write record, how stale the mirror is: `refresh_time =
//! read_start - write_end`. The value is reported as-is; a read racing a
//! write can legitimately produce a negative number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Well-known collection holding one metadata record per export.
pub const REFRESH_METADATA_COLLECTION: &str = "_refresh_metadata";

/// Immutable write-timing record, appended once per exported table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshMetadataRecord {
    /// Target collection the export wrote.
    pub collection_name: String,

    /// When the replace began.
    pub write_start: DateTime<Utc>,

    /// When the replace finished.
    pub write_end: DateTime<Utc>,

    /// `write_end - write_start`, in seconds.
    pub duration_seconds: f64,

    /// Documents written by the replace.
    pub record_count: u64,
}

impl RefreshMetadataRecord {
    /// Build a record, deriving the duration from the two timestamps.
    #[must_use]
    pub fn new(
        collection_name: impl Into<String>,
        write_start: DateTime<Utc>,
        write_end: DateTime<Utc>,
        record_count: u64,
    ) -> Self {
        Self {
            collection_name: collection_name.into(),
            write_start,
            write_end,
            duration_seconds: seconds_between(write_start, write_end),
            record_count,
        }
    }
}

/// Timestamps and document count from one read probe of a collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadProbe {
    /// When the probe started.
    pub read_start: DateTime<Utc>,

    /// When the count came back.
    pub read_end: DateTime<Utc>,

    /// Documents observed in the collection.
    pub document_count: u64,
}

impl ReadProbe {
    /// `read_end - read_start`, in seconds.
    #[must_use]
    pub fn duration_seconds(&self) -> f64 {
        seconds_between(self.read_start, self.read_end)
    }
}

/// Outcome of a refresh-time lookup for one collection.
///
/// A missing write record is a distinct reportable state, never a zero
/// or null latency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshReport {
    /// A write record existed; latency was measured.
    Measured {
        /// The probed collection.
        collection: String,
        /// `read_start - write_end`, in seconds. Not clamped; may be
        /// negative when the probe raced a concurrent write.
        refresh_time_seconds: f64,
        /// Duration of the count probe, in seconds.
        read_duration_seconds: f64,
        /// Duration of the recorded write, in seconds.
        write_duration_seconds: f64,
        /// Documents observed by the probe.
        record_count: u64,
        /// When the recorded write finished.
        write_end: DateTime<Utc>,
        /// When the probe started.
        read_start: DateTime<Utc>,
    },

    /// No write record exists for the collection.
    NoWriteMetadata {
        /// The probed collection.
        collection: String,
        /// Duration of the count probe, in seconds.
        read_duration_seconds: f64,
        /// Documents observed by the probe.
        document_count: u64,
    },
}

impl RefreshReport {
    /// Combine a read probe with the most recent write record, if any.
    #[must_use]
    pub fn from_probe(
        collection: impl Into<String>,
        probe: ReadProbe,
        latest_write: Option<&RefreshMetadataRecord>,
    ) -> Self {
        let collection = collection.into();
        match latest_write {
            Some(meta) => Self::Measured {
                collection,
                refresh_time_seconds: seconds_between(meta.write_end, probe.read_start),
                read_duration_seconds: probe.duration_seconds(),
                write_duration_seconds: meta.duration_seconds,
                record_count: probe.document_count,
                write_end: meta.write_end,
                read_start: probe.read_start,
            },
            None => Self::NoWriteMetadata {
                collection,
                read_duration_seconds: probe.duration_seconds(),
                document_count: probe.document_count,
            },
        }
    }

    /// The measured latency, when there is one.
    #[must_use]
    pub fn refresh_time_seconds(&self) -> Option<f64> {
        match self {
            Self::Measured {
                refresh_time_seconds,
                ..
            } => Some(*refresh_time_seconds),
            Self::NoWriteMetadata { .. } => None,
        }
    }
}

/// Signed elapsed seconds from `start` to `end`.
#[allow(clippy::cast_precision_loss)]
fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let delta = end.signed_duration_since(start);
    delta.num_microseconds().map_or_else(
        || delta.num_milliseconds() as f64 / 1_000.0,
        |us| us as f64 / 1_000_000.0,
    )
}
