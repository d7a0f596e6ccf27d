//! Column family layout for the `RocksDB` document store.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Documents across all collections, keyed by `collection || '/' || id`.
    /// Replaced rows use a zero-padded row index; appended records use a
    /// ULID, so both sort in insertion order under the collection prefix.
    pub const DOCUMENTS: &str = "documents";

    /// Per-collection document counts, keyed by collection name.
    /// Value is a big-endian `u64`.
    pub const COUNTS: &str = "counts";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::DOCUMENTS, cf::COUNTS]
}
