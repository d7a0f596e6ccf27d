//! Error types for core transformations.

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while decoding or encoding tables.
///
/// Row-level data-quality problems (an unparseable field, a bad date) are
/// never errors: cleansing drops and counts those rows. Errors here mean
/// the table itself is unusable.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// CSV encoding or decoding failed.
    #[error("csv error: {0}")]
    Csv(String),

    /// A required column is absent from a raw table.
    #[error("missing column in {table}: {column}")]
    MissingColumn {
        /// Logical name of the table being read.
        table: String,
        /// The column that was expected.
        column: String,
    },
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}
