//! Raw tables and CSV codecs.
//!
//! Everything that crosses a storage tier is UTF-8 delimited text with a
//! header row. `RawTable` is the untyped shape the cleanser consumes;
//! typed rows use the serde-based [`encode_rows`] / [`decode_rows`] pair.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CoreError, Result};

/// An untyped table decoded from CSV: a header row plus string cells.
///
/// Empty (or whitespace-only) cells decode to `None`, which is what the
/// cleansing rules treat as a missing value. Ragged rows are padded with
/// `None` to the header width rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Decode a raw table from CSV bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid CSV.
    pub fn from_csv(data: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(data);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row: Vec<Option<String>> = record
                .iter()
                .map(|cell| {
                    let cell = cell.trim();
                    if cell.is_empty() {
                        None
                    } else {
                        Some(cell.to_string())
                    }
                })
                .collect();
            row.resize(headers.len(), None);
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    /// Column headers in file order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Index of a named column, if present.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All data rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }
}

/// Encode typed rows as CSV bytes with a header row.
///
/// # Errors
///
/// Returns an error if a row fails to serialize.
pub fn encode_rows<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| CoreError::Csv(e.to_string()))
}

/// Decode typed rows from CSV bytes produced by [`encode_rows`].
///
/// # Errors
///
/// Returns an error if the input is not valid CSV or a row does not match
/// the expected shape.
pub fn decode_rows<T: DeserializeOwned>(data: &[u8]) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_reader(data);
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}
