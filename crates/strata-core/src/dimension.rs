//! Surrogate-keyed dimension tables derived from the fact table.
//!
//! The customer dimension is the cleaned customer table verbatim, so it
//! has no builder here. Products and dates get dense surrogate keys
//! starting at 1: products in first-seen fact order, dates in ascending
//! calendar order.

use std::collections::{BTreeSet, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::fact::FactRow;

/// One row of the product dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimProduct {
    /// Dense surrogate key, 1-based, assigned in first-seen order.
    pub product_key: i64,

    /// Product label as it appears in the fact table.
    pub product: String,
}

/// One row of the date dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimDate {
    /// Dense surrogate key, 1-based, assigned in ascending date order.
    pub date_key: i64,

    /// The calendar date.
    pub date: NaiveDate,

    /// Day of month, 1-31.
    pub day: u32,

    /// Month, 1-12.
    pub month: u32,

    /// Calendar year.
    pub year: i32,

    /// English weekday name ("Monday" .. "Sunday").
    pub weekday: String,

    /// ISO 8601 week number, 1-53. Note that dates near a year boundary
    /// can belong to the other year's ISO week.
    pub iso_week: u32,

    /// Quarter, 1-4.
    pub quarter: u32,
}

/// Build the product dimension from distinct fact products.
///
/// Rows without a product are skipped; they contribute no dimension
/// entry.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn build_product_dimension(fact: &[FactRow]) -> Vec<DimProduct> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for product in fact.iter().filter_map(|row| row.product.as_deref()) {
        if seen.insert(product.to_string()) {
            rows.push(DimProduct {
                product_key: rows.len() as i64 + 1,
                product: product.to_string(),
            });
        }
    }

    rows
}

/// Build the date dimension from distinct fact purchase dates.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn build_date_dimension(fact: &[FactRow]) -> Vec<DimDate> {
    let dates: BTreeSet<NaiveDate> = fact.iter().map(|row| row.purchase_date).collect();

    dates
        .into_iter()
        .enumerate()
        .map(|(index, date)| DimDate {
            date_key: index as i64 + 1,
            date,
            day: date.day(),
            month: date.month(),
            year: date.year(),
            weekday: date.format("%A").to_string(),
            iso_week: date.iso_week().week(),
            quarter: (date.month() - 1) / 3 + 1,
        })
        .collect()
}
