//! Record cleansing: validate, standardize, deduplicate raw tables.
//!
//! Each entity type has its own rule chain, applied in a fixed order so
//! the removal counts are stable:
//!
//! - **Customers**: missing-value drop, email shape check, registration
//!   date parse and future check, key typing, dedup on `customer_id`.
//! - **Purchases**: missing-value drop, amount parse and sign check,
//!   per-batch outlier clipping at twice the 99th percentile, date parse
//!   and window check, key typing, dedup on `purchase_id`.
//!
//! Row-level problems never fail the run; the offending row is dropped
//! and counted in the report. A required column that is absent from the
//! table altogether is an error: a typed record cannot be built without
//! it, and failing here beats a confusing join failure downstream. The
//! optional `country` and `product` columns stay permissive and default
//! to null when absent.
//!
//! Deduplication keeps the first occurrence in original row order.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::record::{
    CustomerRecord, PurchaseRecord, CUSTOMER_COUNTRY_COLUMN, CUSTOMER_REQUIRED_COLUMNS,
    PURCHASE_PRODUCT_COLUMN, PURCHASE_REQUIRED_COLUMNS,
};
use crate::stats;
use crate::table::RawTable;

// ============================================================================
// Constants
// ============================================================================

/// Purchases dated more than this many days before the cleansing date are
/// dropped.
pub const PURCHASE_DATE_WINDOW_DAYS: i64 = 3650;

/// Outlier cutoff: amounts above this multiple of the batch 99th
/// percentile are dropped.
const OUTLIER_P99_MULTIPLIER: f64 = 2.0;

/// Date formats accepted for raw date cells, tried in order.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Datetime formats accepted for raw date cells; the time part is
/// discarded.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Removal counts from one customer cleansing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomerCleanseReport {
    /// Rows in the raw table.
    pub rows_in: usize,
    /// Rows dropped for a null required value.
    pub missing_required: usize,
    /// Rows dropped for an email without `@`.
    pub invalid_email: usize,
    /// Rows dropped for an unparseable or future registration date.
    pub invalid_date: usize,
    /// Rows dropped for a non-integer `customer_id`.
    pub invalid_key: usize,
    /// Rows dropped as duplicate `customer_id` (first occurrence kept).
    pub duplicate_key: usize,
    /// Rows surviving all rules.
    pub rows_out: usize,
}

/// Removal counts from one purchase cleansing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurchaseCleanseReport {
    /// Rows in the raw table.
    pub rows_in: usize,
    /// Rows dropped for a null required value.
    pub missing_required: usize,
    /// Rows dropped for an unparseable or negative amount.
    pub invalid_amount: usize,
    /// Rows dropped by the per-batch outlier cutoff.
    pub outlier_amount: usize,
    /// Rows dropped for an unparseable, future, or too-old purchase date.
    pub invalid_date: usize,
    /// Rows dropped for a non-integer `purchase_id` or `customer_id`.
    pub invalid_key: usize,
    /// Rows dropped as duplicate `purchase_id` (first occurrence kept).
    pub duplicate_key: usize,
    /// Rows surviving all rules.
    pub rows_out: usize,
}

/// Cleanse a raw customer table.
///
/// `today` anchors the future-date rule; the caller passes the current
/// date so the rule chain itself stays deterministic and testable.
///
/// # Errors
///
/// Returns [`CoreError::MissingColumn`] if a required column is absent
/// from the table.
pub fn clean_customers(
    table: &RawTable,
    today: NaiveDate,
) -> Result<(Vec<CustomerRecord>, CustomerCleanseReport)> {
    let mut report = CustomerCleanseReport {
        rows_in: table.len(),
        ..CustomerCleanseReport::default()
    };

    let [id_col, name_col, email_col, date_col] =
        require_columns(table, "customers", CUSTOMER_REQUIRED_COLUMNS)?;
    let country_col = optional_column(table, "customers", CUSTOMER_COUNTRY_COLUMN);

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for row in table.rows() {
        let (Some(id_raw), Some(name), Some(email), Some(date_raw)) = (
            row[id_col].as_deref(),
            row[name_col].as_deref(),
            row[email_col].as_deref(),
            row[date_col].as_deref(),
        ) else {
            report.missing_required += 1;
            continue;
        };

        if !email.contains('@') {
            report.invalid_email += 1;
            continue;
        }

        let Some(registration_date) = parse_date(date_raw) else {
            report.invalid_date += 1;
            continue;
        };
        if registration_date > today {
            report.invalid_date += 1;
            continue;
        }

        let Ok(customer_id) = id_raw.parse::<i64>() else {
            report.invalid_key += 1;
            continue;
        };

        if !seen.insert(customer_id) {
            report.duplicate_key += 1;
            continue;
        }

        records.push(CustomerRecord {
            customer_id,
            name: name.to_string(),
            email: email.to_string(),
            registration_date,
            country: country_col.and_then(|col| row[col].clone()),
        });
    }

    report.rows_out = records.len();
    tracing::info!(
        entity = "customers",
        rows_in = report.rows_in,
        missing_required = report.missing_required,
        invalid_email = report.invalid_email,
        invalid_date = report.invalid_date,
        invalid_key = report.invalid_key,
        duplicate_key = report.duplicate_key,
        rows_out = report.rows_out,
        "cleansing complete"
    );

    Ok((records, report))
}

/// Cleanse a raw purchase table.
///
/// The outlier cutoff is `2 x p99` of the amounts that survive the
/// missing-value and sign rules, recomputed for every batch.
///
/// # Errors
///
/// Returns [`CoreError::MissingColumn`] if a required column is absent
/// from the table.
pub fn clean_purchases(
    table: &RawTable,
    today: NaiveDate,
) -> Result<(Vec<PurchaseRecord>, PurchaseCleanseReport)> {
    let mut report = PurchaseCleanseReport {
        rows_in: table.len(),
        ..PurchaseCleanseReport::default()
    };

    let [id_col, customer_col, date_col, amount_col] =
        require_columns(table, "purchases", PURCHASE_REQUIRED_COLUMNS)?;
    let product_col = optional_column(table, "purchases", PURCHASE_PRODUCT_COLUMN);

    // First pass: missing-value and amount rules. The percentile must see
    // every row that survives those two rules, including rows a later
    // rule will still drop.
    struct Candidate<'a> {
        id_raw: &'a str,
        customer_raw: &'a str,
        date_raw: &'a str,
        amount: f64,
        product: Option<&'a str>,
    }

    let mut candidates = Vec::new();
    for row in table.rows() {
        let (Some(id_raw), Some(customer_raw), Some(date_raw), Some(amount_raw)) = (
            row[id_col].as_deref(),
            row[customer_col].as_deref(),
            row[date_col].as_deref(),
            row[amount_col].as_deref(),
        ) else {
            report.missing_required += 1;
            continue;
        };

        let Ok(amount) = amount_raw.parse::<f64>() else {
            report.invalid_amount += 1;
            continue;
        };
        if amount < 0.0 {
            report.invalid_amount += 1;
            continue;
        }

        candidates.push(Candidate {
            id_raw,
            customer_raw,
            date_raw,
            amount,
            product: product_col.and_then(|col| row[col].as_deref()),
        });
    }

    let amounts: Vec<f64> = candidates.iter().map(|c| c.amount).collect();
    let cutoff = stats::quantile(&amounts, 0.99).map(|p99| p99 * OUTLIER_P99_MULTIPLIER);

    let oldest_allowed = today - chrono::Duration::days(PURCHASE_DATE_WINDOW_DAYS);

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for candidate in candidates {
        if let Some(cutoff) = cutoff {
            if candidate.amount > cutoff {
                report.outlier_amount += 1;
                continue;
            }
        }

        let Some(purchase_date) = parse_date(candidate.date_raw) else {
            report.invalid_date += 1;
            continue;
        };
        if purchase_date > today || purchase_date < oldest_allowed {
            report.invalid_date += 1;
            continue;
        }

        let (Ok(purchase_id), Ok(customer_id)) = (
            candidate.id_raw.parse::<i64>(),
            candidate.customer_raw.parse::<i64>(),
        ) else {
            report.invalid_key += 1;
            continue;
        };

        if !seen.insert(purchase_id) {
            report.duplicate_key += 1;
            continue;
        }

        records.push(PurchaseRecord {
            purchase_id,
            customer_id,
            purchase_date,
            amount: candidate.amount,
            product: candidate.product.map(ToString::to_string),
        });
    }

    report.rows_out = records.len();
    tracing::info!(
        entity = "purchases",
        rows_in = report.rows_in,
        missing_required = report.missing_required,
        invalid_amount = report.invalid_amount,
        outlier_amount = report.outlier_amount,
        invalid_date = report.invalid_date,
        invalid_key = report.invalid_key,
        duplicate_key = report.duplicate_key,
        rows_out = report.rows_out,
        "cleansing complete"
    );

    Ok((records, report))
}

/// Resolve the indices of required columns, in the order given.
fn require_columns<const N: usize>(
    table: &RawTable,
    entity: &str,
    columns: [&str; N],
) -> Result<[usize; N]> {
    let mut indices = [0usize; N];
    for (slot, column) in indices.iter_mut().zip(columns) {
        *slot = table
            .column_index(column)
            .ok_or_else(|| CoreError::MissingColumn {
                table: entity.to_string(),
                column: column.to_string(),
            })?;
    }
    Ok(indices)
}

/// Resolve an optional column, warning once when it is absent.
fn optional_column(table: &RawTable, entity: &str, column: &str) -> Option<usize> {
    let index = table.column_index(column);
    if index.is_none() {
        tracing::warn!(entity, column, "optional column absent, values default to null");
    }
    index
}

/// Parse a raw date cell, accepting a small set of formats.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(datetime.date());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn customers_table(body: &str) -> RawTable {
        let csv = format!("customer_id,name,email,registration_date,country\n{body}");
        RawTable::from_csv(csv.as_bytes()).unwrap()
    }

    fn purchases_table(body: &str) -> RawTable {
        let csv = format!("purchase_id,customer_id,purchase_date,amount,product\n{body}");
        RawTable::from_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn customers_missing_values_are_dropped() {
        let table = customers_table(
            "1,Ada,ada@example.com,2023-01-15,France\n\
             2,,bob@example.com,2023-02-01,Spain\n\
             3,Cleo,,2023-03-01,Italy\n",
        );

        let (records, report) = clean_customers(&table, today()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(report.missing_required, 2);
        assert_eq!(report.rows_out, 1);
        assert_eq!(records[0].customer_id, 1);
    }

    #[test]
    fn customers_email_must_contain_at() {
        let table = customers_table(
            "1,Ada,ada@example.com,2023-01-15,France\n\
             2,Bob,not-an-email,2023-02-01,Spain\n",
        );

        let (records, report) = clean_customers(&table, today()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(report.invalid_email, 1);
    }

    #[test]
    fn customers_future_and_garbage_dates_are_dropped() {
        let table = customers_table(
            "1,Ada,ada@example.com,2023-01-15,France\n\
             2,Bob,bob@example.com,2031-01-01,Spain\n\
             3,Cleo,cleo@example.com,yesterday,Italy\n",
        );

        let (records, report) = clean_customers(&table, today()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(report.invalid_date, 2);
    }

    #[test]
    fn customers_dedup_keeps_first_occurrence() {
        let table = customers_table(
            "7,First,first@example.com,2023-01-15,France\n\
             7,Second,second@example.com,2023-02-01,Spain\n",
        );

        let (records, report) = clean_customers(&table, today()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "First");
        assert_eq!(report.duplicate_key, 1);
    }

    #[test]
    fn customers_unique_key_invariant_holds() {
        let table = customers_table(
            "1,Ada,ada@example.com,2023-01-15,France\n\
             2,Bob,bob@example.com,2023-02-01,Spain\n\
             1,Ada Again,ada2@example.com,2023-03-01,France\n\
             2,Bob Again,bob2@example.com,2023-04-01,Spain\n",
        );

        let (records, _) = clean_customers(&table, today()).unwrap();

        let mut ids: Vec<i64> = records.iter().map(|r| r.customer_id).collect();
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn customers_without_country_column_survive() {
        let csv = "customer_id,name,email,registration_date\n1,Ada,ada@example.com,2023-01-15\n";
        let table = RawTable::from_csv(csv.as_bytes()).unwrap();

        let (records, _) = clean_customers(&table, today()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].country, None);
    }

    #[test]
    fn customers_missing_required_column_is_an_error() {
        let csv = "customer_id,name,registration_date\n1,Ada,2023-01-15\n";
        let table = RawTable::from_csv(csv.as_bytes()).unwrap();

        let err = clean_customers(&table, today()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::MissingColumn { ref column, .. } if column == "email"
        ));
    }

    #[test]
    fn customers_non_integer_key_is_dropped() {
        let table = customers_table(
            "abc,Ada,ada@example.com,2023-01-15,France\n\
             2,Bob,bob@example.com,2023-02-01,Spain\n",
        );

        let (records, report) = clean_customers(&table, today()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(report.invalid_key, 1);
    }

    #[test]
    fn cleansing_is_deterministic() {
        let table = customers_table(
            "1,Ada,ada@example.com,2023-01-15,France\n\
             1,Dup,dup@example.com,2023-02-01,Spain\n\
             3,Cleo,cleo@example.com,2023-03-01,\n",
        );

        let first = clean_customers(&table, today()).unwrap();
        let second = clean_customers(&table, today()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn purchases_negative_and_garbage_amounts_are_dropped() {
        let table = purchases_table(
            "1,1,2024-01-10,50.0,book\n\
             2,1,2024-01-11,-5.0,book\n\
             3,2,2024-01-12,abc,pen\n",
        );

        let (records, report) = clean_purchases(&table, today()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(report.invalid_amount, 2);
    }

    #[test]
    fn purchases_outliers_are_clipped_at_twice_p99() {
        // Amounts 1..=100 plus 150 and 500. p99 of the batch is 149.5,
        // so the cutoff is 299: 150 stays, 500 goes.
        let mut body = String::new();
        for i in 1..=100 {
            body.push_str(&format!("{i},1,2024-01-10,{i}.0,book\n"));
        }
        body.push_str("101,1,2024-01-10,150.0,book\n");
        body.push_str("102,1,2024-01-10,500.0,book\n");
        let table = purchases_table(&body);

        let (records, report) = clean_purchases(&table, today()).unwrap();

        assert_eq!(report.outlier_amount, 1);
        assert!(records.iter().all(|r| r.amount <= 299.0));
        assert!(records.iter().any(|r| (r.amount - 150.0).abs() < 1e-9));
    }

    #[test]
    fn surviving_amounts_respect_the_outlier_bound() {
        let table = purchases_table(
            "1,1,2024-01-10,10.0,book\n\
             2,1,2024-01-11,20.0,book\n\
             3,2,2024-01-12,30.0,pen\n\
             4,2,2024-01-13,10000.0,pen\n",
        );

        let pre_filter: Vec<f64> = vec![10.0, 20.0, 30.0, 10000.0];
        let bound = stats::quantile(&pre_filter, 0.99).unwrap() * 2.0;

        let (records, _) = clean_purchases(&table, today()).unwrap();

        assert!(!records.is_empty());
        assert!(records.iter().all(|r| r.amount <= bound));
    }

    #[test]
    fn purchases_outside_the_date_window_are_dropped() {
        let table = purchases_table(
            "1,1,2024-01-10,50.0,book\n\
             2,1,2031-01-01,50.0,book\n\
             3,1,2010-01-01,50.0,book\n",
        );

        let (records, report) = clean_purchases(&table, today()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(report.invalid_date, 2);
    }

    #[test]
    fn purchase_on_window_boundary_survives() {
        let boundary = today() - chrono::Duration::days(PURCHASE_DATE_WINDOW_DAYS);
        let body = format!("1,1,{boundary},50.0,book\n");
        let table = purchases_table(&body);

        let (records, report) = clean_purchases(&table, today()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(report.invalid_date, 0);
    }

    #[test]
    fn purchases_dedup_keeps_first_occurrence() {
        let table = purchases_table(
            "9,1,2024-01-10,10.0,book\n\
             9,2,2024-01-11,20.0,pen\n",
        );

        let (records, report) = clean_purchases(&table, today()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].customer_id, 1);
        assert_eq!(report.duplicate_key, 1);
    }

    #[test]
    fn purchases_without_product_column_survive() {
        let csv = "purchase_id,customer_id,purchase_date,amount\n1,1,2024-01-10,50.0\n";
        let table = RawTable::from_csv(csv.as_bytes()).unwrap();

        let (records, _) = clean_purchases(&table, today()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].product, None);
    }

    #[test]
    fn date_formats_are_flexible() {
        assert_eq!(
            parse_date("2024-01-15"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_date("2024/01/15"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_date("2024-01-15 10:30:00"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_date("2024-01-15T10:30:00"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(parse_date("15 January 2024"), None);
    }
}
