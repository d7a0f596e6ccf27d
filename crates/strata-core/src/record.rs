//! Cleansed record types for the two source entities.
//!
//! These are the typed shapes that leave the Record Cleanser: every field
//! has already been validated, so invariants here are guaranteed by
//! construction (unique keys, parseable dates, non-negative amounts).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Source Columns
// ============================================================================

/// Columns that must be present and non-null for a customer row to survive.
pub const CUSTOMER_REQUIRED_COLUMNS: [&str; 4] =
    ["customer_id", "name", "email", "registration_date"];

/// Optional customer column carried through when present.
pub const CUSTOMER_COUNTRY_COLUMN: &str = "country";

/// Columns that must be present and non-null for a purchase row to survive.
pub const PURCHASE_REQUIRED_COLUMNS: [&str; 4] =
    ["purchase_id", "customer_id", "purchase_date", "amount"];

/// Optional purchase column carried through when present.
pub const PURCHASE_PRODUCT_COLUMN: &str = "product";

/// A cleansed customer row.
///
/// Invariant: after cleansing there is exactly one record per
/// `customer_id`, the email contains `@`, and the registration date is
/// not in the future.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Natural key, unique after cleansing.
    pub customer_id: i64,

    /// Customer display name.
    pub name: String,

    /// Contact email, guaranteed to contain `@`.
    pub email: String,

    /// Signup date, `YYYY-MM-DD`, never in the future.
    pub registration_date: NaiveDate,

    /// Country of residence. The source column is optional, so rows
    /// without it survive cleansing with no country.
    pub country: Option<String>,
}

/// A cleansed purchase row.
///
/// Invariant: after cleansing there is exactly one record per
/// `purchase_id`, the amount is non-negative and below the per-batch
/// outlier cutoff, and the date falls inside the allowed window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// Natural key, unique after cleansing.
    pub purchase_id: i64,

    /// Foreign key into the customer table. May have no match there;
    /// the fact join keeps such rows with nulled customer attributes.
    pub customer_id: i64,

    /// Purchase date, `YYYY-MM-DD`, within the allowed window.
    pub purchase_date: NaiveDate,

    /// Purchase amount. Non-negative, outlier-clipped per batch.
    pub amount: f64,

    /// Product label. The source column is optional.
    pub product: Option<String>,
}
