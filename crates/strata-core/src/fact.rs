//! Fact table construction.
//!
//! The fact table is the left join of purchases onto customers by
//! `customer_id`: every purchase row survives, enriched with customer
//! attributes when a match exists and nulls when it does not.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::{CustomerRecord, PurchaseRecord};

/// One row of the fact table: a purchase plus its customer attributes.
///
/// Customer fields are `None` for purchases whose `customer_id` has no
/// match in the cleaned customer table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRow {
    /// Purchase natural key.
    pub purchase_id: i64,

    /// Customer foreign key, matched or not.
    pub customer_id: i64,

    /// Purchase date.
    pub purchase_date: NaiveDate,

    /// Purchase amount.
    pub amount: f64,

    /// Product label, if the source row carried one.
    pub product: Option<String>,

    /// Customer name, when the join matched.
    pub customer_name: Option<String>,

    /// Customer email, when the join matched.
    pub email: Option<String>,

    /// Customer registration date, when the join matched.
    pub registration_date: Option<NaiveDate>,

    /// Customer country, when the join matched and the customer had one.
    pub country: Option<String>,
}

/// Left-join purchases onto customers by `customer_id`.
///
/// The output has exactly one row per purchase, in purchase order.
/// Cleansing guarantees `customer_id` is unique in the customer table,
/// so the join can never duplicate a purchase row.
#[must_use]
pub fn build_fact(customers: &[CustomerRecord], purchases: &[PurchaseRecord]) -> Vec<FactRow> {
    let by_id: HashMap<i64, &CustomerRecord> =
        customers.iter().map(|c| (c.customer_id, c)).collect();

    purchases
        .iter()
        .map(|purchase| {
            let customer = by_id.get(&purchase.customer_id);
            FactRow {
                purchase_id: purchase.purchase_id,
                customer_id: purchase.customer_id,
                purchase_date: purchase.purchase_date,
                amount: purchase.amount,
                product: purchase.product.clone(),
                customer_name: customer.map(|c| c.name.clone()),
                email: customer.map(|c| c.email.clone()),
                registration_date: customer.map(|c| c.registration_date),
                country: customer.and_then(|c| c.country.clone()),
            }
        })
        .collect()
}
