//! Global summary KPIs over the fact table.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::fact::FactRow;
use crate::stats;

/// Single-row KPI summary of one pipeline run.
///
/// Statistical fields are `None` when the fact table is empty (and the
/// standard deviation additionally needs at least two rows), so the
/// serialized form never carries `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    /// Sum of all purchase amounts.
    pub revenue_total: f64,

    /// Number of fact rows.
    pub purchase_count: u64,

    /// Mean purchase amount.
    pub basket_mean: Option<f64>,

    /// Distinct `customer_id` count over the fact table.
    pub unique_customers: u64,

    /// Mean over customers of each customer's summed spend. This is the
    /// grouped mean, not `revenue_total / unique_customers`; the two only
    /// coincide when every customer has the same purchase count.
    pub revenue_per_customer_mean: Option<f64>,

    /// Month-over-month revenue growth between the last two calendar
    /// months, in percent. `None` when fewer than two distinct months
    /// exist, and also when the prior month's revenue is zero (the
    /// division is undefined and `null` keeps the payload JSON-safe).
    pub growth_rate_pct: Option<f64>,

    /// Median purchase amount.
    pub amount_median: Option<f64>,

    /// Sample standard deviation of purchase amounts.
    pub amount_stddev: Option<f64>,

    /// Smallest purchase amount.
    pub amount_min: Option<f64>,

    /// Largest purchase amount.
    pub amount_max: Option<f64>,
}

/// Compute the KPI summary for a fact table.
#[must_use]
pub fn compute_kpis(fact: &[FactRow]) -> KpiSet {
    let amounts: Vec<f64> = fact.iter().map(|row| row.amount).collect();

    let unique_customers = fact
        .iter()
        .map(|row| row.customer_id)
        .collect::<HashSet<_>>()
        .len() as u64;

    let mut per_customer: HashMap<i64, f64> = HashMap::new();
    for row in fact {
        *per_customer.entry(row.customer_id).or_default() += row.amount;
    }
    let customer_totals: Vec<f64> = per_customer.into_values().collect();

    KpiSet {
        revenue_total: amounts.iter().sum(),
        purchase_count: fact.len() as u64,
        basket_mean: stats::mean(&amounts),
        unique_customers,
        revenue_per_customer_mean: stats::mean(&customer_totals),
        growth_rate_pct: monthly_growth_rate(fact),
        amount_median: stats::median(&amounts),
        amount_stddev: stats::sample_stddev(&amounts),
        amount_min: stats::min(&amounts),
        amount_max: stats::max(&amounts),
    }
}

/// Revenue growth between the last two calendar months, in percent.
///
/// Month labels (`YYYY-MM`) sort lexicographically in chronological
/// order, so the last two map entries are the two most recent months.
fn monthly_growth_rate(fact: &[FactRow]) -> Option<f64> {
    let mut by_month: BTreeMap<String, f64> = BTreeMap::new();
    for row in fact {
        *by_month
            .entry(row.purchase_date.format("%Y-%m").to_string())
            .or_default() += row.amount;
    }

    if by_month.len() < 2 {
        return None;
    }

    let mut recent = by_month.values().rev();
    let last = *recent.next()?;
    let prior = *recent.next()?;

    if prior == 0.0 {
        return None;
    }
    Some((last - prior) / prior * 100.0)
}
