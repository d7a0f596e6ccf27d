//! Temporal and country revenue rollups over the fact table.
//!
//! All rollups compute the same four metrics per group: revenue sum,
//! revenue mean, purchase count, distinct customer count. Temporal rows
//! come out ascending by period label so charting consumers can plot
//! them directly; country rows come out descending by revenue.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::fact::FactRow;

/// Calendar grouping for the temporal aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One group per calendar date.
    Day,
    /// One group per ISO 8601 week.
    Week,
    /// One group per calendar month.
    Month,
}

impl Granularity {
    /// Stable, sortable period label for a date at this granularity.
    ///
    /// Day: `YYYY-MM-DD`. Week: `YYYY-Www` using the ISO week-based
    /// year, so a late-December date can label into the next year.
    /// Month: `YYYY-MM`. All three sort lexicographically in
    /// chronological order.
    #[must_use]
    pub fn label(self, date: NaiveDate) -> String {
        match self {
            Self::Day => date.format("%Y-%m-%d").to_string(),
            Self::Week => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Self::Month => date.format("%Y-%m").to_string(),
        }
    }

    /// Lowercase name, used in logs and stage names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// One group of the temporal aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationRow {
    /// Period label, see [`Granularity::label`].
    pub period: String,

    /// Sum of amounts in the period.
    pub revenue_total: f64,

    /// Mean amount in the period.
    pub revenue_mean: f64,

    /// Number of purchases in the period.
    pub purchase_count: u64,

    /// Distinct customers purchasing in the period.
    pub unique_customer_count: u64,
}

/// One group of the country aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryAggregationRow {
    /// Country name; `None` groups the rows whose fact join found no
    /// customer (or a customer without a country).
    pub country: Option<String>,

    /// Sum of amounts for the country.
    pub revenue_total: f64,

    /// Mean amount for the country.
    pub revenue_mean: f64,

    /// Number of purchases for the country.
    pub purchase_count: u64,

    /// Distinct customers purchasing for the country.
    pub unique_customer_count: u64,
}

#[derive(Default)]
struct Accumulator {
    total: f64,
    count: u64,
    customers: HashSet<i64>,
}

impl Accumulator {
    fn push(&mut self, row: &FactRow) {
        self.total += row.amount;
        self.count += 1;
        self.customers.insert(row.customer_id);
    }

    #[allow(clippy::cast_precision_loss)]
    fn mean(&self) -> f64 {
        self.total / self.count as f64
    }
}

/// Group fact rows by calendar period, ascending by period label.
#[must_use]
pub fn aggregate_by_period(fact: &[FactRow], granularity: Granularity) -> Vec<AggregationRow> {
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for row in fact {
        groups
            .entry(granularity.label(row.purchase_date))
            .or_default()
            .push(row);
    }

    groups
        .into_iter()
        .map(|(period, acc)| AggregationRow {
            period,
            revenue_total: acc.total,
            revenue_mean: acc.mean(),
            purchase_count: acc.count,
            unique_customer_count: acc.customers.len() as u64,
        })
        .collect()
}

/// Group fact rows by country, descending by revenue total.
///
/// The null-country group is surfaced as a row with `country: None`
/// rather than dropped, so revenue from unmatched customers stays
/// visible. Ties order by country name for determinism.
#[must_use]
pub fn aggregate_by_country(fact: &[FactRow]) -> Vec<CountryAggregationRow> {
    let mut groups: HashMap<Option<String>, Accumulator> = HashMap::new();
    for row in fact {
        groups.entry(row.country.clone()).or_default().push(row);
    }

    let mut rows: Vec<CountryAggregationRow> = groups
        .into_iter()
        .map(|(country, acc)| CountryAggregationRow {
            country,
            revenue_total: acc.total,
            revenue_mean: acc.mean(),
            purchase_count: acc.count,
            unique_customer_count: acc.customers.len() as u64,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.revenue_total
            .total_cmp(&a.revenue_total)
            .then_with(|| a.country.cmp(&b.country))
    });
    rows
}
