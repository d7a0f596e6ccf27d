//! Fixed object keys and collection names across the storage tiers.
//!
//! The platform inherited its external naming from the legacy warehouse,
//! so object keys and collection basenames are French while everything
//! inside the rows is English. Changing them would break every
//! downstream consumer; treat them as frozen interface.

/// Object keys for the two source tables, used in the `sources`,
/// `bronze`, and `silver` buckets.
pub mod source_keys {
    /// Raw customer table.
    pub const CLIENTS: &str = "clients.csv";

    /// Raw purchase table.
    pub const ACHATS: &str = "achats.csv";
}

/// The nine curated tables the pipeline publishes to the gold bucket and
/// mirrors into the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoldTable {
    /// The purchase fact table.
    FactAchats,
    /// Single-row KPI summary.
    Kpis,
    /// Customer dimension.
    DimClients,
    /// Product dimension.
    DimProduits,
    /// Date dimension.
    DimDates,
    /// Daily revenue aggregation.
    AggJour,
    /// Weekly revenue aggregation.
    AggSemaine,
    /// Monthly revenue aggregation.
    AggMois,
    /// Revenue by country.
    CaParPays,
}

impl GoldTable {
    /// Every gold table, in export order.
    pub const ALL: [Self; 9] = [
        Self::FactAchats,
        Self::Kpis,
        Self::DimClients,
        Self::DimProduits,
        Self::DimDates,
        Self::AggJour,
        Self::AggSemaine,
        Self::AggMois,
        Self::CaParPays,
    ];

    /// Table basename, shared by the gold object key and the collection
    /// name.
    #[must_use]
    pub const fn basename(self) -> &'static str {
        match self {
            Self::FactAchats => "fact_achats",
            Self::Kpis => "kpis",
            Self::DimClients => "dim_clients",
            Self::DimProduits => "dim_produits",
            Self::DimDates => "dim_dates",
            Self::AggJour => "agg_jour",
            Self::AggSemaine => "agg_semaine",
            Self::AggMois => "agg_mois",
            Self::CaParPays => "ca_par_pays",
        }
    }

    /// Object key in the gold bucket.
    #[must_use]
    pub fn filename(self) -> String {
        format!("{}.csv", self.basename())
    }

    /// Document-store collection name under the configured prefix.
    #[must_use]
    pub fn collection_name(self, prefix: &str) -> String {
        format!("{prefix}{}", self.basename())
    }

    /// Look a table up by its basename.
    #[must_use]
    pub fn from_basename(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|table| table.basename() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nine_gold_tables() {
        assert_eq!(GoldTable::ALL.len(), 9);
    }

    #[test]
    fn names_follow_the_frozen_layout() {
        assert_eq!(GoldTable::FactAchats.filename(), "fact_achats.csv");
        assert_eq!(GoldTable::Kpis.collection_name("gold_"), "gold_kpis");
        assert_eq!(GoldTable::CaParPays.basename(), "ca_par_pays");
    }

    #[test]
    fn basename_lookup_round_trips() {
        for table in GoldTable::ALL {
            assert_eq!(GoldTable::from_basename(table.basename()), Some(table));
        }
        assert_eq!(GoldTable::from_basename("unknown"), None);
    }
}
