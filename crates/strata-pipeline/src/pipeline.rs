//! Stage orchestration across the storage tiers.
//!
//! [`Pipeline::run`] sequences the full medallion flow. Every stage
//! reads its inputs from the tier the previous stage published, so each
//! stage is independently re-runnable and the retry wrapper can rerun
//! one stage without help from the others.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use ulid::Ulid;

use strata_core::{
    aggregate_by_country, aggregate_by_period, build_date_dimension, build_fact,
    build_product_dimension, clean_customers, clean_purchases, compute_kpis, decode_rows,
    encode_rows, source_keys, AggregationRow, CountryAggregationRow, CustomerCleanseReport,
    CustomerRecord, DimDate, DimProduct, FactRow, GoldTable, Granularity, KpiSet,
    PurchaseCleanseReport, PurchaseRecord, RawTable, RefreshMetadataRecord,
};
use strata_store::{DocumentStore, ObjectStore};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::retry::run_with_retry;

/// Counts reported by a completed pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// ULID identifying the run in logs.
    pub run_id: String,

    /// Customer cleansing counts.
    pub customers: CustomerCleanseReport,

    /// Purchase cleansing counts.
    pub purchases: PurchaseCleanseReport,

    /// Rows in the purchase fact table.
    pub fact_rows: u64,

    /// Gold tables mirrored into the document store.
    pub tables_exported: u64,

    /// Documents written across all mirrored collections.
    pub documents_exported: u64,
}

/// The batch pipeline over one object store and one document store.
pub struct Pipeline {
    objects: Arc<dyn ObjectStore>,
    documents: Arc<dyn DocumentStore>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline over the given stores.
    #[must_use]
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        documents: Arc<dyn DocumentStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            objects,
            documents,
            config,
        }
    }

    /// Run the full pipeline: ingest, cleanse, transform, export.
    ///
    /// Stages run under the configured retry budget. Transient store
    /// failures are retried with exponential backoff; data-quality and
    /// environment errors abort the run immediately.
    ///
    /// # Errors
    ///
    /// Returns the first non-transient error, or
    /// [`PipelineError::StageFailed`] when a stage exhausts its budget.
    pub async fn run(&self) -> Result<RunSummary> {
        let run_id = Ulid::new().to_string();
        let today = Utc::now().date_naive();
        let retry = self.config.retry;

        tracing::info!(run_id = %run_id, "pipeline run starting");

        self.prepare_buckets().await?;

        run_with_retry(&retry, "ingest", || self.ingest()).await?;

        let customers =
            run_with_retry(&retry, "cleanse_customers", || self.cleanse_customers(today)).await?;
        let purchases =
            run_with_retry(&retry, "cleanse_purchases", || self.cleanse_purchases(today)).await?;

        let fact_rows = run_with_retry(&retry, "build_gold", || self.build_gold()).await?;

        let mut documents_exported = 0;
        for table in GoldTable::ALL {
            documents_exported +=
                run_with_retry(&retry, table.basename(), || self.export_table(table)).await?;
        }

        let summary = RunSummary {
            run_id,
            customers,
            purchases,
            fact_rows,
            tables_exported: GoldTable::ALL.len() as u64,
            documents_exported,
        };

        tracing::info!(
            run_id = %summary.run_id,
            customers_out = summary.customers.rows_out,
            purchases_out = summary.purchases.rows_out,
            fact_rows = summary.fact_rows,
            documents = summary.documents_exported,
            "pipeline run complete"
        );

        Ok(summary)
    }

    /// Create the managed buckets. The sources bucket is deliberately
    /// excluded; its absence is an environment problem the run should
    /// surface, not paper over.
    async fn prepare_buckets(&self) -> Result<()> {
        for bucket in [
            &self.config.bronze_bucket,
            &self.config.silver_bucket,
            &self.config.gold_bucket,
        ] {
            self.objects.make_bucket(bucket).await?;
        }
        Ok(())
    }

    /// Copy the raw source tables into the bronze tier verbatim.
    async fn ingest(&self) -> Result<()> {
        for key in [source_keys::CLIENTS, source_keys::ACHATS] {
            let data = self.objects.get(&self.config.sources_bucket, key).await?;
            self.objects
                .put(&self.config.bronze_bucket, key, data)
                .await?;
            tracing::info!(key, "source ingested into bronze");
        }
        Ok(())
    }

    async fn cleanse_customers(&self, today: NaiveDate) -> Result<CustomerCleanseReport> {
        let data = self
            .objects
            .get(&self.config.bronze_bucket, source_keys::CLIENTS)
            .await?;
        let table = RawTable::from_csv(&data)?;
        let (records, report) = clean_customers(&table, today)?;

        let encoded = encode_rows(&records)?;
        self.objects
            .put(
                &self.config.silver_bucket,
                source_keys::CLIENTS,
                Bytes::from(encoded),
            )
            .await?;
        Ok(report)
    }

    async fn cleanse_purchases(&self, today: NaiveDate) -> Result<PurchaseCleanseReport> {
        let data = self
            .objects
            .get(&self.config.bronze_bucket, source_keys::ACHATS)
            .await?;
        let table = RawTable::from_csv(&data)?;
        let (records, report) = clean_purchases(&table, today)?;

        let encoded = encode_rows(&records)?;
        self.objects
            .put(
                &self.config.silver_bucket,
                source_keys::ACHATS,
                Bytes::from(encoded),
            )
            .await?;
        Ok(report)
    }

    /// Build every curated table from the silver tier and publish them
    /// to the gold bucket. Returns the fact row count.
    async fn build_gold(&self) -> Result<u64> {
        let customers: Vec<CustomerRecord> = self.load_silver(source_keys::CLIENTS).await?;
        let purchases: Vec<PurchaseRecord> = self.load_silver(source_keys::ACHATS).await?;

        let fact = build_fact(&customers, &purchases);
        let kpis = compute_kpis(&fact);
        let products = build_product_dimension(&fact);
        let dates = build_date_dimension(&fact);
        let daily = aggregate_by_period(&fact, Granularity::Day);
        let weekly = aggregate_by_period(&fact, Granularity::Week);
        let monthly = aggregate_by_period(&fact, Granularity::Month);
        let countries = aggregate_by_country(&fact);

        self.put_gold(GoldTable::FactAchats, &fact).await?;
        self.put_gold(GoldTable::Kpis, std::slice::from_ref(&kpis))
            .await?;
        self.put_gold(GoldTable::DimClients, &customers).await?;
        self.put_gold(GoldTable::DimProduits, &products).await?;
        self.put_gold(GoldTable::DimDates, &dates).await?;
        self.put_gold(GoldTable::AggJour, &daily).await?;
        self.put_gold(GoldTable::AggSemaine, &weekly).await?;
        self.put_gold(GoldTable::AggMois, &monthly).await?;
        self.put_gold(GoldTable::CaParPays, &countries).await?;

        tracing::info!(
            fact_rows = fact.len(),
            products = products.len(),
            dates = dates.len(),
            "gold tier built"
        );

        Ok(fact.len() as u64)
    }

    /// Mirror one gold table into its document collection, stamping the
    /// write window into the metadata collection.
    async fn export_table(&self, table: GoldTable) -> Result<u64> {
        let data = self
            .objects
            .get(&self.config.gold_bucket, &table.filename())
            .await?;
        let documents = decode_documents(table, &data)?;
        let collection = table.collection_name(&self.config.collection_prefix);

        let write_start = Utc::now();
        self.documents.replace_all(&collection, &documents).await?;
        let write_end = Utc::now();

        let record = RefreshMetadataRecord::new(
            collection.clone(),
            write_start,
            write_end,
            documents.len() as u64,
        );
        self.documents
            .append_metadata(&self.config.metadata_collection, &record)
            .await?;

        tracing::info!(
            collection,
            documents = documents.len(),
            duration_seconds = record.duration_seconds,
            "table exported"
        );

        Ok(documents.len() as u64)
    }

    async fn load_silver<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let data = self.objects.get(&self.config.silver_bucket, key).await?;
        Ok(decode_rows(&data)?)
    }

    async fn put_gold<T: Serialize>(&self, table: GoldTable, rows: &[T]) -> Result<()> {
        let encoded = encode_rows(rows)?;
        self.objects
            .put(
                &self.config.gold_bucket,
                &table.filename(),
                Bytes::from(encoded),
            )
            .await?;
        Ok(())
    }
}

/// Decode one gold CSV into JSON documents, typed per table.
fn decode_documents(table: GoldTable, data: &[u8]) -> Result<Vec<Value>> {
    match table {
        GoldTable::FactAchats => to_documents(&decode_rows::<FactRow>(data)?),
        GoldTable::Kpis => to_documents(&decode_rows::<KpiSet>(data)?),
        GoldTable::DimClients => to_documents(&decode_rows::<CustomerRecord>(data)?),
        GoldTable::DimProduits => to_documents(&decode_rows::<DimProduct>(data)?),
        GoldTable::DimDates => to_documents(&decode_rows::<DimDate>(data)?),
        GoldTable::AggJour | GoldTable::AggSemaine | GoldTable::AggMois => {
            to_documents(&decode_rows::<AggregationRow>(data)?)
        }
        GoldTable::CaParPays => to_documents(&decode_rows::<CountryAggregationRow>(data)?),
    }
}

fn to_documents<T: Serialize>(rows: &[T]) -> Result<Vec<Value>> {
    rows.iter()
        .map(|row| serde_json::to_value(row).map_err(PipelineError::from))
        .collect()
}
