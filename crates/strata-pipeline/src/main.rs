//! Strata pipeline entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use strata_pipeline::{seed_sources, Pipeline, PipelineConfig};
use strata_store::{DocumentStore, LocalObjectStore, ObjectStore, RocksDocumentStore};

#[derive(Parser)]
#[command(
    name = "strata-pipeline",
    about = "Layered ELT pipeline for purchase analytics",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the pipeline end to end: ingest, cleanse, transform, export.
    Run,
    /// Upload local source CSVs into the sources bucket.
    Seed {
        /// Directory containing the raw CSV tables.
        #[arg(long, env = "SOURCE_DIR")]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,strata_pipeline=debug,strata_core=debug,strata_store=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env();

    match cli.command {
        Command::Run => {
            tracing::info!(
                object_root = %config.object_root,
                document_db = %config.document_db_path,
                "opening stores"
            );

            let objects: Arc<dyn ObjectStore> =
                Arc::new(LocalObjectStore::new(&config.object_root));
            let documents: Arc<dyn DocumentStore> =
                Arc::new(RocksDocumentStore::open(&config.document_db_path)?);

            let pipeline = Pipeline::new(objects, documents, config);
            let summary = pipeline.run().await?;

            tracing::info!(
                run_id = %summary.run_id,
                customers_out = summary.customers.rows_out,
                purchases_out = summary.purchases.rows_out,
                fact_rows = summary.fact_rows,
                tables = summary.tables_exported,
                documents = summary.documents_exported,
                "pipeline finished"
            );
        }
        Command::Seed { dir } => {
            let objects = LocalObjectStore::new(&config.object_root);
            let dir = dir.unwrap_or_else(|| PathBuf::from(&config.source_dir));

            let uploaded = seed_sources(&objects, &config.sources_bucket, &dir).await?;
            tracing::info!(uploaded, "seed complete");
        }
    }

    Ok(())
}
