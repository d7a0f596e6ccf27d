//! Strata analytics API server.

use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use strata_service::{create_router, AppState, ServiceConfig};
use strata_store::{DocumentStore, RocksDocumentStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,strata_service=debug,strata_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env();
    tracing::info!(data_dir = %config.data_dir, "opening document store");

    let store: Arc<dyn DocumentStore> = Arc::new(RocksDocumentStore::open(&config.data_dir)?);
    let listen_addr = config.listen_addr.clone();

    let state = AppState::new(store, config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "strata service listening");

    axum::serve(listener, app).await?;

    Ok(())
}
