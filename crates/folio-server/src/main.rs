//! Folio Server binary.

use std::time::Instant;

use anyhow::Context;
use folio_git::Aggregator;
use folio_server::metrics::{init_metrics, record_aggregation};
use folio_server::{AppState, Settings, run_server};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load().context("failed to load settings")?;
    let addr = settings
        .server
        .addr()
        .context("invalid server host or port")?;

    tracing::info!("Starting Folio Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        sources = settings.aggregator.sources().len(),
        cache_dir = %settings.aggregator.cache_dir().display(),
        fetch = settings.aggregator.fetch(),
        "Aggregating content"
    );

    let prometheus_handle = init_metrics().context("failed to install metrics recorder")?;

    let started = Instant::now();
    let aggregator = Aggregator::new(settings.aggregator)?;
    let aggregation = aggregator.run().await?;
    record_aggregation(&aggregation, started.elapsed());

    for warning in &aggregation.warnings {
        tracing::warn!(%warning, "Aggregation warning");
    }

    let state = AppState::from_aggregation(aggregation);
    run_server(addr, state, prometheus_handle).await?;

    Ok(())
}
