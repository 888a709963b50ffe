//! orderscope - a single-page analytics dashboard over a static order dataset
//!
//! Loads an e-commerce order CSV once at startup and serves:
//! - Summary metrics for a caller-chosen date range
//! - Daily order, category sales and product RFM charts

mod config;
mod dataset;
mod web;

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before any other initialization)
    let _ = dotenvy::dotenv();

    // Initialize logging based on LOG_FORMAT env var
    // Use LOG_FORMAT=gcp for structured GCP Cloud Logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "gcp" {
        tracing_subscriber::registry()
            .with(tracing_subscriber::filter::LevelFilter::INFO)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .init();
    }

    info!("Starting orderscope...");

    // Load configuration
    let config = config::Config::load()?;
    info!("Configuration loaded");

    // Load the dataset; a missing file or malformed schema is fatal
    let dataset = Arc::new(dataset::Dataset::load(&config.dataset.path)?);
    match dataset.date_bounds() {
        Some((min, max)) => info!(
            "Dataset loaded: {} rows spanning {} - {}",
            dataset.len(),
            min,
            max
        ),
        None => info!("Dataset loaded: empty"),
    }

    // Warm the cache for the default full-range view
    web::warm_cache(dataset.clone()).await;

    // Start web server (blocking)
    web::start_server(&config, dataset).await?;

    Ok(())
}
