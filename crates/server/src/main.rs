//! Simple test harness for the query orchestrator.
//!
//! Runs the end-to-end pipeline over the built-in sample catalog against a
//! live reasoning service, which is expected at REASONING_SERVICE_URL
//! (default http://localhost:8000/v1/complete).

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use data_loader::sample_catalog;
use gateway::{GatewayConfig, HttpBackend, ReasoningGateway};
use server::{PipelineConfig, QueryOrchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info,server=debug,agents=debug,gateway=debug")
        .init();

    info!("Starting shop-scout server test harness");

    let catalog = Arc::new(sample_catalog());
    let (products, reviews) = catalog.counts();
    info!("Loaded sample catalog: {products} products, {reviews} reviews");

    let endpoint = std::env::var("REASONING_SERVICE_URL")
        .unwrap_or_else(|_| "http://localhost:8000/v1/complete".to_string());
    let api_key = std::env::var("REASONING_API_KEY").ok();
    info!("Using reasoning service at {endpoint}");

    let backend = HttpBackend::new(endpoint, api_key);
    let gateway = Arc::new(ReasoningGateway::new(
        Box::new(backend),
        GatewayConfig::default(),
    ));
    let orchestrator = QueryOrchestrator::new(catalog, gateway, PipelineConfig::default());

    for query in [
        "Is the gaming laptop good for video editing?",
        "budget smartphone",
        "best laptop for creative work",
    ] {
        info!("Query: {query}");
        match orchestrator.process(query).await {
            Ok(result) => {
                info!(
                    "Top match: {} (${:.2}), {:.0}% positive over {} reviews",
                    result.product.title,
                    result.product.price,
                    result.sentiment.positive_percent(),
                    result.sentiment.review_count
                );
                info!("Answer: {}", result.answer);
                if let Some(alternative) = &result.recommendation.alternative {
                    info!(
                        "Suggested alternative: {alternative} ({:?})",
                        result.recommendation.reason
                    );
                }
            }
            Err(err) => info!("No answer: {err}"),
        }
    }

    Ok(())
}
