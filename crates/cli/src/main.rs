use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use agents::{Provenance, ReasonCode, SentimentSummary};
use data_loader::{sample_catalog, CatalogIndex};
use gateway::{GatewayConfig, HttpBackend, ReasoningGateway};
use server::{PipelineConfig, PipelineError, QueryOrchestrator};

/// ShopScout - Product Question Answering Assistant
#[derive(Parser)]
#[command(name = "shop-scout")]
#[command(about = "Answers product questions from catalog data and customer reviews", long_about = None)]
struct Cli {
    /// Path to a directory with products.csv, reviews.csv and optional
    /// inventory.csv; falls back to the built-in sample catalog
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Reasoning service endpoint (REASONING_SERVICE_URL overrides)
    #[arg(long, default_value = "http://localhost:8000/v1/complete")]
    service_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question about a product
    Ask {
        /// The question, e.g. "is the gaming laptop good for video editing?"
        query: String,

        /// Number of ranked candidates the pipeline considers
        #[arg(long, default_value = "3")]
        top_k: usize,
    },

    /// Rank catalog products for a query without running the full pipeline
    Search {
        /// Search terms
        query: String,

        /// Number of results to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show the sentiment summary for one product
    Reviews {
        /// Product id, e.g. P001
        product_id: String,
    },

    /// List the catalog grouped by category
    Catalog,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let catalog = Arc::new(load_catalog(&cli.data_dir)?);
    let mut config = PipelineConfig::default();
    if let Commands::Ask { top_k, .. } = &cli.command {
        config.top_k = (*top_k).max(1);
    }
    let orchestrator = build_orchestrator(catalog.clone(), &cli, config);

    match cli.command {
        Commands::Ask { query, .. } => handle_ask(&orchestrator, &query).await?,
        Commands::Search { query, limit } => handle_search(&orchestrator, &query, limit),
        Commands::Reviews { product_id } => handle_reviews(&orchestrator, &product_id).await,
        Commands::Catalog => handle_catalog(&catalog),
    }

    Ok(())
}

/// Load CSVs from the data directory, or the built-in sample catalog when
/// the directory has no product file.
fn load_catalog(data_dir: &PathBuf) -> Result<CatalogIndex> {
    if data_dir.join("products.csv").exists() {
        let start = Instant::now();
        let catalog = CatalogIndex::load_from_dir(data_dir)
            .with_context(|| format!("Failed to load catalog from {}", data_dir.display()))?;
        let (products, reviews) = catalog.counts();
        println!(
            "{} Loaded {} products and {} reviews in {:?}",
            "✓".green(),
            products,
            reviews,
            start.elapsed()
        );
        Ok(catalog)
    } else {
        println!(
            "No catalog at {}, using the built-in sample catalog",
            data_dir.display()
        );
        Ok(sample_catalog())
    }
}

fn build_orchestrator(
    catalog: Arc<CatalogIndex>,
    cli: &Cli,
    config: PipelineConfig,
) -> QueryOrchestrator {
    let endpoint =
        std::env::var("REASONING_SERVICE_URL").unwrap_or_else(|_| cli.service_url.clone());
    let api_key = std::env::var("REASONING_API_KEY").ok();
    let backend = HttpBackend::new(endpoint, api_key);
    let gateway = Arc::new(ReasoningGateway::new(
        Box::new(backend),
        GatewayConfig::default(),
    ));

    QueryOrchestrator::new(catalog, gateway, config)
}

/// Handle the 'ask' command
async fn handle_ask(orchestrator: &QueryOrchestrator, query: &str) -> Result<()> {
    let start = Instant::now();
    match orchestrator.process(query).await {
        Ok(result) => {
            println!(
                "{}",
                format!("{} (${:.2})", result.product.title, result.product.price)
                    .bold()
                    .blue()
            );
            print_sentiment_line(&result.sentiment);
            println!();
            println!("{}", result.answer);

            match (&result.recommendation.alternative, result.recommendation.reason) {
                (Some(alternative), reason) => {
                    let label = match reason {
                        ReasonCode::OutOfStock => "it is out of stock",
                        ReasonCode::LowSentiment => "reviews are unfavorable",
                        ReasonCode::Confirmed => "of a better overall fit",
                    };
                    let title = orchestrator
                        .catalog()
                        .get_product(alternative)
                        .map(|p| p.title.clone())
                        .unwrap_or_else(|| alternative.clone());
                    println!();
                    println!(
                        "{} Consider {} instead, because {}.",
                        "→".yellow(),
                        title.bold(),
                        label
                    );
                }
                (None, ReasonCode::OutOfStock) => {
                    println!();
                    println!("{} Out of stock, and no alternative is available.", "!".red());
                }
                (None, _) => {}
            }
            println!();
            println!("({:?})", start.elapsed());
        }
        Err(PipelineError::NoMatch { query }) => {
            println!("{} No product matches \"{}\".", "✗".red(), query);
        }
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(orchestrator: &QueryOrchestrator, query: &str, limit: usize) {
    let results = orchestrator.search(query, limit);
    if results.is_empty() {
        println!("{} No product matches \"{}\".", "✗".red(), query);
        return;
    }

    println!("{}", format!("Search results for '{query}':").bold().blue());
    for scored in &results {
        let Some(product) = orchestrator.catalog().get_product(&scored.product_id) else {
            continue;
        };
        let stock = if product.in_stock() {
            format!("{} in stock", product.stock).green()
        } else {
            "out of stock".red()
        };
        println!(
            "{}. {} [{}] ${:.2} ({}) - score {:.1}",
            (scored.rank + 1).to_string().green(),
            product.title,
            product.category,
            product.price,
            stock,
            scored.score
        );
    }
}

/// Handle the 'reviews' command
async fn handle_reviews(orchestrator: &QueryOrchestrator, product_id: &str) {
    let Some(summary) = orchestrator.sentiment_for(product_id).await else {
        println!("{} Unknown product id \"{}\".", "✗".red(), product_id);
        return;
    };
    let title = orchestrator
        .catalog()
        .get_product(product_id)
        .map(|p| p.title.clone())
        .unwrap_or_default();

    println!("{}", format!("{title} ({product_id})").bold().blue());
    print_sentiment_line(&summary);
    if !summary.pros.is_empty() {
        println!("Pros:");
        for pro in &summary.pros {
            println!("  {} {}", "+".green(), pro);
        }
    }
    if !summary.cons.is_empty() {
        println!("Cons:");
        for con in &summary.cons {
            println!("  {} {}", "-".red(), con);
        }
    }
}

/// Handle the 'catalog' command
fn handle_catalog(catalog: &CatalogIndex) {
    let (products, reviews) = catalog.counts();
    println!(
        "{}",
        format!("{products} products, {reviews} reviews").bold()
    );
    for category in catalog.categories() {
        println!("{}", category.bold().blue());
        for product in catalog
            .products()
            .iter()
            .filter(|p| p.category == category)
        {
            let stock = if product.in_stock() {
                format!("{} in stock", product.stock).normal()
            } else {
                "out of stock".red()
            };
            println!(
                "  {} {} ${:.2} ({}, {} reviews)",
                product.id.green(),
                product.title,
                product.price,
                stock,
                catalog.reviews_for(&product.id).len()
            );
        }
    }
}

fn print_sentiment_line(summary: &SentimentSummary) {
    if summary.review_count == 0 {
        println!("No customer reviews yet");
        return;
    }
    let provenance = match summary.provenance {
        Provenance::FromCache => "cached",
        Provenance::Computed => "analyzed",
        Provenance::Fallback => "from ratings only",
    };
    println!(
        "{} reviews, {:.0}% positive, {:.1}/5 average ({provenance})",
        summary.review_count,
        summary.positive_percent(),
        summary.avg_rating
    );
}
