//! # Query Orchestrator
//!
//! Coordinates the entire question-answering pipeline:
//! 1. Retrieve and rank matching products
//! 2. Analyze review sentiment for the top match (cached)
//! 3. Synthesize the answer and evaluate recommendation rules in parallel
//! 4. Compile the final result
//!
//! The only error a caller ever sees is [`PipelineError::NoMatch`]; every
//! downstream failure is absorbed by the units' fallbacks so a query that
//! matched a product always produces an answer.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

use agents::{
    RecommendationDecision, RecommendationUnit, RetrievalUnit, ScoredProduct, SentimentCache,
    SentimentSummary, SentimentUnit, SynthesisUnit,
};
use data_loader::{CatalogIndex, Product};
use gateway::ReasoningGateway;

/// Pipeline tuning knobs with the defaults used by the CLI.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// How many ranked products retrieval keeps.
    pub top_k: usize,
    /// Reviews per gateway batch.
    pub sentiment_batch_size: usize,
    /// Positive-ratio threshold for the recommendation rules.
    pub sentiment_threshold: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            sentiment_batch_size: 3,
            sentiment_threshold: agents::DEFAULT_SENTIMENT_THRESHOLD,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no product in the catalog matches \"{query}\"")]
    NoMatch { query: String },
}

/// Everything the pipeline produced for one query.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub query: String,
    pub product: Product,
    pub ranked: Vec<ScoredProduct>,
    pub sentiment: SentimentSummary,
    pub answer: String,
    pub recommendation: RecommendationDecision,
}

/// Main orchestrator wiring the four units around shared state.
pub struct QueryOrchestrator {
    catalog: Arc<CatalogIndex>,
    retrieval: RetrievalUnit,
    sentiment: SentimentUnit,
    synthesis: SynthesisUnit,
    recommendation: Arc<RecommendationUnit>,
    top_k: usize,
}

impl QueryOrchestrator {
    /// Wire up all units over a shared catalog, gateway, and sentiment cache.
    pub fn new(
        catalog: Arc<CatalogIndex>,
        gateway: Arc<ReasoningGateway>,
        config: PipelineConfig,
    ) -> Self {
        let cache = Arc::new(SentimentCache::new());
        Self {
            retrieval: RetrievalUnit::new(catalog.clone()),
            sentiment: SentimentUnit::new(
                gateway.clone(),
                cache.clone(),
                config.sentiment_batch_size,
            ),
            synthesis: SynthesisUnit::new(gateway),
            recommendation: Arc::new(RecommendationUnit::new(
                catalog.clone(),
                cache,
                config.sentiment_threshold,
            )),
            catalog,
            top_k: config.top_k,
        }
    }

    /// Run the full pipeline for one customer question.
    pub async fn process(&self, query: &str) -> Result<QueryResult, PipelineError> {
        let start_time = Instant::now();

        // Stage 1: retrieval.
        let ranked = self.retrieval.retrieve(query, self.top_k);
        let Some(top) = ranked.first() else {
            info!(query, "No catalog match");
            return Err(PipelineError::NoMatch {
                query: query.to_string(),
            });
        };
        let Some(product) = self.catalog.get_product(&top.product_id).cloned() else {
            // Retrieval only emits catalog ids; treat a miss as no match.
            warn!(product_id = %top.product_id, "Ranked product missing from catalog");
            return Err(PipelineError::NoMatch {
                query: query.to_string(),
            });
        };
        info!(
            "Retrieved {} candidates for {:?}, top match {} (score {:.1})",
            ranked.len(),
            query,
            product.id,
            top.score
        );

        // Stage 2: sentiment for the top match.
        let reviews = self.catalog.reviews_for(&product.id);
        let sentiment = self.sentiment.analyze(&product.id, reviews).await;
        info!(
            "Sentiment for {}: {:.0}% positive over {} reviews ({:?})",
            product.id,
            sentiment.positive_percent(),
            sentiment.review_count,
            sentiment.provenance
        );

        // Stage 3: synthesis and recommendation are independent, so the
        // gateway call overlaps the rule evaluation on a blocking thread.
        let alternatives = ranked[1..].to_vec();
        let recommendation_task = tokio::task::spawn_blocking({
            let unit = self.recommendation.clone();
            let product = product.clone();
            let sentiment = sentiment.clone();
            move || unit.recommend(&product, &sentiment, &alternatives)
        });

        let (answer, recommendation_result) = tokio::join!(
            self.synthesis.answer(query, &product, &sentiment),
            recommendation_task
        );
        let recommendation = recommendation_result.unwrap_or_else(|err| {
            // A panic in the rule evaluation must not take the query down.
            warn!("Recommendation task failed: {err}");
            RecommendationDecision::confirmed()
        });

        info!(
            "Pipeline finished for {:?} in {:?} (recommendation: {:?})",
            query,
            start_time.elapsed(),
            recommendation.reason
        );

        Ok(QueryResult {
            query: query.to_string(),
            product,
            ranked,
            sentiment,
            answer,
            recommendation,
        })
    }

    /// Ranked retrieval without the rest of the pipeline.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<ScoredProduct> {
        self.retrieval.retrieve(query, top_k)
    }

    /// Sentiment summary for one product id, `None` for unknown ids.
    pub async fn sentiment_for(&self, product_id: &str) -> Option<SentimentSummary> {
        self.catalog.get_product(product_id)?;
        let reviews = self.catalog.reviews_for(product_id);
        Some(self.sentiment.analyze(product_id, reviews).await)
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }
}
