//! Alternative-product recommendation rules.
//!
//! Three rules evaluated in a fixed order, first match wins:
//! 1. Product out of stock: suggest the best-ranked in-stock alternative.
//! 2. Positive sentiment below the threshold: suggest the best-ranked
//!    alternative with better cached sentiment, or the top alternative when
//!    no cached comparison exists.
//! 3. Otherwise confirm the product as-is.
//!
//! A rule that triggers without a viable candidate still reports its reason
//! but suggests nothing, rather than inventing a suggestion.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::cache::SentimentCache;
use crate::types::{ReasonCode, RecommendationDecision, ScoredProduct, SentimentSummary};
use data_loader::{CatalogIndex, Product};

/// Default positive-ratio threshold below which alternatives are suggested.
pub const DEFAULT_SENTIMENT_THRESHOLD: f32 = 0.70;

pub struct RecommendationUnit {
    catalog: Arc<CatalogIndex>,
    cache: Arc<SentimentCache>,
    threshold: f32,
}

impl RecommendationUnit {
    pub fn new(catalog: Arc<CatalogIndex>, cache: Arc<SentimentCache>, threshold: f32) -> Self {
        Self {
            catalog,
            cache,
            threshold,
        }
    }

    /// Apply the rules to the top-ranked product. `alternatives` is the rest
    /// of the ranked retrieval list, best first. Pure and synchronous; only
    /// already-cached sentiment is consulted, never recomputed.
    pub fn recommend(
        &self,
        product: &Product,
        sentiment: &SentimentSummary,
        alternatives: &[ScoredProduct],
    ) -> RecommendationDecision {
        let candidates: Vec<&ScoredProduct> = alternatives
            .iter()
            .filter(|alt| alt.product_id != product.id)
            .collect();

        // Rule 1: availability.
        if !product.in_stock() {
            let in_stock = candidates
                .par_iter()
                .find_first(|alt| {
                    self.catalog
                        .get_product(&alt.product_id)
                        .map(Product::in_stock)
                        .unwrap_or(false)
                })
                .map(|alt| alt.product_id.clone());

            debug!(
                product_id = %product.id,
                alternative = in_stock.as_deref().unwrap_or("none"),
                "Product out of stock"
            );
            return RecommendationDecision {
                needs_alternative: in_stock.is_some(),
                alternative: in_stock,
                reason: ReasonCode::OutOfStock,
            };
        }

        // Rule 2: sentiment.
        if sentiment.positive_ratio < self.threshold {
            let better_cached = candidates
                .par_iter()
                .find_first(|alt| {
                    self.cache
                        .peek(&alt.product_id)
                        .map(|cached| cached.positive_ratio > sentiment.positive_ratio)
                        .unwrap_or(false)
                })
                .map(|alt| alt.product_id.clone());

            let pick = better_cached.or_else(|| candidates.first().map(|alt| alt.product_id.clone()));
            debug!(
                product_id = %product.id,
                positive_ratio = sentiment.positive_ratio,
                alternative = pick.as_deref().unwrap_or("none"),
                "Positive sentiment below threshold"
            );
            return RecommendationDecision {
                needs_alternative: pick.is_some(),
                alternative: pick,
                reason: ReasonCode::LowSentiment,
            };
        }

        // Rule 3: nothing to flag.
        RecommendationDecision::confirmed()
    }
}
