//! Result types shared by the analysis units.

use data_loader::ProductId;
use serde::{Deserialize, Serialize};

/// A catalog product paired with its relevance score for one query.
///
/// `rank` is the zero-based position in the ranked result list, so the
/// top match always has `rank == 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredProduct {
    pub product_id: ProductId,
    pub score: f32,
    pub rank: usize,
}

/// Where a sentiment summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    /// Served from the in-memory cache without touching the gateway.
    FromCache,
    /// At least one review batch was analyzed by the reasoning service.
    Computed,
    /// Every batch failed; the summary is derived from star ratings only.
    Fallback,
}

/// Aggregated review sentiment for one product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub product_id: ProductId,
    pub review_count: usize,
    /// Mean star rating, 0.0 when the product has no reviews.
    pub avg_rating: f32,
    pub positive_ratio: f32,
    pub negative_ratio: f32,
    pub neutral_ratio: f32,
    /// Distinct praised aspects, in review order.
    pub pros: Vec<String>,
    /// Distinct criticized aspects, in review order.
    pub cons: Vec<String>,
    pub provenance: Provenance,
}

impl SentimentSummary {
    /// Positive share expressed as a percentage, handy for display.
    pub fn positive_percent(&self) -> f32 {
        self.positive_ratio * 100.0
    }
}

/// Why a recommendation decision turned out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReasonCode {
    OutOfStock,
    LowSentiment,
    Confirmed,
}

/// Outcome of the alternative-suggestion rules for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationDecision {
    /// True only when an actual alternative is being suggested. A triggering
    /// condition with no viable candidate leaves this false and records the
    /// trigger in `reason`.
    pub needs_alternative: bool,
    pub alternative: Option<ProductId>,
    pub reason: ReasonCode,
}

impl RecommendationDecision {
    pub fn confirmed() -> Self {
        Self {
            needs_alternative: false,
            alternative: None,
            reason: ReasonCode::Confirmed,
        }
    }
}
