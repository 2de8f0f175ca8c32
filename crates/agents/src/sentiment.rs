//! Review sentiment analysis with caching and rating fallback.
//!
//! For an uncached product the unit splits the reviews into fixed-size
//! batches, sends every batch through the gateway concurrently, and merges
//! the per-batch results positionally. A batch that fails for any reason is
//! replaced by rating-derived labels for exactly its reviews, so one bad
//! batch never poisons the others. The finished summary lands in the shared
//! cache and later requests for the same product are served from there.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::cache::SentimentCache;
use crate::types::{Provenance, SentimentSummary};
use data_loader::Review;
use gateway::{ReasoningGateway, ReviewInput, SentimentLabel};

pub struct SentimentUnit {
    gateway: Arc<ReasoningGateway>,
    cache: Arc<SentimentCache>,
    batch_size: usize,
}

impl SentimentUnit {
    pub fn new(gateway: Arc<ReasoningGateway>, cache: Arc<SentimentCache>, batch_size: usize) -> Self {
        Self {
            gateway,
            cache,
            batch_size: batch_size.max(1),
        }
    }

    /// Sentiment summary for one product, cached after the first computation.
    ///
    /// Concurrent calls for the same uncached product coalesce: one caller
    /// computes, the rest await the same cell. This method never fails; when
    /// the gateway is unusable the summary is built from star ratings alone
    /// and marked [`Provenance::Fallback`].
    #[instrument(skip(self, reviews), fields(review_count = reviews.len()))]
    pub async fn analyze(&self, product_id: &str, reviews: &[Review]) -> SentimentSummary {
        let cell = self.cache.entry(product_id);

        if let Some(cached) = cell.get() {
            debug!(product_id, "Sentiment cache hit");
            let mut summary = cached.clone();
            summary.provenance = Provenance::FromCache;
            return summary;
        }

        cell.get_or_init(|| self.compute(product_id, reviews))
            .await
            .clone()
    }

    async fn compute(&self, product_id: &str, reviews: &[Review]) -> SentimentSummary {
        if reviews.is_empty() {
            debug!(product_id, "No reviews to analyze");
            return SentimentSummary {
                product_id: product_id.to_string(),
                review_count: 0,
                avg_rating: 0.0,
                positive_ratio: 0.0,
                negative_ratio: 0.0,
                neutral_ratio: 0.0,
                pros: Vec::new(),
                cons: Vec::new(),
                provenance: Provenance::Fallback,
            };
        }

        let inputs: Vec<ReviewInput> = reviews
            .iter()
            .map(|review| ReviewInput {
                text: review.text.clone(),
                rating: review.rating,
            })
            .collect();

        let batches: Vec<&[ReviewInput]> = inputs.chunks(self.batch_size).collect();
        info!(
            product_id,
            review_count = reviews.len(),
            batch_count = batches.len(),
            "Analyzing review sentiment"
        );

        let results = join_all(
            batches
                .iter()
                .map(|batch| self.gateway.analyze_batch(batch)),
        )
        .await;

        let mut labels = Vec::with_capacity(reviews.len());
        let mut pros = Vec::new();
        let mut cons = Vec::new();
        let mut any_success = false;

        for (batch, result) in batches.iter().zip(results) {
            match result {
                Ok(analyses) => {
                    any_success = true;
                    for analysis in analyses {
                        labels.push(analysis.sentiment);
                        if let Some(pro) = analysis.pro {
                            pros.push(pro);
                        }
                        if let Some(con) = analysis.con {
                            cons.push(con);
                        }
                    }
                }
                Err(err) => {
                    warn!(
                        product_id,
                        batch_len = batch.len(),
                        "Batch analysis failed, using rating fallback: {err}"
                    );
                    labels.extend(batch.iter().map(|r| SentimentLabel::from_rating(r.rating)));
                }
            }
        }

        let provenance = if any_success {
            Provenance::Computed
        } else {
            Provenance::Fallback
        };
        summarize(product_id, reviews, &labels, pros, cons, provenance)
    }
}

fn summarize(
    product_id: &str,
    reviews: &[Review],
    labels: &[SentimentLabel],
    pros: Vec<String>,
    cons: Vec<String>,
    provenance: Provenance,
) -> SentimentSummary {
    let total = labels.len() as f32;
    let count_of = |wanted: SentimentLabel| {
        labels.iter().filter(|&&label| label == wanted).count() as f32 / total
    };

    let rating_sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();

    SentimentSummary {
        product_id: product_id.to_string(),
        review_count: reviews.len(),
        avg_rating: rating_sum as f32 / reviews.len() as f32,
        positive_ratio: count_of(SentimentLabel::Positive),
        negative_ratio: count_of(SentimentLabel::Negative),
        neutral_ratio: count_of(SentimentLabel::Neutral),
        pros: dedup_points(pros),
        cons: dedup_points(cons),
        provenance,
    }
}

/// Drop duplicate aspects case-insensitively, keeping first occurrences in
/// their original order.
fn dedup_points(points: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    points
        .into_iter()
        .filter(|point| seen.insert(point.to_lowercase()))
        .collect()
}
