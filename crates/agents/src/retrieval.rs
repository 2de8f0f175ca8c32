//! Keyword retrieval over the product catalog.
//!
//! Scoring is a weighted token match:
//! 1. Lowercase the query and split it on whitespace.
//! 2. Each token found in the product title adds 1.5; a token absent from
//!    the title but present in the description adds 1.0.
//! 3. A query equal to the whole title (case-insensitive) earns a 3.0
//!    exact-match bonus on top.
//!
//! Products scoring zero are dropped, the rest are sorted by score with
//! catalog order breaking ties, so results are deterministic for a given
//! catalog and query.

use std::cmp::Ordering;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::types::ScoredProduct;
use data_loader::{CatalogIndex, Product};

const TITLE_TOKEN_WEIGHT: f32 = 1.5;
const DESCRIPTION_TOKEN_WEIGHT: f32 = 1.0;
const EXACT_MATCH_BONUS: f32 = 3.0;

pub struct RetrievalUnit {
    catalog: Arc<CatalogIndex>,
}

impl RetrievalUnit {
    pub fn new(catalog: Arc<CatalogIndex>) -> Self {
        Self { catalog }
    }

    /// Scores every product against `query` in parallel and returns the
    /// `top_k` best matches, ranked. Empty when nothing matches.
    #[instrument(skip(self))]
    pub fn retrieve(&self, query: &str, top_k: usize) -> Vec<ScoredProduct> {
        let query_lower = query.trim().to_lowercase();
        let tokens: Vec<&str> = query_lower.split_whitespace().collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let products = self.catalog.products();
        let mut scored: Vec<(usize, f32)> = products
            .par_iter()
            .enumerate()
            .map(|(position, product)| (position, relevance_score(&query_lower, &tokens, product)))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        // Score descending, catalog position ascending on ties.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(top_k);

        debug!(
            query = %query,
            matches = scored.len(),
            "Retrieval scored {} catalog products",
            products.len()
        );

        scored
            .into_iter()
            .enumerate()
            .map(|(rank, (position, score))| ScoredProduct {
                product_id: products[position].id.clone(),
                score,
                rank,
            })
            .collect()
    }

    /// Direct catalog lookup, bypassing scoring.
    pub fn product_by_id(&self, product_id: &str) -> Option<&Product> {
        self.catalog.get_product(product_id)
    }

    /// All products in `category`, in catalog order.
    pub fn products_in_category(&self, category: &str) -> Vec<&Product> {
        self.catalog
            .products()
            .iter()
            .filter(|product| product.category.eq_ignore_ascii_case(category))
            .collect()
    }
}

fn relevance_score(query: &str, tokens: &[&str], product: &Product) -> f32 {
    let title = product.title.to_lowercase();
    let description = product.description.to_lowercase();

    let mut score = 0.0;
    for token in tokens {
        if title.contains(token) {
            score += TITLE_TOKEN_WEIGHT;
        } else if description.contains(token) {
            score += DESCRIPTION_TOKEN_WEIGHT;
        }
    }
    if title == query {
        score += EXACT_MATCH_BONUS;
    }
    score
}
