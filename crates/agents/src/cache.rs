//! Shared sentiment cache.
//!
//! Each product id maps to a [`tokio::sync::OnceCell`], so concurrent
//! requests for the same uncached product coalesce into a single gateway
//! computation: the first caller initializes the cell while everyone else
//! awaits the same result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use crate::types::SentimentSummary;
use data_loader::ProductId;

#[derive(Default)]
pub struct SentimentCache {
    entries: Mutex<HashMap<ProductId, Arc<OnceCell<SentimentSummary>>>>,
}

impl SentimentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell for `product_id`, creating an empty one if absent.
    ///
    /// The outer mutex is only held while looking up the cell, never while
    /// a summary is being computed.
    pub(crate) fn entry(&self, product_id: &str) -> Arc<OnceCell<SentimentSummary>> {
        let mut entries = self.entries.lock().expect("sentiment cache lock poisoned");
        entries.entry(product_id.to_string()).or_default().clone()
    }

    /// Non-blocking read of an already-computed summary.
    pub fn peek(&self, product_id: &str) -> Option<SentimentSummary> {
        let entries = self.entries.lock().expect("sentiment cache lock poisoned");
        entries.get(product_id).and_then(|cell| cell.get()).cloned()
    }

    /// Number of fully computed entries (cells still in flight don't count).
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().expect("sentiment cache lock poisoned");
        entries.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Provenance;

    fn summary(id: &str) -> SentimentSummary {
        SentimentSummary {
            product_id: id.to_string(),
            review_count: 1,
            avg_rating: 5.0,
            positive_ratio: 1.0,
            negative_ratio: 0.0,
            neutral_ratio: 0.0,
            pros: vec![],
            cons: vec![],
            provenance: Provenance::Computed,
        }
    }

    #[test]
    fn test_peek_misses_until_cell_is_set() {
        let cache = SentimentCache::new();
        let cell = cache.entry("P001");
        assert!(cache.peek("P001").is_none());
        assert_eq!(cache.len(), 0);

        cell.set(summary("P001")).unwrap();
        assert_eq!(cache.peek("P001").unwrap().product_id, "P001");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entry_returns_same_cell_for_same_key() {
        let cache = SentimentCache::new();
        let a = cache.entry("P001");
        let b = cache.entry("P001");
        assert!(Arc::ptr_eq(&a, &b));
    }
}
