//! Integration tests for the analysis units.
//!
//! These tests verify that retrieval, sentiment, and recommendation work
//! together over one shared catalog and cache, without a reachable
//! reasoning service.

use std::sync::Arc;

use agents::{
    Provenance, ReasonCode, RecommendationUnit, RetrievalUnit, SentimentCache, SentimentUnit,
    DEFAULT_SENTIMENT_THRESHOLD,
};
use async_trait::async_trait;
use data_loader::{CatalogIndex, Product, Review};
use gateway::{BackendError, GatewayConfig, ReasoningBackend, ReasoningGateway};

struct DownBackend;

#[async_trait]
impl ReasoningBackend for DownBackend {
    async fn complete(
        &self,
        _prompt: &str,
        _temperature: f32,
        _max_output_tokens: u32,
    ) -> Result<String, BackendError> {
        Err(BackendError::Transport("connection refused".to_string()))
    }
}

fn create_test_setup() -> (Arc<CatalogIndex>, Arc<ReasoningGateway>, Arc<SentimentCache>) {
    let mut index = CatalogIndex::new();

    // A well-reviewed headset, a poorly-reviewed one, and one that is sold out.
    index.insert_product(Product {
        id: "H001".to_string(),
        title: "Studio Headphones Pro".to_string(),
        description: "Closed-back headphones for studio monitoring".to_string(),
        price: 249.99,
        category: "Audio".to_string(),
        stock: 10,
    });
    index.insert_product(Product {
        id: "H002".to_string(),
        title: "Budget Headphones".to_string(),
        description: "Entry-level headphones for everyday listening".to_string(),
        price: 39.99,
        category: "Audio".to_string(),
        stock: 50,
    });
    index.insert_product(Product {
        id: "H003".to_string(),
        title: "Wireless Headphones Max".to_string(),
        description: "Premium wireless headphones with noise cancelling".to_string(),
        price: 399.99,
        category: "Audio".to_string(),
        stock: 0,
    });

    for (product_id, rating) in [
        ("H001", 5u8),
        ("H001", 5),
        ("H001", 4),
        ("H002", 2),
        ("H002", 1),
        ("H002", 4),
        ("H003", 5),
        ("H003", 5),
    ] {
        index.insert_review(Review {
            product_id: product_id.to_string(),
            text: format!("rated {rating} stars"),
            rating,
        });
    }

    let gateway = Arc::new(ReasoningGateway::new(
        Box::new(DownBackend),
        GatewayConfig::default(),
    ));
    (Arc::new(index), gateway, Arc::new(SentimentCache::new()))
}

#[tokio::test(start_paused = true)]
async fn retrieval_sentiment_and_recommendation_chain() {
    let (catalog, gateway, cache) = create_test_setup();
    let retrieval = RetrievalUnit::new(catalog.clone());
    let sentiment = SentimentUnit::new(gateway, cache.clone(), 3);
    let recommendation =
        RecommendationUnit::new(catalog.clone(), cache.clone(), DEFAULT_SENTIMENT_THRESHOLD);

    let ranked = retrieval.retrieve("budget headphones", 3);
    assert_eq!(ranked[0].product_id, "H002");

    let top = catalog.get_product(&ranked[0].product_id).unwrap().clone();
    let summary = sentiment
        .analyze(&top.id, catalog.reviews_for(&top.id))
        .await;

    // Service is down, so ratings decide: 2, 1, 4 -> one positive of three.
    assert_eq!(summary.provenance, Provenance::Fallback);
    assert!((summary.positive_ratio - 1.0 / 3.0).abs() < 1e-6);

    let decision = recommendation.recommend(&top, &summary, &ranked[1..]);
    assert!(decision.needs_alternative);
    assert_eq!(decision.reason, ReasonCode::LowSentiment);

    // The suggested alternative exists and is one of the ranked candidates.
    let alternative = decision.alternative.unwrap();
    assert!(ranked[1..].iter().any(|alt| alt.product_id == alternative));
}

#[tokio::test(start_paused = true)]
async fn cached_sentiment_steers_the_low_sentiment_rule() {
    let (catalog, gateway, cache) = create_test_setup();
    let retrieval = RetrievalUnit::new(catalog.clone());
    let sentiment = SentimentUnit::new(gateway, cache.clone(), 3);
    let recommendation =
        RecommendationUnit::new(catalog.clone(), cache.clone(), DEFAULT_SENTIMENT_THRESHOLD);

    // Warm the cache for H001 (ratings 5, 5, 4: fully positive).
    let good = sentiment.analyze("H001", catalog.reviews_for("H001")).await;
    assert!((good.positive_ratio - 1.0).abs() < 1e-6);

    let ranked = retrieval.retrieve("headphones", 3);
    let top = catalog.get_product(&ranked[0].product_id).unwrap().clone();
    let summary = sentiment
        .analyze(&top.id, catalog.reviews_for(&top.id))
        .await;

    let decision = recommendation.recommend(&top, &summary, &ranked[1..]);

    // Whatever ranked first, the rules must point at something in stock with
    // no worse sentiment when they suggest at all.
    if let Some(alternative) = &decision.alternative {
        let alt_product = catalog.get_product(alternative).unwrap();
        if decision.reason == ReasonCode::OutOfStock {
            assert!(alt_product.in_stock());
        }
    }
}

#[tokio::test(start_paused = true)]
async fn out_of_stock_top_match_yields_in_stock_alternative() {
    let (catalog, gateway, cache) = create_test_setup();
    let retrieval = RetrievalUnit::new(catalog.clone());
    let sentiment = SentimentUnit::new(gateway, cache.clone(), 3);
    let recommendation =
        RecommendationUnit::new(catalog.clone(), cache.clone(), DEFAULT_SENTIMENT_THRESHOLD);

    let ranked = retrieval.retrieve("wireless headphones max", 3);
    assert_eq!(ranked[0].product_id, "H003");

    let top = catalog.get_product("H003").unwrap().clone();
    let summary = sentiment
        .analyze(&top.id, catalog.reviews_for(&top.id))
        .await;

    let decision = recommendation.recommend(&top, &summary, &ranked[1..]);
    assert_eq!(decision.reason, ReasonCode::OutOfStock);
    let alternative = decision.alternative.expect("an in-stock alternative exists");
    assert!(catalog.get_product(&alternative).unwrap().in_stock());
}
