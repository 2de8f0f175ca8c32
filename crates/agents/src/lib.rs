//! Analysis units of the shopping-assistant pipeline.
//!
//! Each unit owns one stage: [`RetrievalUnit`] ranks catalog products for a
//! query, [`SentimentUnit`] turns reviews into a cached summary,
//! [`SynthesisUnit`] writes the customer-facing answer, and
//! [`RecommendationUnit`] decides whether to steer the customer to an
//! alternative. Units share state through [`SentimentCache`] and talk to the
//! external reasoning service only through the gateway crate.

pub mod cache;
pub mod recommendation;
pub mod retrieval;
pub mod sentiment;
pub mod synthesis;
pub mod types;

pub use cache::SentimentCache;
pub use recommendation::{RecommendationUnit, DEFAULT_SENTIMENT_THRESHOLD};
pub use retrieval::RetrievalUnit;
pub use sentiment::SentimentUnit;
pub use synthesis::SynthesisUnit;
pub use types::{
    Provenance, ReasonCode, RecommendationDecision, ScoredProduct, SentimentSummary,
};
