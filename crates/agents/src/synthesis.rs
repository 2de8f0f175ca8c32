//! Answer synthesis.
//!
//! Builds a grounded prompt from the product record and its sentiment
//! summary and asks the gateway for a conversational answer. When the
//! gateway fails or returns an empty response the unit assembles a template
//! answer from the same facts instead, so synthesis never surfaces an error.

use std::sync::Arc;

use tracing::warn;

use crate::types::SentimentSummary;
use data_loader::Product;
use gateway::ReasoningGateway;

pub struct SynthesisUnit {
    gateway: Arc<ReasoningGateway>,
}

impl SynthesisUnit {
    pub fn new(gateway: Arc<ReasoningGateway>) -> Self {
        Self { gateway }
    }

    /// Answer `query` about `product`. Infallible by construction.
    pub async fn answer(
        &self,
        query: &str,
        product: &Product,
        sentiment: &SentimentSummary,
    ) -> String {
        let prompt = build_prompt(query, product, sentiment);
        match self.gateway.synthesize(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!(product_id = %product.id, "Empty synthesis response, using template answer");
                template_answer(product, sentiment)
            }
            Err(err) => {
                warn!(product_id = %product.id, "Synthesis call failed, using template answer: {err}");
                template_answer(product, sentiment)
            }
        }
    }
}

fn build_prompt(query: &str, product: &Product, sentiment: &SentimentSummary) -> String {
    let pros = if sentiment.pros.is_empty() {
        "Not mentioned in reviews".to_string()
    } else {
        sentiment.pros[..sentiment.pros.len().min(3)].join(", ")
    };
    let cons = if sentiment.cons.is_empty() {
        "Not mentioned in reviews".to_string()
    } else {
        sentiment.cons[..sentiment.cons.len().min(3)].join(", ")
    };
    let stock_line = if product.in_stock() {
        format!("{} units in stock", product.stock)
    } else {
        "currently out of stock".to_string()
    };

    format!(
        "You are an expert e-commerce shopping assistant. Answer the customer's \
         question using only the product facts below. Be concise, honest about \
         drawbacks, and do not invent information.\n\n\
         Product: {title}\n\
         Category: {category}\n\
         Description: {description}\n\
         Price: ${price:.2}\n\
         Availability: {stock_line}\n\
         Reviews: {count} customer reviews, {positive:.0}% positive, average rating {avg:.1}/5\n\
         Praised: {pros}\n\
         Criticized: {cons}\n\n\
         Customer question: {query}\n\n\
         Answer:",
        title = product.title,
        category = product.category,
        description = product.description,
        price = product.price,
        count = sentiment.review_count,
        positive = sentiment.positive_percent(),
        avg = sentiment.avg_rating,
    )
}

/// Deterministic answer assembled from the summary when the gateway is
/// unavailable. Mentions at most two pros and one con.
fn template_answer(product: &Product, sentiment: &SentimentSummary) -> String {
    let mut answer = if sentiment.review_count > 0 {
        let positive = sentiment.positive_percent();
        let verdict = if positive >= 70.0 {
            "well-received by customers"
        } else if positive >= 50.0 {
            "getting generally positive reviews"
        } else {
            "getting mixed reviews"
        };

        let mut text = format!(
            "Based on {} customer reviews ({:.0}% positive, {:.1}/5 average rating), \
             the {} is {}. It's priced at ${:.2}.",
            sentiment.review_count,
            positive,
            sentiment.avg_rating,
            product.title,
            verdict,
            product.price,
        );
        if !sentiment.pros.is_empty() {
            let highlights = sentiment.pros[..sentiment.pros.len().min(2)].join(" and ");
            text.push_str(&format!(" Reviewers highlight {highlights}."));
        }
        if let Some(con) = sentiment.cons.first() {
            text.push_str(&format!(" The most common complaint is {con}."));
        }
        text
    } else {
        format!(
            "The {} is priced at ${:.2}, but it has no customer reviews yet, \
             so there is no feedback to report.",
            product.title, product.price,
        )
    };

    if !product.in_stock() {
        answer.push_str(" Note: this item is currently out of stock.");
    }
    answer
}
