//! Core domain types for the product catalog.
//!
//! This module defines the fundamental data structures used throughout the
//! system: products, customer reviews, and the in-memory catalog index that
//! owns both. Everything here is immutable once loading finishes; the
//! pipeline crates hold `Arc<CatalogIndex>` and only ever read.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a product (e.g., "P001").
pub type ProductId = String;

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    /// Units currently available. Zero means out of stock.
    pub stock: u32,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A single customer review for a product.
///
/// Ratings are bounded 1-5; the loader rejects anything outside that range
/// before a `Review` is ever constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub product_id: ProductId,
    pub text: String,
    pub rating: u8,
}

/// In-memory store for the full catalog: products in their original catalog
/// order plus reviews grouped per product in file order.
///
/// Catalog order matters: retrieval breaks score ties by original position,
/// and sentiment aggregation preserves per-product review order. Both orders
/// are established here at load time and never change afterwards.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    products: Vec<Product>,
    by_id: HashMap<ProductId, usize>,
    reviews: HashMap<ProductId, Vec<Review>>,
}

impl CatalogIndex {
    /// Creates a new, empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// All products in catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by id.
    pub fn get_product(&self, id: &str) -> Option<&Product> {
        self.by_id.get(id).map(|&pos| &self.products[pos])
    }

    /// Catalog position of a product (the retrieval tie-break key).
    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// All reviews for a product, in file order.
    ///
    /// Returns an empty slice for unknown ids or products without reviews.
    pub fn reviews_for(&self, id: &str) -> &[Review] {
        self.reviews.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.products
            .iter()
            .map(|p| p.category.clone())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// (product count, review count) for logging and validation.
    pub fn counts(&self) -> (usize, usize) {
        let total_reviews = self.reviews.values().map(|v| v.len()).sum();
        (self.products.len(), total_reviews)
    }

    /// Insert a product, preserving catalog order.
    ///
    /// A repeated id replaces the earlier entry in place so the original
    /// position is kept.
    pub fn insert_product(&mut self, product: Product) {
        match self.by_id.get(&product.id) {
            Some(&pos) => self.products[pos] = product,
            None => {
                self.by_id.insert(product.id.clone(), self.products.len());
                self.products.push(product);
            }
        }
    }

    /// Append a review to its product's list.
    pub fn insert_review(&mut self, review: Review) {
        self.reviews
            .entry(review.product_id.clone())
            .or_default()
            .push(review);
    }

    /// Override a product's stock level (inventory merge).
    ///
    /// Unknown ids are ignored; the inventory file may list retired products.
    pub fn set_stock(&mut self, id: &str, stock: u32) {
        if let Some(&pos) = self.by_id.get(id) {
            self.products[pos].stock = stock;
        }
    }
}
