//! # Data Loader Crate
//!
//! Loads and indexes the product catalog: products, customer reviews, and
//! stock levels.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Product, Review, CatalogIndex)
//! - **parser**: Parse and validate CSV files
//! - **index**: Assemble a CatalogIndex from a data directory
//! - **sample**: Built-in sample catalog for demos and tests
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::CatalogIndex;
//! use std::path::Path;
//!
//! let index = CatalogIndex::load_from_dir(Path::new("data"))?;
//! let product = index.get_product("P001").unwrap();
//! let reviews = index.reviews_for("P001");
//!
//! println!("{} has {} reviews", product.title, reviews.len());
//! ```
//!
//! The rest of the system treats the index as read-only, already-validated
//! input: malformed rows are rejected here, never downstream.

// Public modules
pub mod error;
pub mod index;
pub mod parser;
pub mod sample;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use sample::sample_catalog;
pub use types::{CatalogIndex, Product, ProductId, Review};
