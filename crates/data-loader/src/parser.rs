//! CSV parsing for catalog data files.
//!
//! Three files make up a catalog directory:
//! - `products.csv`: product_id,title,description,price,category[,stock]
//! - `reviews.csv`: product_id,review_text,rating
//! - `inventory.csv` (optional): product_id,stock_quantity
//!
//! Rows are validated here, before anything reaches the pipeline: ratings
//! must be 1-5, ids and titles must be non-empty. A bad row is an error with
//! record context, not a silently dropped line.

use crate::error::{DataLoadError, Result};
use crate::types::{Product, ProductId, Review};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ProductRow {
    product_id: String,
    title: String,
    description: String,
    price: f64,
    category: String,
    /// Present when the products file carries stock directly; otherwise the
    /// inventory file (or a default of zero) supplies it.
    #[serde(default)]
    stock: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ReviewRow {
    product_id: String,
    review_text: String,
    rating: i64,
}

#[derive(Debug, Deserialize)]
struct InventoryRow {
    product_id: String,
    stock_quantity: u32,
}

/// A stock override read from `inventory.csv`.
#[derive(Debug, Clone)]
pub struct InventoryRecord {
    pub product_id: ProductId,
    pub stock: u32,
}

/// Parse products from any reader (tests feed byte slices, loading feeds
/// files).
pub fn parse_products<R: Read>(reader: R, file: &str) -> Result<Vec<Product>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut products = Vec::new();

    for (idx, row) in csv_reader.deserialize::<ProductRow>().enumerate() {
        let record = idx + 1;
        let row = row.map_err(|source| DataLoadError::Csv {
            file: file.to_string(),
            record,
            source,
        })?;

        if row.product_id.trim().is_empty() {
            return Err(DataLoadError::MissingField {
                file: file.to_string(),
                record,
                field: "product_id".to_string(),
            });
        }
        if row.title.trim().is_empty() {
            return Err(DataLoadError::MissingField {
                file: file.to_string(),
                record,
                field: "title".to_string(),
            });
        }
        if !row.price.is_finite() || row.price < 0.0 {
            return Err(DataLoadError::InvalidValue {
                file: file.to_string(),
                record,
                field: "price".to_string(),
                value: row.price.to_string(),
            });
        }

        products.push(Product {
            id: row.product_id.trim().to_string(),
            title: row.title.trim().to_string(),
            description: row.description.trim().to_string(),
            price: row.price,
            category: row.category.trim().to_string(),
            stock: row.stock.unwrap_or(0),
        });
    }

    Ok(products)
}

/// Parse reviews from any reader.
pub fn parse_reviews<R: Read>(reader: R, file: &str) -> Result<Vec<Review>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut reviews = Vec::new();

    for (idx, row) in csv_reader.deserialize::<ReviewRow>().enumerate() {
        let record = idx + 1;
        let row = row.map_err(|source| DataLoadError::Csv {
            file: file.to_string(),
            record,
            source,
        })?;

        if row.product_id.trim().is_empty() {
            return Err(DataLoadError::MissingField {
                file: file.to_string(),
                record,
                field: "product_id".to_string(),
            });
        }
        if row.review_text.trim().is_empty() {
            return Err(DataLoadError::MissingField {
                file: file.to_string(),
                record,
                field: "review_text".to_string(),
            });
        }
        if !(1..=5).contains(&row.rating) {
            return Err(DataLoadError::InvalidValue {
                file: file.to_string(),
                record,
                field: "rating".to_string(),
                value: row.rating.to_string(),
            });
        }

        reviews.push(Review {
            product_id: row.product_id.trim().to_string(),
            text: row.review_text.trim().to_string(),
            rating: row.rating as u8,
        });
    }

    Ok(reviews)
}

/// Parse stock overrides from any reader.
pub fn parse_inventory<R: Read>(reader: R, file: &str) -> Result<Vec<InventoryRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();

    for (idx, row) in csv_reader.deserialize::<InventoryRow>().enumerate() {
        let record = idx + 1;
        let row = row.map_err(|source| DataLoadError::Csv {
            file: file.to_string(),
            record,
            source,
        })?;
        records.push(InventoryRecord {
            product_id: row.product_id.trim().to_string(),
            stock: row.stock_quantity,
        });
    }

    Ok(records)
}

pub fn parse_products_file(path: &Path) -> Result<Vec<Product>> {
    let file = std::fs::File::open(path)?;
    parse_products(file, &path.display().to_string())
}

pub fn parse_reviews_file(path: &Path) -> Result<Vec<Review>> {
    let file = std::fs::File::open(path)?;
    parse_reviews(file, &path.display().to_string())
}

pub fn parse_inventory_file(path: &Path) -> Result<Vec<InventoryRecord>> {
    let file = std::fs::File::open(path)?;
    parse_inventory(file, &path.display().to_string())
}
