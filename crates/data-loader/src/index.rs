//! Building a `CatalogIndex` from a catalog directory.

use crate::error::Result;
use crate::parser;
use crate::types::CatalogIndex;
use std::path::Path;
use tracing::{info, warn};

impl CatalogIndex {
    /// Load a catalog from a directory containing `products.csv` and
    /// `reviews.csv`, with stock levels merged from `inventory.csv` when that
    /// file exists.
    ///
    /// Reviews referencing unknown products are kept: they never surface in a
    /// pipeline run (sentiment only asks for reviews of retrieved products)
    /// but dropping them here would hide a data problem, so they are logged.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let mut index = CatalogIndex::new();

        let products = parser::parse_products_file(&dir.join("products.csv"))?;
        for product in products {
            index.insert_product(product);
        }

        let inventory_path = dir.join("inventory.csv");
        if inventory_path.exists() {
            let records = parser::parse_inventory_file(&inventory_path)?;
            info!("Merging {} inventory records", records.len());
            for record in records {
                index.set_stock(&record.product_id, record.stock);
            }
        }

        let reviews = parser::parse_reviews_file(&dir.join("reviews.csv"))?;
        let mut orphaned = 0usize;
        for review in reviews {
            if index.get_product(&review.product_id).is_none() {
                orphaned += 1;
            }
            index.insert_review(review);
        }
        if orphaned > 0 {
            warn!("{orphaned} reviews reference products not in the catalog");
        }

        let (product_count, review_count) = index.counts();
        info!("Loaded {product_count} products and {review_count} reviews");

        Ok(index)
    }
}
