//! Built-in sample catalog.
//!
//! Used by the CLI when no data directory is available and by integration
//! tests that want a realistic, stable catalog. Six products across three
//! categories, one deliberately out of stock, with review distributions that
//! exercise every recommendation rule.

use crate::types::{CatalogIndex, Product, Review};

/// Build the sample catalog.
pub fn sample_catalog() -> CatalogIndex {
    let mut index = CatalogIndex::new();

    for (id, title, description, price, category, stock) in [
        (
            "P001",
            "Gaming Laptop Pro 15",
            "High-performance laptop with RTX 4060, 16GB RAM, perfect for gaming and video editing",
            1299.99,
            "Laptops",
            15,
        ),
        (
            "P002",
            "Budget Office Laptop",
            "Affordable laptop for basic tasks, web browsing, and office work",
            449.99,
            "Laptops",
            25,
        ),
        (
            "P003",
            "Gaming Phone X1",
            "Flagship phone with Snapdragon 8 Gen 3, 120Hz display, excellent for mobile gaming",
            899.99,
            "Phones",
            30,
        ),
        (
            "P004",
            "Professional Video Camera",
            "4K video camera with advanced stabilization, perfect for content creators",
            1599.99,
            "Cameras",
            8,
        ),
        (
            "P005",
            "MacBook Pro M3",
            "Professional laptop with M3 chip, excellent for video editing and creative work",
            1999.99,
            "Laptops",
            12,
        ),
        (
            "P006",
            "Budget Smartphone",
            "Affordable smartphone for everyday use, decent camera and battery life",
            299.99,
            "Phones",
            0,
        ),
    ] {
        index.insert_product(Product {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            price,
            category: category.to_string(),
            stock,
        });
    }

    for (product_id, text, rating) in [
        (
            "P001",
            "Amazing laptop! Runs all games smoothly. Great for video editing too.",
            5u8,
        ),
        ("P001", "Good performance but gets hot during intensive tasks.", 4),
        ("P001", "Best laptop I've owned. Worth every penny!", 5),
        ("P001", "A bit expensive but the quality justifies it.", 4),
        (
            "P002",
            "Perfect for basic tasks but slow for gaming or heavy software.",
            3,
        ),
        ("P002", "Great value for money for office work.", 4),
        ("P002", "Does what it says. Good budget option.", 4),
        ("P002", "Screen quality could be better.", 3),
        ("P003", "Excellent gaming performance! Screen is stunning.", 5),
        ("P003", "Battery drains fast during gaming sessions.", 3),
        ("P003", "Best phone for mobile gaming hands down.", 5),
        ("P003", "Great display and smooth performance.", 5),
        ("P004", "Professional quality video. Amazing stabilization.", 5),
        ("P004", "Pricey but worth it for content creation.", 4),
        ("P004", "Best camera I've used for vlogging.", 5),
        (
            "P005",
            "Incredible performance for video editing. Fast render times.",
            5,
        ),
        ("P005", "Expensive but the M3 chip is a game changer.", 5),
        ("P005", "Best laptop for creative professionals.", 5),
        ("P006", "Decent for the price but camera is mediocre.", 3),
        ("P006", "Battery life is poor. Disappointing.", 2),
    ] {
        index.insert_review(Review {
            product_id: product_id.to_string(),
            text: text.to_string(),
            rating,
        });
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_catalog_shape() {
        let index = sample_catalog();
        let (products, reviews) = index.counts();

        assert_eq!(products, 6);
        assert_eq!(reviews, 20);
        assert_eq!(index.categories(), vec!["Cameras", "Laptops", "Phones"]);

        // P006 is the out-of-stock fixture.
        assert!(!index.get_product("P006").unwrap().in_stock());
        assert_eq!(index.reviews_for("P001").len(), 4);
    }
}
