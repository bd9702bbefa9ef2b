use serde::{Deserialize, Serialize};

/// Column names, in field declaration order.
pub const CSV_HEADER: [&str; 5] = ["title", "description", "price", "rating", "num_of_reviews"];

/// One product card as scraped from a category page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductListing {
    /// Full title from the title element's attribute; the visible text is often truncated.
    pub title: String,
    pub description: String,
    pub price: f64,
    /// Number of filled star icons; zero means unrated.
    pub rating: u32,
    pub num_of_reviews: u32,
}
